use sass_diagnostics::Span;

use crate::node::CssNode;

/// Index into a [`CssTree`]'s arena. Cheap to copy, never owns its node —
/// the arena does (§9: "arena + indices rather than reference-counted
/// cycles").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

struct Entry {
    node: CssNode,
    parent: Option<NodeId>,
    span: Option<Span>,
}

/// The CSS AST produced by the evaluator for one module, freed when the
/// module finishes evaluation. Children are stored on each [`CssNode`]
/// variant as `Vec<NodeId>`; the parent back-edge here is a lookup only,
/// never an ownership relation.
#[derive(Default)]
pub struct CssTree {
    entries: Vec<Entry>,
}

impl CssTree {
    pub fn new() -> Self {
        let mut tree = Self { entries: Vec::new() };
        tree.entries.push(Entry {
            node: CssNode::Stylesheet { children: Vec::new() },
            parent: None,
            span: None,
        });
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn insert(&mut self, node: CssNode, parent: NodeId, span: Option<Span>) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(Entry {
            node,
            parent: Some(parent),
            span,
        });
        self.add_child(parent, id);
        id
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(children) = self.entries[parent.index()].node.children_mut() {
            children.push(child);
        }
    }

    pub fn get(&self, id: NodeId) -> &CssNode {
        &self.entries[id.index()].node
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut CssNode {
        &mut self.entries[id.index()].node
    }

    pub fn span(&self, id: NodeId) -> Option<&Span> {
        self.entries[id.index()].span.as_ref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.index()].parent
    }

    /// Walks from `id` up to (and including) the root, nearest ancestor
    /// first. Used by `@at-root` to find which ancestors a query excludes.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// A shallow copy of `id`'s node with an empty children list, used by
    /// `@at-root`'s `copyWithoutChildren` when splicing a new root (§4.4).
    pub fn copy_without_children(&self, id: NodeId) -> CssNode {
        self.get(id).clone_without_children()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
