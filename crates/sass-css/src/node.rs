use sass_diagnostics::Span;
use sass_selectors::SelectorList;
use sass_value::Value;

use crate::arena::NodeId;
use crate::media::MediaQuery;

/// One node of the output CSS tree (§3). Children are stored as indices
/// into the owning [`crate::CssTree`]'s arena.
#[derive(Debug, Clone)]
pub enum CssNode {
    Stylesheet {
        children: Vec<NodeId>,
    },
    StyleRule {
        selector: SelectorList,
        /// The selector as written, before `&` resolution — needed so a
        /// nested rule can resolve its own `&` against this one.
        original_selector: SelectorList,
        children: Vec<NodeId>,
        /// Marks the last rule bubbled out of a given source rule, so the
        /// serializer can decide whether a blank line separates groups.
        is_group_end: bool,
    },
    AtRule {
        name: String,
        value: Option<String>,
        children: Option<Vec<NodeId>>,
        /// A childless at-rule (e.g. `@charset "UTF-8";`) never gets a `{}`
        /// block, even an empty one.
        childless: bool,
    },
    MediaRule {
        queries: Vec<MediaQuery>,
        children: Vec<NodeId>,
    },
    SupportsRule {
        condition_text: String,
        children: Vec<NodeId>,
    },
    Declaration {
        name: String,
        value: Value,
        parsed_as_custom_property: bool,
        /// Trailing ` !important` annotation (§9 supplement C.6), tracked
        /// separately from `value` since it isn't part of the value algebra.
        important: bool,
        value_span_for_map: Option<Span>,
    },
    Import {
        url_text: String,
        modifiers: Option<String>,
    },
    Comment {
        text: String,
        preserved: bool,
    },
    KeyframeBlock {
        selectors: Vec<String>,
        children: Vec<NodeId>,
    },
}

impl CssNode {
    pub fn children(&self) -> &[NodeId] {
        match self {
            CssNode::Stylesheet { children }
            | CssNode::StyleRule { children, .. }
            | CssNode::MediaRule { children, .. }
            | CssNode::SupportsRule { children, .. }
            | CssNode::KeyframeBlock { children, .. } => children,
            CssNode::AtRule { children: Some(c), .. } => c,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            CssNode::Stylesheet { children }
            | CssNode::StyleRule { children, .. }
            | CssNode::MediaRule { children, .. }
            | CssNode::SupportsRule { children, .. }
            | CssNode::KeyframeBlock { children, .. } => Some(children),
            CssNode::AtRule { children: Some(c), .. } => Some(c),
            _ => None,
        }
    }

    pub fn is_childless_leaf(&self) -> bool {
        matches!(
            self,
            CssNode::Declaration { .. } | CssNode::Import { .. } | CssNode::Comment { .. }
        ) || matches!(self, CssNode::AtRule { childless: true, .. })
    }

    /// A copy of this node with an empty children list, used when splicing
    /// an ancestor chain for `@at-root` (§4.4, §9 "copyWithoutChildren").
    pub fn clone_without_children(&self) -> CssNode {
        match self {
            CssNode::Stylesheet { .. } => CssNode::Stylesheet { children: Vec::new() },
            CssNode::StyleRule {
                selector,
                original_selector,
                is_group_end,
                ..
            } => CssNode::StyleRule {
                selector: selector.clone(),
                original_selector: original_selector.clone(),
                children: Vec::new(),
                is_group_end: *is_group_end,
            },
            CssNode::AtRule { name, value, childless, .. } => CssNode::AtRule {
                name: name.clone(),
                value: value.clone(),
                children: if *childless { None } else { Some(Vec::new()) },
                childless: *childless,
            },
            CssNode::MediaRule { queries, .. } => CssNode::MediaRule {
                queries: queries.clone(),
                children: Vec::new(),
            },
            CssNode::SupportsRule { condition_text, .. } => CssNode::SupportsRule {
                condition_text: condition_text.clone(),
                children: Vec::new(),
            },
            CssNode::KeyframeBlock { selectors, .. } => CssNode::KeyframeBlock {
                selectors: selectors.clone(),
                children: Vec::new(),
            },
            leaf => leaf.clone(),
        }
    }
}
