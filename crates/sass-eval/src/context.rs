use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use sass_ast::SassParser;
use sass_css::{CssTree, MediaQuery, NodeId};
use sass_diagnostics::{DeprecationTag, Logger, SassResult, Span, StackFrame};
use sass_env::{Configuration, Environment};
use sass_extend::{ExtensionStore, SelectorHandle};
use sass_loader::{Module, ModuleLoader};
use sass_selectors::SelectorList;

use crate::builtins::BuiltinRegistry;
use crate::options::EvalOptions;

/// The active style rule (§4.4): its *original* selector (pre-`&`
/// resolution, used to resolve a nested rule's own `&`) and the CSS node
/// the evaluator is currently appending declarations/nested rules into.
pub struct StyleRuleContext {
    pub original_selector: SelectorList,
    pub node: NodeId,
}

/// State shared across every `Evaluator` created during one compilation
/// (§5: module cache, loaded-URLs set and warning dedup set are owned by
/// the compilation). A nested `@use`/`@forward`/`@import` load builds a
/// fresh [`Evaluator`] for the loaded module but borrows the same
/// `CompilationState`.
pub struct CompilationState {
    pub loader: RefCell<ModuleLoader>,
    pub parser: Rc<dyn SassParser>,
    pub builtins: BuiltinRegistry,
    pub logger: Rc<dyn Logger>,
    pub quiet_deps: bool,
    pub inspect: bool,
    seen_warnings: RefCell<HashSet<(String, Option<(usize, usize)>)>>,
    pub call_stack: RefCell<Vec<StackFrame>>,
}

impl CompilationState {
    pub fn new(options: &EvalOptions, parser: Rc<dyn SassParser>) -> Self {
        let loader = ModuleLoader::new(options.root_importer.clone(), options.additional_importers.clone());
        Self {
            loader: RefCell::new(loader),
            parser,
            builtins: BuiltinRegistry::new(),
            logger: options.logger.clone(),
            quiet_deps: options.quiet_deps,
            inspect: options.inspect,
            seen_warnings: RefCell::new(HashSet::new()),
            call_stack: RefCell::new(Vec::new()),
        }
    }

    /// Emits a warning through the configured logger, enforcing the
    /// at-most-once-per-`(message, span)` rule and `quiet_deps`
    /// suppression (§4.4 "Deprecation and warning protocol", §8 property
    /// 8).
    pub fn warn(&self, message: &str, span: Option<&Span>, deprecation: Option<DeprecationTag>, in_dependency: bool) {
        if in_dependency && self.quiet_deps {
            return;
        }
        let key = (message.to_string(), span.map(|s| (s.start, s.end)));
        if !self.seen_warnings.borrow_mut().insert(key) {
            return;
        }
        let trace = self.call_stack.borrow();
        self.logger.warn(message, span, &trace[..], deprecation);
    }

    pub fn debug(&self, message: &str, span: &Span) {
        self.logger.debug(message, span);
    }
}

/// The tree-walking evaluator (C1, §4.4): walks one module's Sass
/// statement AST, threading the active CSS parent, style rule, media
/// context and declaration-name prefix the way §4.4 describes.
pub struct Evaluator<'c> {
    pub(crate) state: &'c CompilationState,
    pub(crate) env: Environment,
    pub(crate) tree: CssTree,
    pub(crate) extension_store: ExtensionStore,

    pub(crate) current_parent: NodeId,
    pub(crate) style_rule: Option<StyleRuleContext>,
    pub(crate) at_root_excludes_style_rule: bool,
    pub(crate) media_queries: Vec<MediaQuery>,
    pub(crate) declaration_prefix: Vec<String>,
    pub(crate) in_keyframes: bool,
    pub(crate) in_unknown_at_rule: bool,
    pub(crate) in_supports_declaration: bool,
    pub(crate) in_function: bool,
    pub(crate) configuration: Configuration,
    /// True while evaluating a module reached only transitively through
    /// another module's `@use`/`@forward`, for `quiet_deps` (§4.4).
    pub(crate) in_dependency: bool,
    pub(crate) pre_module_comments: Vec<String>,
    pub(crate) seen_non_comment_or_module_rule: bool,
    /// Every style rule's node plus its extension-store handle, read back
    /// once the whole module has been evaluated so a selector can absorb
    /// `@extend`s declared anywhere in the module, including after the
    /// rule itself (§4.5 "Extender state").
    pub(crate) style_rule_handles: Vec<(NodeId, SelectorHandle)>,
    /// Modules reached through this module's own `@use`/`@forward`, kept so
    /// the `Module` built once this evaluator finishes can report its own
    /// transitive dependency set (§3 "Module", §4.3 step 6).
    pub(crate) upstream_modules: Vec<Rc<Module>>,
}

impl<'c> Evaluator<'c> {
    pub fn for_module(state: &'c CompilationState, configuration: Configuration, in_dependency: bool) -> Self {
        let tree = CssTree::new();
        let root = tree.root();
        Self {
            state,
            env: Environment::new(),
            tree,
            extension_store: ExtensionStore::new(),
            current_parent: root,
            style_rule: None,
            at_root_excludes_style_rule: false,
            media_queries: Vec::new(),
            declaration_prefix: Vec::new(),
            in_keyframes: false,
            in_unknown_at_rule: false,
            in_supports_declaration: false,
            in_function: false,
            configuration,
            in_dependency,
            pre_module_comments: Vec::new(),
            seen_non_comment_or_module_rule: false,
            style_rule_handles: Vec::new(),
            upstream_modules: Vec::new(),
        }
    }

    pub fn root(state: &'c CompilationState) -> Self {
        Self::for_module(state, Configuration::new(), false)
    }

    pub(crate) fn push_call(&self, frame: StackFrame) {
        self.state.call_stack.borrow_mut().push(frame);
    }

    pub(crate) fn pop_call(&self) {
        self.state.call_stack.borrow_mut().pop();
    }

    /// Runs `body` with `frame` pushed onto the compilation's call stack.
    /// The frame is popped on success; on error it is left in place so the
    /// stack reflects every call active when the error was raised, for
    /// `compile` to snapshot into a [`sass_diagnostics::Traced`] once the
    /// error reaches the top level (§7 "the top-level `compile` function
    /// catches and attaches the current stack trace").
    pub(crate) fn with_call_frame<T>(
        &mut self,
        frame: StackFrame,
        body: impl FnOnce(&mut Self) -> SassResult<T>,
    ) -> SassResult<T> {
        self.push_call(frame);
        let result = body(self);
        if result.is_ok() {
            self.pop_call();
        }
        result
    }

    pub(crate) fn warn(&self, message: &str, span: Option<&Span>, deprecation: Option<DeprecationTag>) {
        self.state.warn(message, span, deprecation, self.in_dependency);
    }

    pub(crate) fn builtins(&self) -> &BuiltinRegistry {
        &self.state.builtins
    }

    pub(crate) fn in_supports_declaration(&self) -> bool {
        self.in_supports_declaration
    }

    pub(crate) fn debug(&self, message: &str, span: &Span) {
        self.state.debug(message, span);
    }

    /// Writes each tracked style rule's current (possibly `@extend`-rewritten)
    /// selector back into its CSS node. Must run after the module's whole
    /// statement list has been evaluated, since [`ExtensionStore::add_extension`]
    /// only rewrites selectors registered *before* it runs.
    pub(crate) fn finalize_style_rules(&mut self) {
        let handles = std::mem::take(&mut self.style_rule_handles);
        for (node, handle) in handles {
            let resolved = self.extension_store.selector(handle).clone();
            if let sass_css::CssNode::StyleRule { selector, .. } = self.tree.get_mut(node) {
                *selector = resolved;
            }
        }
    }

    /// Finishes a root (entry-point) evaluation: writes back every style
    /// rule's final `@extend`-resolved selector, validates that every
    /// non-optional extension found its target (§4.5 "Post-compilation ...
    /// validate that every extension has been satisfied"), and hands back
    /// the finished CSS tree. Used by the top-level `compile` entry point
    /// (§6); a nested `@use`/`@forward`/`@import` load does the equivalent
    /// inline in `sass-eval::stmt::resolve_module` since it also needs the
    /// other `Module` bookkeeping that doesn't apply to the root.
    pub fn finish(mut self) -> SassResult<CssTree> {
        self.finalize_style_rules();
        self.extension_store.check_unsatisfied()?;
        Ok(self.tree)
    }
}
