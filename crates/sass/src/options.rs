use std::rc::Rc;

use sass_css::LineFeed;
use sass_diagnostics::Logger;
use sass_env::Callable;
use sass_loader::Importer;

/// `style ∈ {expanded, compressed}` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Expanded,
    Compressed,
}

/// Exactly the option set §6 names for `compile`/`serialize`: importers,
/// user-defined functions, the logger sink, `quiet_deps`, and the
/// serializer's own knobs, all in one struct since a single call to
/// `compile` typically wants to `serialize` its own result with the same
/// style/indent/line-feed choices.
pub struct CompileOptions {
    /// Resolves the entry stylesheet's own relative `@use`/`@forward`/
    /// `@import` loads (§6 `importer`).
    pub importer: Rc<dyn Importer>,
    /// Tried, in order, for a URL the root importer doesn't recognize
    /// (§6 `additional_importers`).
    pub additional_importers: Vec<Rc<dyn Importer>>,
    /// Caller-supplied functions, consulted the way a user-defined
    /// function declared at the top of the entry stylesheet would be.
    pub functions: Vec<Rc<Callable>>,
    pub logger: Rc<dyn Logger>,
    pub quiet_deps: bool,
    pub source_map: bool,
    pub style: Style,
    /// 0-10 spaces per indent level.
    pub indent_width: u8,
    pub use_tabs: bool,
    pub line_feed: LineFeed,
    /// For `serialize_value` (§6): whether a value renders in the
    /// unambiguous "inspect" form rather than plain CSS.
    pub inspect: bool,
}
