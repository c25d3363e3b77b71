use std::rc::Rc;

use sass_css::CssTree;
use sass_env::ModuleMembers;
use sass_extend::ExtensionStore;
use url::Url;

/// A stylesheet loaded by `@use` or `@forward`, evaluated exactly once per
/// compilation and cached by canonical URL (§3 "Module", §4.3 step 6,
/// §8 property 6). Built by `sass-eval` as it evaluates a file's
/// statements; everything here is then read-only.
pub struct Module {
    pub canonical_url: Url,
    pub css_tree: Rc<CssTree>,
    pub members: Rc<ModuleMembers>,
    pub upstream_modules: Vec<Rc<Module>>,
    pub extension_store: Rc<ExtensionStore>,
    /// Whether this module or anything it transitively `@use`s/`@forward`s
    /// produced CSS output, which determines load ordering in the combined
    /// output (§3, §4.3).
    pub transitively_contains_css: bool,
    /// Whether this module or anything it transitively reaches registered
    /// an `@extend`, which determines whether its extension store needs to
    /// be absorbed into dependents (§4.5 `add_extensions`).
    pub transitively_contains_extensions: bool,
    /// Loud comments that appeared before the first `@use`/`@forward` in
    /// the file, hoisted ahead of this module's CSS in the combined output.
    pub pre_module_comments: Vec<String>,
}
