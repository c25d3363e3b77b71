use std::rc::Rc;

use sass_diagnostics::Logger;
use sass_env::Callable;
use sass_loader::Importer;

/// Options recognized by [`crate::Evaluator::new`] (§6 Public API). The
/// serializer's own options (`style`, `indent_width`, ...) live in
/// `sass-css`; this only configures evaluation.
pub struct EvalOptions {
    pub root_importer: Rc<dyn Importer>,
    pub additional_importers: Vec<Rc<dyn Importer>>,
    /// Caller-supplied functions, consulted the way a user-defined
    /// function declared at the top of the entry stylesheet would be
    /// (§6 `functions`).
    pub functions: Vec<Rc<Callable>>,
    pub logger: Rc<dyn Logger>,
    pub quiet_deps: bool,
    /// `inspect` affects only `serialize_value`/`meta.inspect()`-style
    /// reflection, not ordinary compilation, where representability
    /// errors are always enforced (§6).
    pub inspect: bool,
}
