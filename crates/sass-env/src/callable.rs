use std::fmt;
use std::rc::Rc;

use sass_ast::{ArgumentDeclaration, Statement};
use sass_diagnostics::Span;
use sass_value::Value;

use crate::environment::Environment;

/// A built-in callable's implementation, invoked with already-bound
/// positional arguments (keyword binding and defaulting happen in
/// `sass-eval` before this is called, since only the evaluator knows how
/// to produce a [`Value`] from an unevaluated default expression).
pub type BuiltInFn = Rc<dyn Fn(&[Value], &Span) -> sass_diagnostics::SassResult<Value>>;

/// A `Callable` is a sum of the three things `@include`/a function call
/// can resolve to (§9 "Callable polymorphism").
#[derive(Clone)]
pub enum Callable {
    UserDefined {
        name: String,
        arguments: ArgumentDeclaration,
        body: Rc<Vec<Statement>>,
        /// The environment captured at declaration time (§4.2 `closure()`,
        /// §9 "Closure environments"). Invoking this callable clones this
        /// handle and pushes one more scope onto it so the callable's own
        /// assignments don't escape into the declaring scope.
        closure: Environment,
        /// Whether this callable was declared in a module reached only
        /// transitively (used to suppress its warnings under `quiet_deps`).
        in_dependency: bool,
        /// Whether the body contains a bare `@content` (always `false` for
        /// `@function` declarations, which can't accept one). Lets
        /// `@include` reject a content block passed to a mixin that never
        /// uses it.
        accepts_content: bool,
    },
    BuiltIn {
        name: String,
        min_args: usize,
        max_args: Option<usize>,
        implementation: BuiltInFn,
    },
    /// A reference to a plain-CSS function invocation that was never
    /// resolved against any user or built-in callable — kept around only
    /// so `meta.inspect()`-style reflection can name it.
    PlainCss { name: String },
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::UserDefined { name, .. } => name,
            Callable::BuiltIn { name, .. } => name,
            Callable::PlainCss { name } => name,
        }
    }

    pub fn accepts_content(&self) -> bool {
        matches!(self, Callable::UserDefined { accepts_content: true, .. })
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::UserDefined { name, .. } => write!(f, "Callable::UserDefined({name})"),
            Callable::BuiltIn { name, .. } => write!(f, "Callable::BuiltIn({name})"),
            Callable::PlainCss { name } => write!(f, "Callable::PlainCss({name})"),
        }
    }
}

/// A `@content` block bound to a mixin invocation: the body plus the
/// environment active at the `@include` call site, and the `using (...)`
/// argument declaration if the content block accepts arguments.
#[derive(Clone)]
pub struct ContentBlock {
    pub body: Rc<Vec<Statement>>,
    pub arguments: Option<ArgumentDeclaration>,
    pub environment: Environment,
}
