use std::fmt;

use crate::span::Span;

/// One entry of the call stack attached to an error when it is re-thrown
/// through `@include`, `@function` calls, or module evaluation.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub member_name: String,
    pub span: Span,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.member_name, self.span)
    }
}

/// Every error the evaluation core can produce. Each variant carries at
/// least a primary span; `ParseError` additionally wraps whatever the
/// external parser reported.
#[derive(Debug, thiserror::Error)]
pub enum SassError {
    #[error("{message}")]
    ParseError { message: String, span: Span },

    #[error("{message}")]
    TypeError { message: String, span: Span },

    #[error("Undefined {kind}: {name}")]
    UndefinedReference {
        kind: ReferenceKind,
        name: String,
        span: Span,
    },

    #[error("{message}")]
    BadArguments { message: String, span: Span },

    #[error("{message}")]
    ExtendTarget { message: String, span: Span },

    #[error("Module loop: {url} is already being loaded")]
    ModuleLoop { url: String, span: Span },

    #[error("{url} was already loaded, so it can't be configured using \"with\"")]
    AlreadyLoaded { url: String, span: Span },

    #[error("The following configured variable{plural} {verb} not used by {url}: {names}",
        plural = if .names.len() == 1 { "" } else { "s" },
        verb = if .names.len() == 1 { "was" } else { "were" })]
    UnusedConfiguration {
        url: String,
        names: Vec<String>,
        span: Span,
    },

    #[error("Built-in modules can't be configured")]
    BuiltInConfigured { span: Span },

    #[error("{value} isn't a valid CSS value")]
    CssNotRepresentable { value: String, span: Span },

    /// Raised by `@error` (SPEC_FULL §C.2): terminates evaluation the same
    /// way any other `SassError` does, carrying the user's own message.
    #[error("{message}")]
    UserError { message: String, span: Span },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Variable,
    Function,
    Mixin,
    Module,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceKind::Variable => "variable",
            ReferenceKind::Function => "function",
            ReferenceKind::Mixin => "mixin",
            ReferenceKind::Module => "module",
        };
        f.write_str(s)
    }
}

impl SassError {
    pub fn primary_span(&self) -> Option<&Span> {
        match self {
            SassError::ParseError { span, .. }
            | SassError::TypeError { span, .. }
            | SassError::UndefinedReference { span, .. }
            | SassError::BadArguments { span, .. }
            | SassError::ExtendTarget { span, .. }
            | SassError::ModuleLoop { span, .. }
            | SassError::AlreadyLoaded { span, .. }
            | SassError::UnusedConfiguration { span, .. }
            | SassError::BuiltInConfigured { span }
            | SassError::UserError { span, .. }
            | SassError::CssNotRepresentable { span, .. } => Some(span),
            SassError::Internal { .. } => None,
        }
    }
}

/// An error decorated with the call stack active when it was raised. The
/// top-level `compile` entry point is the only place that should construct
/// one of these; everything underneath just returns [`SassError`].
#[derive(Debug)]
pub struct Traced {
    pub error: SassError,
    pub trace: Vec<StackFrame>,
}

impl fmt::Display for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.error)?;
        for frame in &self.trace {
            writeln!(f, "  {}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for Traced {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type SassResult<T> = Result<T, SassError>;
