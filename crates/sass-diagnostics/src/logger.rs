use std::collections::HashSet;
use std::fmt;

use crate::error::StackFrame;
use crate::span::Span;

/// A deprecation tag attached to a warning, so callers can opt specific
/// deprecations in or out independently of the general `--quiet-deps` knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeprecationTag {
    SlashDiv,
    GlobalBuiltIn,
    ColorFunctions,
    ImportRule,
    StrictUnary,
    DuplicateVariableFlags,
}

impl fmt::Display for DeprecationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeprecationTag::SlashDiv => "slash-div",
            DeprecationTag::GlobalBuiltIn => "global-builtin",
            DeprecationTag::ColorFunctions => "color-functions",
            DeprecationTag::ImportRule => "import",
            DeprecationTag::StrictUnary => "strict-unary",
            DeprecationTag::DuplicateVariableFlags => "duplicate-var-flags",
        };
        f.write_str(s)
    }
}

/// The consumed logging interface (§6). Implementations decide how to
/// render and where to send warnings; the evaluator only ever calls these
/// two methods.
pub trait Logger {
    fn warn(
        &self,
        message: &str,
        span: Option<&Span>,
        trace: &[StackFrame],
        deprecation: Option<DeprecationTag>,
    );

    fn debug(&self, message: &str, span: &Span);
}

/// A logger that discards everything. Useful when embedding the core in a
/// context that doesn't care about diagnostics (e.g. a fuzzer).
#[derive(Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(
        &self,
        _message: &str,
        _span: Option<&Span>,
        _trace: &[StackFrame],
        _deprecation: Option<DeprecationTag>,
    ) {
    }

    fn debug(&self, _message: &str, _span: &Span) {}
}

/// Emits warnings and debug messages through `tracing`, at `warn` and
/// `debug` level respectively. This is the logger `compile` uses by
/// default outside of tests.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(
        &self,
        message: &str,
        span: Option<&Span>,
        trace: &[StackFrame],
        deprecation: Option<DeprecationTag>,
    ) {
        match (span, deprecation) {
            (Some(span), Some(tag)) => {
                tracing::warn!(%span, deprecation = %tag, "{message}")
            }
            (Some(span), None) => tracing::warn!(%span, "{message}"),
            (None, Some(tag)) => tracing::warn!(deprecation = %tag, "{message}"),
            (None, None) => tracing::warn!("{message}"),
        }
        for frame in trace {
            tracing::warn!("    at {frame}");
        }
    }

    fn debug(&self, message: &str, span: &Span) {
        tracing::debug!(%span, "{message}");
    }
}

/// Wraps another logger and enforces the at-most-once-per-`(message, span)`
/// rule (§8 property 8) plus `quiet_deps` suppression of warnings raised
/// while evaluating a dependency module.
pub struct DedupingLogger<'a> {
    inner: &'a dyn Logger,
    quiet_deps: bool,
    seen: std::sync::Mutex<HashSet<(String, Option<(usize, usize)>)>>,
}

impl<'a> DedupingLogger<'a> {
    pub fn new(inner: &'a dyn Logger, quiet_deps: bool) -> Self {
        Self {
            inner,
            quiet_deps,
            seen: std::sync::Mutex::new(HashSet::new()),
        }
    }

    /// Emit `warn`, respecting dedup and `quiet_deps`. `in_dependency`
    /// indicates the warning originated while evaluating a module reached
    /// only through another module's `@use`/`@forward`.
    pub fn warn(
        &self,
        message: &str,
        span: Option<&Span>,
        trace: &[StackFrame],
        deprecation: Option<DeprecationTag>,
        in_dependency: bool,
    ) {
        if in_dependency && self.quiet_deps {
            return;
        }
        let key = (
            message.to_owned(),
            span.map(|s| (s.start, s.end)),
        );
        let mut seen = self.seen.lock().unwrap();
        if !seen.insert(key) {
            return;
        }
        drop(seen);
        self.inner.warn(message, span, trace, deprecation);
    }

    pub fn debug(&self, message: &str, span: &Span) {
        self.inner.debug(message, span);
    }
}
