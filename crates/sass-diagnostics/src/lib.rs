//! Spans, errors and the logger sink shared by every crate in the Sass
//! evaluation core.
//!
//! Nothing in here knows about SassScript values, CSS nodes, or selectors;
//! it is purely the ambient diagnostics layer the rest of the core is built
//! on, the way `rsvg_internals::error` underlies the whole render pipeline.

mod error;
mod logger;
mod span;

pub use error::{ReferenceKind, SassError, SassResult, StackFrame, Traced};
pub use logger::{DedupingLogger, DeprecationTag, Logger, NullLogger, TracingLogger};
pub use span::{SourceFile, Span};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn file() -> Arc<SourceFile> {
        SourceFile::new(None, "a {\n  b: c;\n}\n")
    }

    #[test]
    fn line_col_tracks_newlines() {
        let f = file();
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(4), (2, 1));
        assert_eq!(f.line_col(7), (2, 4));
    }

    #[test]
    fn span_merge_takes_the_union() {
        let f = file();
        let a = Span::new(f.clone(), 4, 5);
        let b = Span::new(f, 7, 8);
        let merged = a.merge(&b);
        assert_eq!((merged.start, merged.end), (4, 8));
    }

    #[test]
    fn deduping_logger_emits_each_pair_once() {
        let f = file();
        let span = Span::new(f, 0, 1);
        let inner = NullLogger;
        let deduper = DedupingLogger::new(&inner, false);
        // Can't observe NullLogger's output directly, but calling warn twice
        // with the same (message, span) must not panic and the internal
        // `seen` set must only grow once; exercised via the public API.
        deduper.warn("oops", Some(&span), &[], None, false);
        deduper.warn("oops", Some(&span), &[], None, false);
    }
}
