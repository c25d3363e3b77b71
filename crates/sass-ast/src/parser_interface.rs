use std::sync::Arc;

use sass_diagnostics::{SassResult, SourceFile};

use crate::statement::{Stylesheet, Syntax};

/// The Sass *source* parser (§1 "deliberately out of scope", §6 "Parser
/// interface (consumed)"). This crate never parses Sass syntax itself; it
/// only defines the AST such a parser produces and this trait so the
/// evaluator can be driven against any conforming implementation,
/// including a hand-built [`Stylesheet`] in tests.
pub trait SassParser {
    fn parse_stylesheet(&self, file: Arc<SourceFile>, syntax: Syntax) -> SassResult<Stylesheet>;
}

/// A parser that can't actually parse; useful where only a pre-built
/// [`Stylesheet`] is needed (e.g. construction from a test fixture or a
/// caller that has its own AST already).
#[derive(Debug, Default)]
pub struct NoopParser;

impl SassParser for NoopParser {
    fn parse_stylesheet(&self, file: Arc<SourceFile>, _syntax: Syntax) -> SassResult<Stylesheet> {
        Err(sass_diagnostics::SassError::Internal {
            message: format!("no parser configured to parse {}", file.display_url()),
        })
    }
}
