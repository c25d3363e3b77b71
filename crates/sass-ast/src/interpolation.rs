use sass_diagnostics::Span;

use crate::expression::Expression;

/// A source-level `#{...}` fragment: an alternating sequence of literal
/// text and embedded expressions, as produced by the external source
/// parser (§9 "Interpolation source-map").
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub chunks: Vec<InterpolationChunk>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum InterpolationChunk {
    Text(String),
    Expr(Expression),
}

impl Interpolation {
    pub fn plain(text: impl Into<String>, span: Span) -> Self {
        Self {
            chunks: vec![InterpolationChunk::Text(text.into())],
            span,
        }
    }

    /// Whether this interpolation has no embedded expressions, i.e. it's
    /// really just a plain string known at parse time.
    pub fn is_static(&self) -> bool {
        self.chunks.iter().all(|c| matches!(c, InterpolationChunk::Text(_)))
    }

    pub fn as_static_str(&self) -> Option<String> {
        if !self.is_static() {
            return None;
        }
        let mut out = String::new();
        for chunk in &self.chunks {
            if let InterpolationChunk::Text(t) = chunk {
                out.push_str(t);
            }
        }
        Some(out)
    }
}

/// The result of evaluating an [`Interpolation`]: the concatenated string
/// plus a mapping from each output byte offset to the source span that
/// contributed it, so later selector/media-query re-parsing of the result
/// can report errors against the original Sass source (§9).
#[derive(Debug, Clone)]
pub struct EvaluatedInterpolation {
    pub text: String,
    pub offsets: Vec<(usize, Span)>,
}

impl EvaluatedInterpolation {
    pub fn span_at(&self, offset: usize) -> Option<&Span> {
        self.offsets
            .iter()
            .rev()
            .find(|(start, _)| *start <= offset)
            .map(|(_, span)| span)
    }
}
