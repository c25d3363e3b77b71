use std::fmt;
use std::sync::Arc;

use url::Url;

/// The text of one loaded stylesheet, kept alive for as long as any [`Span`]
/// into it exists.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub url: Option<Url>,
    pub text: String,
    /// Byte offset of the start of each line, used to turn a byte offset
    /// into a human 1-based (line, column) pair for diagnostics.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(url: Option<Url>, text: impl Into<String>) -> Arc<Self> {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Arc::new(Self {
            url,
            text,
            line_starts,
        })
    }

    /// 1-based (line, column) for a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line];
        (line + 1, col + 1)
    }

    pub fn display_url(&self) -> &str {
        self.url.as_ref().map(|u| u.as_str()).unwrap_or("-")
    }
}

/// A `(source_url, byte_start, byte_end)` triple plus a handle on the file
/// text, used throughout the evaluator for diagnostics and source maps.
///
/// Cheap to clone: the file text is shared via `Arc`.
#[derive(Clone)]
pub struct Span {
    pub file: Arc<SourceFile>,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(file: Arc<SourceFile>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        debug_assert!(end <= file.text.len());
        Self { file, start, end }
    }

    /// A span covering nothing, anchored at `offset` in `file`. Used when a
    /// diagnostic has no meaningful range (e.g. an implicit default value).
    pub fn point(file: Arc<SourceFile>, offset: usize) -> Self {
        Self::new(file, offset, offset)
    }

    pub fn text(&self) -> &str {
        &self.file.text[self.start..self.end]
    }

    /// The smallest span enclosing both `self` and `other`. Both spans must
    /// point into the same file.
    pub fn merge(&self, other: &Span) -> Span {
        debug_assert!(Arc::ptr_eq(&self.file, &other.file));
        Span {
            file: self.file.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn start_location(&self) -> (usize, usize) {
        self.file.line_col(self.start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.start_location();
        write!(
            f,
            "{}:{}:{} ({}..{})",
            self.file.display_url(),
            line,
            col,
            self.start,
            self.end
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.start_location();
        write!(f, "{}:{}:{}", self.file.display_url(), line, col)
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.file, &other.file) && self.start == other.start && self.end == other.end
    }
}
