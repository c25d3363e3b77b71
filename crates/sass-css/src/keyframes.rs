use sass_diagnostics::{SassError, SassResult, Span};

/// Parses a `@keyframes` block selector list, e.g. `from, 50%, to` (§6
/// `parse_keyframe_selector`). Each entry is either the identifiers `from`
/// / `to` or a percentage.
pub fn parse_keyframe_selector(text: &str, span: &Span) -> SassResult<Vec<String>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|part| validate_entry(part, span).map(str::to_string))
        .collect()
}

fn validate_entry<'a>(part: &'a str, span: &Span) -> SassResult<&'a str> {
    if part.eq_ignore_ascii_case("from") || part.eq_ignore_ascii_case("to") {
        return Ok(part);
    }
    if let Some(digits) = part.strip_suffix('%') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Ok(part);
        }
    }
    Err(SassError::ParseError {
        message: format!("expected \"from\", \"to\", or a percentage, got \"{part}\""),
        span: span.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::SourceFile;

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn parses_from_to_and_percentages() {
        let selectors = parse_keyframe_selector("from, 50%, to", &span()).unwrap();
        assert_eq!(selectors, vec!["from", "50%", "to"]);
    }

    #[test]
    fn rejects_an_invalid_entry() {
        assert!(parse_keyframe_selector("bogus", &span()).is_err());
    }
}
