use std::fmt;

use sass_diagnostics::{SassError, SassResult, Span};

/// One query in a `@media` rule's comma-separated list, e.g.
/// `not screen and (min-width: 100px)`. `features` holds each
/// parenthesised feature clause verbatim, since the evaluator only ever
/// needs to merge and re-emit them, never evaluate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    pub modifier: Option<String>,
    pub media_type: Option<String>,
    pub features: Vec<String>,
}

impl MediaQuery {
    pub fn condition(features: Vec<String>) -> Self {
        Self {
            modifier: None,
            media_type: None,
            features,
        }
    }

    pub fn is_condition_only(&self) -> bool {
        self.media_type.is_none() && self.modifier.is_none()
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_type = false;
        if let Some(m) = &self.modifier {
            write!(f, "{m} ")?;
            wrote_type = true;
        }
        if let Some(t) = &self.media_type {
            f.write_str(t)?;
            wrote_type = true;
        }
        for (i, feature) in self.features.iter().enumerate() {
            if wrote_type || i != 0 {
                f.write_str(" and ")?;
            }
            f.write_str(feature)?;
        }
        Ok(())
    }
}

/// Result of merging two media queries (§4.4). `Empty` silently drops the
/// rule; `Unrepresentable` means the merge can't be flattened into a
/// single query and the caller should keep emitting both separately.
pub enum MediaMerge {
    Empty,
    Unrepresentable,
    Merged(MediaQuery),
}

/// Merges two entire query lists by merging every pair and dropping empty
/// results (§4.4, §8 property 5: commutative, no-op against the empty
/// list).
pub fn merge_lists(a: &[MediaQuery], b: &[MediaQuery]) -> Vec<MediaQuery> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    let mut out = Vec::new();
    for qa in a {
        for qb in b {
            match merge_one(qa, qb) {
                MediaMerge::Empty => {}
                MediaMerge::Unrepresentable => {
                    out.push(qa.clone());
                    out.push(qb.clone());
                }
                MediaMerge::Merged(q) => out.push(q),
            }
        }
    }
    out
}

fn merge_one(a: &MediaQuery, b: &MediaQuery) -> MediaMerge {
    match (a.modifier.as_deref(), b.modifier.as_deref()) {
        (Some("not"), Some("not")) => {
            if a.media_type == b.media_type && a.features.is_empty() && b.features.is_empty() {
                MediaMerge::Merged(MediaQuery {
                    modifier: Some("not".to_string()),
                    media_type: a.media_type.clone(),
                    features: Vec::new(),
                })
            } else {
                MediaMerge::Unrepresentable
            }
        }
        (Some("not"), None) => merge_not_and_plain(a, b),
        (None, Some("not")) => merge_not_and_plain(b, a),
        _ => {
            let media_type = match (&a.media_type, &b.media_type) {
                (None, other) | (other, None) => other.clone(),
                (Some(x), Some(y)) if x.eq_ignore_ascii_case("all") => Some(y.clone()),
                (Some(x), Some(y)) if y.eq_ignore_ascii_case("all") => Some(x.clone()),
                (Some(x), Some(y)) if x.eq_ignore_ascii_case(y) => Some(x.clone()),
                _ => return MediaMerge::Empty,
            };
            let mut features = a.features.clone();
            features.extend(b.features.iter().cloned());
            MediaMerge::Merged(MediaQuery {
                modifier: None,
                media_type,
                features,
            })
        }
    }
}

fn merge_not_and_plain(not_query: &MediaQuery, plain: &MediaQuery) -> MediaMerge {
    let types_match = not_query.media_type.is_none()
        || plain.media_type.is_none()
        || not_query
            .media_type
            .as_deref()
            .unwrap()
            .eq_ignore_ascii_case(plain.media_type.as_deref().unwrap_or(""));

    if !types_match {
        // Disjoint media types: `not` has no effect on the other query.
        return MediaMerge::Merged(plain.clone());
    }
    if not_query.features.is_empty() {
        // `not X and X` has no overlap.
        MediaMerge::Empty
    } else {
        MediaMerge::Unrepresentable
    }
}

/// Parses a comma-separated `@media` query list (§6 `parse_media_query_list`).
pub fn parse_media_query_list(text: &str, span: &Span) -> SassResult<Vec<MediaQuery>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|part| parse_one(part, span))
        .collect()
}

fn parse_one(text: &str, span: &Span) -> SassResult<MediaQuery> {
    let mut modifier = None;
    let mut media_type = None;
    let mut features = Vec::new();

    let mut rest = text;
    if rest.starts_with('(') {
        features = split_feature_clauses(rest, span)?;
        return Ok(MediaQuery {
            modifier,
            media_type,
            features,
        });
    }

    for (i, word) in rest.splitn(2, char::is_whitespace).enumerate() {
        if i == 0 {
            if word.eq_ignore_ascii_case("not") || word.eq_ignore_ascii_case("only") {
                modifier = Some(word.to_ascii_lowercase());
            } else {
                media_type = Some(word.to_string());
                break;
            }
        }
    }

    if modifier.is_some() {
        rest = rest.trim_start_matches(|c: char| !c.is_whitespace());
        rest = rest.trim_start();
        let mut parts = rest.splitn(2, char::is_whitespace);
        if let Some(ty) = parts.next().filter(|s| !s.is_empty()) {
            media_type = Some(ty.to_string());
            rest = parts.next().unwrap_or("").trim_start();
        } else {
            rest = "";
        }
    } else if media_type.is_some() {
        rest = rest.trim_start_matches(|c: char| !c.is_whitespace()).trim_start();
    }

    if let Some(and_clause) = rest.strip_prefix("and") {
        features = split_feature_clauses(and_clause.trim_start(), span)?;
    } else if !rest.is_empty() {
        return Err(SassError::ParseError {
            message: format!("expected \"and\", got \"{rest}\""),
            span: span.clone(),
        });
    }

    Ok(MediaQuery {
        modifier,
        media_type,
        features,
    })
}

fn split_feature_clauses(text: &str, span: &Span) -> SassResult<Vec<String>> {
    let mut features = Vec::new();
    let mut rest = text.trim();
    loop {
        if !rest.starts_with('(') {
            return Err(SassError::ParseError {
                message: "expected a parenthesised media feature".to_string(),
                span: span.clone(),
            });
        }
        let mut depth = 0;
        let mut end = None;
        for (i, c) in rest.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| SassError::ParseError {
            message: "unterminated media feature".to_string(),
            span: span.clone(),
        })?;
        features.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
        if let Some(next) = rest.strip_prefix("and") {
            rest = next.trim_start();
        } else if rest.is_empty() {
            break;
        } else {
            return Err(SassError::ParseError {
                message: format!("expected \"and\", got \"{rest}\""),
                span: span.clone(),
            });
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::SourceFile;

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn parses_a_plain_type() {
        let list = parse_media_query_list("screen", &span()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].media_type.as_deref(), Some("screen"));
    }

    #[test]
    fn parses_type_with_feature() {
        let list = parse_media_query_list("screen and (min-width: 100px)", &span()).unwrap();
        assert_eq!(list[0].features, vec!["(min-width: 100px)"]);
    }

    #[test]
    fn parses_bare_feature_condition() {
        let list = parse_media_query_list("(min-width: 100px)", &span()).unwrap();
        assert!(list[0].media_type.is_none());
        assert_eq!(list[0].features.len(), 1);
    }

    #[test]
    fn merging_with_empty_list_is_a_no_op() {
        let a = parse_media_query_list("screen", &span()).unwrap();
        let merged = merge_lists(&a, &[]);
        assert_eq!(merged, a);
    }

    #[test]
    fn merging_two_different_types_drops_the_query() {
        let a = parse_media_query_list("screen", &span()).unwrap();
        let b = parse_media_query_list("print", &span()).unwrap();
        let merged = merge_lists(&a, &b);
        assert!(merged.is_empty());
    }

    #[test]
    fn merging_with_all_keeps_the_more_specific_type() {
        let a = parse_media_query_list("all", &span()).unwrap();
        let b = parse_media_query_list("screen", &span()).unwrap();
        let merged = merge_lists(&a, &b);
        assert_eq!(merged[0].media_type.as_deref(), Some("screen"));
    }
}
