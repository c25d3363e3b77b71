use sass_diagnostics::{SassError, SassResult, Span};

/// A parsed `@at-root (with: ...)` / `(without: ...)` query (§9 supplement
/// C.8). `all` and `rule` are tracked separately from the at-rule name list
/// since they're keywords rather than names to match against an
/// [`crate::node::CssNode`]'s own at-rule name.
#[derive(Debug, Clone)]
pub struct AtRootQuery {
    include: bool,
    all: bool,
    rule: bool,
    names: Vec<String>,
}

impl AtRootQuery {
    /// The query in force when `@at-root` is written with no parens at
    /// all: excludes only the enclosing style rule.
    pub fn default_query() -> Self {
        Self {
            include: false,
            all: false,
            rule: true,
            names: Vec::new(),
        }
    }

    pub fn excludes_style_rule(&self) -> bool {
        let matches = self.all || self.rule;
        if self.include {
            !matches
        } else {
            matches
        }
    }

    pub fn excludes_name(&self, name: &str) -> bool {
        let matches = self.all || self.names.iter().any(|n| n.eq_ignore_ascii_case(name));
        if self.include {
            !matches
        } else {
            matches
        }
    }
}

/// Parses the parenthesized query of an `@at-root (with: rule media)` /
/// `(without: all)` statement (§6 `parse_at_root_query`). `text` may or may
/// not include the surrounding parens.
pub fn parse_at_root_query(text: &str, span: &Span) -> SassResult<AtRootQuery> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(AtRootQuery::default_query());
    }
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed)
        .trim();

    let mut split = inner.splitn(2, ':');
    let keyword = split.next().unwrap_or("").trim().to_ascii_lowercase();
    let include = match keyword.as_str() {
        "with" => true,
        "without" => false,
        other => {
            return Err(SassError::ParseError {
                message: format!("Expected \"with\" or \"without\" in @at-root query, got \"{other}\"."),
                span: span.clone(),
            })
        }
    };

    let rest = split.next().unwrap_or("").trim();
    let mut all = false;
    let mut rule = false;
    let mut names = Vec::new();
    for token in rest.split_whitespace() {
        match token.to_ascii_lowercase().as_str() {
            "all" => all = true,
            "rule" => rule = true,
            other => names.push(other.to_string()),
        }
    }

    Ok(AtRootQuery { include, all, rule, names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::SourceFile;

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn default_query_excludes_only_the_style_rule() {
        let q = AtRootQuery::default_query();
        assert!(q.excludes_style_rule());
        assert!(!q.excludes_name("media"));
    }

    #[test]
    fn without_all_excludes_everything() {
        let q = parse_at_root_query("(without: all)", &span()).unwrap();
        assert!(q.excludes_style_rule());
        assert!(q.excludes_name("media"));
        assert!(q.excludes_name("supports"));
    }

    #[test]
    fn with_rule_keeps_only_the_style_rule_and_excludes_the_rest() {
        let q = parse_at_root_query("(with: rule)", &span()).unwrap();
        assert!(!q.excludes_style_rule());
        assert!(q.excludes_name("media"));
    }

    #[test]
    fn without_media_excludes_just_that_at_rule_name() {
        let q = parse_at_root_query("(without: media)", &span()).unwrap();
        assert!(!q.excludes_style_rule());
        assert!(q.excludes_name("media"));
        assert!(!q.excludes_name("supports"));
    }
}
