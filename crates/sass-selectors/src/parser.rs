use std::sync::Arc;

use sass_diagnostics::{SassError, SassResult, SourceFile, Span};

use crate::ast::{
    AttributeOperator, AttributeSelector, Combinator, ComplexComponent, ComplexSelector,
    CompoundSelector, SelectorList, SimpleSelector,
};

/// Parses a comma-separated selector list, e.g. `a.foo > b, %c::before`
/// (§6 `parse_selector_list`). `allow_parent` permits `&`; `allow_placeholder`
/// permits `%name`. Both are false when parsing, for instance, an `@extend`
/// target embedded where neither makes sense.
pub fn parse_selector_list(
    text: &str,
    allow_parent: bool,
    allow_placeholder: bool,
    file: Arc<SourceFile>,
    base_offset: usize,
) -> SassResult<SelectorList> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
        file,
        base_offset,
        allow_parent,
        allow_placeholder,
    };
    let list = parser.parse_selector_list()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error(format!("unexpected token near \"{}\"", parser.remainder())));
    }
    Ok(list)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    file: Arc<SourceFile>,
    base_offset: usize,
    allow_parent: bool,
    allow_placeholder: bool,
}

const NESTED_SELECTOR_PSEUDOS: &[&str] = &["not", "is", "where", "has", "matches", "any", "current", "host-context"];

impl Parser {
    fn error(&self, message: impl Into<String>) -> SassError {
        let offset = self.base_offset + self.pos;
        SassError::ParseError {
            message: message.into(),
            span: Span::point(self.file.clone(), offset),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn remainder(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char) -> SassResult<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected \"{c}\"")))
        }
    }

    fn parse_selector_list(&mut self) -> SassResult<SelectorList> {
        let mut complexes = vec![self.parse_complex_selector()?];
        loop {
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
                self.skip_whitespace();
                complexes.push(self.parse_complex_selector()?);
            } else {
                break;
            }
        }
        Ok(SelectorList::new(complexes))
    }

    fn parse_complex_selector(&mut self) -> SassResult<ComplexSelector> {
        let mut components = Vec::new();
        self.skip_whitespace();
        components.push(ComplexComponent::Compound(self.parse_compound_selector()?));

        loop {
            let had_space = self.skip_whitespace_tracking();
            match self.peek() {
                Some(',') | None => break,
                Some(')') => break,
                Some(c @ ('>' | '+' | '~')) => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let combinator = match c {
                        '>' => Combinator::Child,
                        '+' => Combinator::NextSibling,
                        _ => Combinator::FollowingSibling,
                    };
                    components.push(ComplexComponent::Combinator(combinator));
                    components.push(ComplexComponent::Compound(self.parse_compound_selector()?));
                }
                _ => {
                    if had_space {
                        components.push(ComplexComponent::Combinator(Combinator::Descendant));
                        components.push(ComplexComponent::Compound(self.parse_compound_selector()?));
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(ComplexSelector::new(components))
    }

    fn skip_whitespace_tracking(&mut self) -> bool {
        let start = self.pos;
        self.skip_whitespace();
        self.pos != start
    }

    fn parse_compound_selector(&mut self) -> SassResult<CompoundSelector> {
        let mut simples = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | '>' | '+' | '~' | ')') {
                break;
            }
            simples.push(self.parse_simple_selector()?);
        }
        if simples.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(CompoundSelector::new(simples))
    }

    fn parse_simple_selector(&mut self) -> SassResult<SimpleSelector> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(SimpleSelector::Universal)
            }
            Some('.') => {
                self.pos += 1;
                Ok(SimpleSelector::Class(self.parse_identifier()?))
            }
            Some('#') => {
                self.pos += 1;
                Ok(SimpleSelector::Id(self.parse_identifier()?))
            }
            Some('%') if self.allow_placeholder => {
                self.pos += 1;
                Ok(SimpleSelector::Placeholder(self.parse_identifier()?))
            }
            Some('%') => Err(self.error("placeholder selectors aren't allowed here")),
            Some('&') if self.allow_parent => {
                self.pos += 1;
                let suffix = if matches!(self.peek(), Some(c) if is_name_char(c)) {
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                Ok(SimpleSelector::Parent(suffix))
            }
            Some('&') => Err(self.error("parent selectors aren't allowed here")),
            Some('[') => self.parse_attribute_selector(),
            Some(':') => self.parse_pseudo_selector(),
            Some(c) if is_name_start(c) => Ok(SimpleSelector::Type(self.parse_identifier()?)),
            _ => Err(self.error("expected selector")),
        }
    }

    fn parse_identifier(&mut self) -> SassResult<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute_selector(&mut self) -> SassResult<SimpleSelector> {
        self.expect('[')?;
        self.skip_whitespace();
        let first = self.parse_identifier()?;
        self.skip_whitespace();
        let (namespace, name) = if self.peek() == Some('|') && self.peek_at(1) != Some('=') {
            self.pos += 1;
            (Some(first), self.parse_identifier()?)
        } else {
            (None, first)
        };
        self.skip_whitespace();

        let operator = match self.peek() {
            Some('=') => {
                self.pos += 1;
                Some(AttributeOperator::Equal)
            }
            Some('~') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                Some(AttributeOperator::Includes)
            }
            Some('|') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                Some(AttributeOperator::DashMatch)
            }
            Some('^') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                Some(AttributeOperator::Prefix)
            }
            Some('$') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                Some(AttributeOperator::Suffix)
            }
            Some('*') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                Some(AttributeOperator::Substring)
            }
            _ => None,
        };

        let value = if operator.is_some() {
            self.skip_whitespace();
            Some(self.parse_attribute_value()?)
        } else {
            None
        };

        self.skip_whitespace();
        let modifier = match self.peek() {
            Some(c @ ('i' | 's' | 'I' | 'S')) => {
                self.pos += 1;
                Some(c.to_ascii_lowercase())
            }
            _ => None,
        };

        self.skip_whitespace();
        self.expect(']')?;

        Ok(SimpleSelector::Attribute(AttributeSelector {
            namespace,
            name,
            operator,
            value,
            modifier,
        }))
    }

    fn parse_attribute_value(&mut self) -> SassResult<String> {
        if matches!(self.peek(), Some('"') | Some('\'')) {
            let quote = self.advance().unwrap();
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c != quote) {
                self.pos += 1;
            }
            let text = self.chars[start..self.pos].iter().collect();
            self.expect(quote)?;
            Ok(text)
        } else {
            self.parse_identifier()
        }
    }

    fn parse_pseudo_selector(&mut self) -> SassResult<SimpleSelector> {
        self.expect(':')?;
        let is_element = if self.peek() == Some(':') {
            self.pos += 1;
            true
        } else {
            false
        };
        let name = self.parse_identifier()?;

        if self.peek() != Some('(') {
            return Ok(SimpleSelector::Pseudo {
                name,
                is_element,
                argument: None,
                selector: None,
            });
        }

        self.pos += 1;
        self.skip_whitespace();
        if NESTED_SELECTOR_PSEUDOS.contains(&name.to_ascii_lowercase().as_str()) {
            let selector = self.parse_selector_list()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(SimpleSelector::Pseudo {
                name,
                is_element,
                argument: None,
                selector: Some(selector),
            });
        }

        let start = self.pos;
        let mut depth = 1;
        while let Some(c) = self.peek() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        let argument: String = self.chars[start..self.pos].iter().collect();
        self.expect(')')?;
        Ok(SimpleSelector::Pseudo {
            name,
            is_element,
            argument: Some(argument.trim().to_string()),
            selector: None,
        })
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, allow_parent: bool, allow_placeholder: bool) -> SelectorList {
        let file = SourceFile::new(None, text.to_string());
        parse_selector_list(text, allow_parent, allow_placeholder, file, 0).unwrap()
    }

    #[test]
    fn parses_a_simple_type_and_class() {
        let list = parse("a.foo", false, false);
        assert_eq!(list.to_string(), "a.foo");
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse("a.foo > b c", false, false);
        assert_eq!(list.to_string(), "a.foo > b c");
    }

    #[test]
    fn parses_comma_separated_list() {
        let list = parse("a, b.c", false, false);
        assert_eq!(list.complexes.len(), 2);
    }

    #[test]
    fn parses_placeholder_and_parent() {
        let list = parse("&-foo", true, false);
        let SimpleSelector::Parent(Some(suffix)) = &list.complexes[0].compound_at(0).unwrap().simples[0]
        else {
            panic!("expected a suffixed parent selector");
        };
        assert_eq!(suffix, "foo");

        let placeholders = parse("%button", false, true);
        assert!(matches!(
            placeholders.complexes[0].compound_at(0).unwrap().simples[0],
            SimpleSelector::Placeholder(_)
        ));
    }

    #[test]
    fn parses_nested_selector_pseudo() {
        let list = parse(":not(.a, .b)", false, false);
        let SimpleSelector::Pseudo { selector: Some(inner), .. } =
            &list.complexes[0].compound_at(0).unwrap().simples[0]
        else {
            panic!("expected a nested selector list");
        };
        assert_eq!(inner.complexes.len(), 2);
    }

    #[test]
    fn rejects_parent_selector_when_disallowed() {
        assert!(parse_selector_list("&", false, false, SourceFile::new(None, "&"), 0).is_err());
    }
}
