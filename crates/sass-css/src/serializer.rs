use sass_diagnostics::{SassResult, Span};
use sass_value::{format_decimal, Value};

use crate::arena::{CssTree, NodeId};
use crate::colors::name_for_rgb;
use crate::node::CssNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Expanded,
    Compressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFeed {
    Lf,
    Cr,
    Crlf,
    Lfcr,
}

impl LineFeed {
    fn as_str(self) -> &'static str {
        match self {
            LineFeed::Lf => "\n",
            LineFeed::Cr => "\r",
            LineFeed::Crlf => "\r\n",
            LineFeed::Lfcr => "\n\r",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SerializeOptions {
    pub style: OutputStyle,
    /// 0-10 spaces (or tab stops when `use_tabs` is set) per indent level.
    pub indent_width: u8,
    pub use_tabs: bool,
    pub line_feed: LineFeed,
    pub source_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            style: OutputStyle::Expanded,
            indent_width: 2,
            use_tabs: false,
            line_feed: LineFeed::Lf,
            source_map: false,
        }
    }
}

pub struct SerializeOutput {
    pub text: String,
    pub map: Option<String>,
}

pub fn serialize(tree: &CssTree, options: &SerializeOptions) -> SassResult<SerializeOutput> {
    let mut serializer = Serializer::new(tree, options);
    serializer.serialize_children(tree.root())?;

    let has_non_ascii = serializer.out.bytes().any(|b| b >= 0x80);
    let mut text = serializer.out;
    if has_non_ascii {
        match options.style {
            OutputStyle::Expanded => {
                text = format!("@charset \"UTF-8\";{}{text}", options.line_feed.as_str());
            }
            OutputStyle::Compressed => {
                text = format!("\u{feff}{text}");
            }
        }
    }

    let map = if options.source_map {
        Some(serializer.map_builder.into_sourcemap_json())
    } else {
        None
    };

    Ok(SerializeOutput { text, map })
}

struct Serializer<'a> {
    tree: &'a CssTree,
    options: &'a SerializeOptions,
    out: String,
    line: u32,
    column: u32,
    indent: usize,
    map_builder: MapBuilder,
}

impl<'a> Serializer<'a> {
    fn new(tree: &'a CssTree, options: &'a SerializeOptions) -> Self {
        Self {
            tree,
            options,
            out: String::new(),
            line: 0,
            column: 0,
            indent: 0,
            map_builder: MapBuilder::new(options.source_map),
        }
    }

    fn compressed(&self) -> bool {
        self.options.style == OutputStyle::Compressed
    }

    fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        if !self.compressed() {
            self.write(self.options.line_feed.as_str());
        }
    }

    fn write_indent(&mut self) {
        if self.compressed() {
            return;
        }
        if self.options.use_tabs {
            self.write(&"\t".repeat(self.indent));
        } else {
            self.write(&" ".repeat(self.indent * self.options.indent_width as usize));
        }
    }

    fn mark(&mut self, span: Option<&Span>) {
        if let Some(span) = span {
            self.map_builder.add(self.line, self.column, span);
        }
    }

    fn serialize_children(&mut self, id: NodeId) -> SassResult<()> {
        let children: Vec<NodeId> = self.tree.get(id).children().to_vec();
        for (i, child) in children.iter().enumerate() {
            self.serialize_node(*child)?;
            let is_last = i + 1 == children.len();
            if !is_last && !self.compressed() {
                if let CssNode::StyleRule { is_group_end: true, .. } = self.tree.get(*child) {
                    self.newline();
                }
            }
        }
        Ok(())
    }

    fn serialize_node(&mut self, id: NodeId) -> SassResult<()> {
        self.mark(self.tree.span(id).cloned().as_ref());
        match self.tree.get(id).clone() {
            CssNode::Stylesheet { .. } => self.serialize_children(id)?,
            CssNode::StyleRule { selector, children: _, .. } => {
                // A selector branch that's only a placeholder (or a
                // pseudo-class whose whole argument is) never reaches
                // output (§3 "Placeholder selector", §8 worked example:
                // "placeholder suppressed, extender materialised") —
                // unless `@extend` folded a visible selector into it
                // first, which mutates `selector` in place before this
                // ever runs (§4.5).
                let visible: Vec<_> = selector
                    .complexes
                    .iter()
                    .filter(|c| !c.is_invisible())
                    .cloned()
                    .collect();
                if visible.is_empty() {
                    return Ok(());
                }
                let visible_selector = sass_selectors::SelectorList::new(visible);
                self.write_indent();
                self.write(&selector_to_css(&visible_selector, self.compressed()));
                self.write_block(id)?;
            }
            CssNode::MediaRule { queries, .. } => {
                self.write_indent();
                self.write("@media ");
                self.write(&media_list_to_css(&queries, self.compressed()));
                self.write_block(id)?;
            }
            CssNode::SupportsRule { condition_text, .. } => {
                self.write_indent();
                self.write("@supports ");
                self.write(&condition_text);
                self.write_block(id)?;
            }
            CssNode::AtRule {
                name, value, childless, ..
            } => {
                self.write_indent();
                self.write("@");
                self.write(&name);
                if let Some(v) = &value {
                    self.write(" ");
                    self.write(v);
                }
                if childless {
                    self.write(";");
                    self.newline();
                } else {
                    self.write_block(id)?;
                }
            }
            CssNode::KeyframeBlock { selectors, .. } => {
                self.write_indent();
                let sep = if self.compressed() { "," } else { ", " };
                self.write(&selectors.join(sep));
                self.write_block(id)?;
            }
            CssNode::Declaration {
                name,
                value,
                parsed_as_custom_property,
                important,
                value_span_for_map,
            } => {
                self.write_indent();
                self.write(&name);
                self.write(if self.compressed() { ":" } else { ": " });
                self.mark(value_span_for_map.as_ref());
                let text = if parsed_as_custom_property {
                    format_custom_property(&value, self.indent, self.options)?
                } else {
                    format_value(&value, self.compressed())?
                };
                self.write(&text);
                if important {
                    self.write(if self.compressed() { "!important" } else { " !important" });
                }
                self.write(";");
                self.newline();
            }
            CssNode::Import { url_text, modifiers } => {
                self.write_indent();
                self.write("@import ");
                self.write(&url_text);
                if let Some(m) = &modifiers {
                    self.write(" ");
                    self.write(m);
                }
                self.write(";");
                self.newline();
            }
            CssNode::Comment { text, preserved } => {
                if preserved || !self.compressed() {
                    self.write_indent();
                    self.write(&text);
                    self.newline();
                }
            }
        }
        Ok(())
    }

    fn write_block(&mut self, id: NodeId) -> SassResult<()> {
        let children = self.tree.get(id).children().to_vec();
        if self.compressed() {
            self.write("{");
            self.indent += 1;
            for (i, child) in children.iter().enumerate() {
                self.serialize_node(*child)?;
                if i + 1 != children.len() {
                    strip_trailing(&mut self.out, ';');
                    self.write(";");
                }
            }
            strip_trailing(&mut self.out, ';');
            self.indent -= 1;
            self.write("}");
        } else {
            self.write(" {");
            self.newline();
            self.indent += 1;
            self.serialize_children(id)?;
            self.indent -= 1;
            self.write_indent();
            self.write("}");
            self.newline();
        }
        Ok(())
    }
}

fn strip_trailing(out: &mut String, c: char) {
    if out.ends_with(c) {
        out.pop();
    }
    while out.ends_with(['\n', '\r']) {
        out.pop();
    }
}

fn selector_to_css(selector: &sass_selectors::SelectorList, compressed: bool) -> String {
    let _ = compressed;
    // Invisible (placeholder-only) branches are already filtered out by
    // the caller; plain `Display` matches the compressed whitespace
    // contract (no spaces introduced beyond the combinators themselves).
    selector.to_string()
}

fn media_list_to_css(queries: &[crate::media::MediaQuery], compressed: bool) -> String {
    let sep = if compressed { "," } else { ", " };
    queries
        .iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Formats a [`Value`] as a CSS declaration value, applying the
/// compressed-mode rules from §4.6: shortest color representation, a
/// dropped leading zero, and bare-identifier `url(...)` collapsing.
pub fn format_value(value: &Value, compressed: bool) -> SassResult<String> {
    match value {
        Value::Number(n) => Ok(format_number(n, compressed)),
        Value::Color(c) => Ok(format_color(c, compressed)),
        Value::String(s, quoted) => {
            if *quoted {
                Ok(format_quoted_string(s))
            } else {
                Ok(collapse_url(s, compressed))
            }
        }
        _ => {
            let span = Span::point(sass_diagnostics::SourceFile::new(None, ""), 0);
            sass_value::to_css_string(value, false, &span)
        }
    }
}

fn format_number(n: &sass_value::Number, compressed: bool) -> String {
    let mut text = n.format_plain(10);
    if compressed {
        if let Some(rest) = text.strip_prefix("0.") {
            text = format!(".{rest}");
        } else if let Some(rest) = text.strip_prefix("-0.") {
            text = format!("-.{rest}");
        }
    }
    if let Some(unit) = n.single_unit() {
        text.push_str(&unit.to_string());
    }
    text
}

fn format_color(c: &sass_value::Color, compressed: bool) -> String {
    if !c.is_fully_opaque() {
        return format!(
            "rgba({}, {}, {}, {})",
            c.red,
            c.green,
            c.blue,
            format_decimal(c.alpha, 10)
        );
    }

    let hex6 = format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue);
    let hex3 = short_hex(c.red, c.green, c.blue);
    let name = name_for_rgb(c.red, c.green, c.blue);

    let mut candidates: Vec<String> = vec![hex6];
    if let Some(h3) = hex3 {
        candidates.push(h3);
    }
    if let Some(n) = name {
        candidates.push(n.to_string());
    }
    if !compressed {
        if let Some(text) = &c.original_text {
            candidates.push(text.clone());
        }
    }

    candidates.into_iter().min_by_key(|s| s.len()).unwrap()
}

fn short_hex(r: u8, g: u8, b: u8) -> Option<String> {
    let doubled = |v: u8| (v >> 4) == (v & 0xf);
    if doubled(r) && doubled(g) && doubled(b) {
        Some(format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf))
    } else {
        None
    }
}

fn format_quoted_string(s: &str) -> String {
    let single_escapes = s.chars().filter(|&c| c == '\'').count();
    let double_escapes = s.chars().filter(|&c| c == '"').count();
    let quote = if double_escapes > single_escapes { '\'' } else { '"' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}

fn collapse_url(s: &str, compressed: bool) -> String {
    if !compressed {
        return s.to_string();
    }
    if let Some(inner) = s.strip_prefix("url(").and_then(|r| r.strip_suffix(')')) {
        let trimmed = inner.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|r| r.strip_suffix('"'))
            .or_else(|| trimmed.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')));
        if let Some(bare) = unquoted {
            if is_bare_url_safe(bare) {
                return format!("url({bare})");
            }
        }
    }
    s.to_string()
}

fn is_bare_url_safe(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '~' | '?' | '#' | '%'))
}

/// Re-indents a custom property's value (§4.6): trailing whitespace is
/// folded off each line and the minimum indentation is re-aligned to the
/// declaration's own indent level. Compressed mode instead collapses every
/// line break to a single space.
fn format_custom_property(value: &Value, indent: usize, options: &SerializeOptions) -> SassResult<String> {
    let text = match value {
        Value::String(s, false) => s.to_string(),
        other => format_value(other, options.style == OutputStyle::Compressed)?,
    };

    if options.style == OutputStyle::Compressed {
        return Ok(text.lines().map(str::trim).collect::<Vec<_>>().join(" "));
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 1 {
        return Ok(text.trim_end().to_string());
    }

    let min_indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let pad = if options.use_tabs {
        "\t".repeat(indent)
    } else {
        " ".repeat(indent * options.indent_width as usize)
    };

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let trimmed_end = line.trim_end();
        if i == 0 {
            out.push_str(trimmed_end);
        } else {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(trimmed_end.get(min_indent..).unwrap_or(trimmed_end.trim_start()));
        }
    }
    Ok(out)
}

struct MapBuilder {
    enabled: bool,
    builder: Option<sourcemap::SourceMapBuilder>,
}

impl MapBuilder {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            builder: enabled.then(|| sourcemap::SourceMapBuilder::new(None)),
        }
    }

    fn add(&mut self, out_line: u32, out_col: u32, span: &Span) {
        if !self.enabled {
            return;
        }
        let Some(builder) = self.builder.as_mut() else { return };
        let (line, col) = span.start_location();
        builder.add(
            out_line,
            out_col,
            line.saturating_sub(1) as u32,
            col.saturating_sub(1) as u32,
            Some(span.file.display_url()),
            None,
        );
    }

    fn into_sourcemap_json(self) -> String {
        let Some(builder) = self.builder else { return "{}".to_string() };
        let map = builder.into_sourcemap();
        let mut buf = Vec::new();
        if map.to_writer(&mut buf).is_ok() {
            String::from_utf8(buf).unwrap_or_else(|_| "{}".to_string())
        } else {
            "{}".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaQuery;
    use crate::node::CssNode;
    use sass_selectors::{ComplexSelector, ComplexComponent, CompoundSelector, SelectorList, SimpleSelector};
    use sass_value::Number;

    fn type_selector(name: &str) -> SelectorList {
        SelectorList::new(vec![ComplexSelector::new(vec![ComplexComponent::Compound(
            CompoundSelector::new(vec![SimpleSelector::Type(name.to_string())]),
        )])])
    }

    #[test]
    fn serializes_a_simple_declaration() {
        let mut tree = CssTree::new();
        let root = tree.root();
        let rule = tree.insert(
            CssNode::StyleRule {
                selector: type_selector("a"),
                original_selector: type_selector("a"),
                children: Vec::new(),
                is_group_end: false,
            },
            root,
            None,
        );
        tree.insert(
            CssNode::Declaration {
                name: "x".to_string(),
                value: Value::Number(Number::new(3.0)),
                parsed_as_custom_property: false,
                important: false,
                value_span_for_map: None,
            },
            rule,
            None,
        );

        let output = serialize(&tree, &SerializeOptions::default()).unwrap();
        assert_eq!(output.text, "a {\n  x: 3;\n}\n");
    }

    #[test]
    fn compressed_color_prefers_the_shortest_representation() {
        let mut tree = CssTree::new();
        let root = tree.root();
        let rule = tree.insert(
            CssNode::StyleRule {
                selector: type_selector("a"),
                original_selector: type_selector("a"),
                children: Vec::new(),
                is_group_end: false,
            },
            root,
            None,
        );
        tree.insert(
            CssNode::Declaration {
                name: "color".to_string(),
                value: Value::Color(sass_value::Color::rgb(255, 0, 0)),
                parsed_as_custom_property: false,
                important: false,
                value_span_for_map: None,
            },
            rule,
            None,
        );

        let options = SerializeOptions {
            style: OutputStyle::Compressed,
            ..SerializeOptions::default()
        };
        let output = serialize(&tree, &options).unwrap();
        assert_eq!(output.text, "a{color:red}");
    }

    #[test]
    fn media_rule_bubbles_a_style_rule_inside() {
        let mut tree = CssTree::new();
        let root = tree.root();
        let media = tree.insert(
            CssNode::MediaRule {
                queries: vec![MediaQuery {
                    modifier: None,
                    media_type: Some("screen".to_string()),
                    features: Vec::new(),
                }],
                children: Vec::new(),
            },
            root,
            None,
        );
        let rule = tree.insert(
            CssNode::StyleRule {
                selector: type_selector("a"),
                original_selector: type_selector("a"),
                children: Vec::new(),
                is_group_end: false,
            },
            media,
            None,
        );
        tree.insert(
            CssNode::Declaration {
                name: "b".to_string(),
                value: Value::string("c", false),
                parsed_as_custom_property: false,
                important: false,
                value_span_for_map: None,
            },
            rule,
            None,
        );

        let output = serialize(&tree, &SerializeOptions::default()).unwrap();
        assert_eq!(output.text, "@media screen {\n  a {\n    b: c;\n  }\n}\n");
    }
}
