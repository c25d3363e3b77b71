use std::rc::Rc;

use sass_diagnostics::{SassError, SassResult, SourceFile, Span};
use sass_env::ModuleMembers;
use sass_selectors::{parse_selector_list, SelectorList};
use sass_value::{ListSeparator, Value};

use super::register;

fn selector_text(value: &Value, span: &Span) -> SassResult<String> {
    match value {
        Value::String(s, _) => Ok(s.to_string()),
        Value::List(_) => sass_value::to_css_string(value, false, span),
        _ => Err(SassError::TypeError {
            message: format!("{} isn't a valid selector", value.type_name()),
            span: span.clone(),
        }),
    }
}

fn parse(text: &str, span: &Span) -> SassResult<SelectorList> {
    let file = SourceFile::new(span.file.url.clone(), text.to_string());
    parse_selector_list(text, false, false, file, 0)
}

/// Renders a [`SelectorList`] the way `sass:selector` functions do: a
/// comma-separated list of space-separated-compound lists of strings,
/// matching the representation Sass's own selector functions return.
fn to_value(list: &SelectorList) -> Value {
    let complexes = list
        .complexes
        .iter()
        .map(|c| Value::string(c.to_string(), false))
        .collect();
    Value::list(complexes, ListSeparator::Comma, false)
}

/// `sass:selector` (§1): parsing and reflection over C's selector AST.
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "parse", 1, Some(1), |args, span| {
        let text = selector_text(&args[0], span)?;
        Ok(to_value(&parse(&text, span)?))
    });

    register(&m, "is-superselector", 2, Some(2), |args, span| {
        let sup = parse(&selector_text(&args[0], span)?, span)?;
        let sub = parse(&selector_text(&args[1], span)?, span)?;
        // A conservative approximation: every complex of `sub` renders
        // identically to some complex of `sup` once `&` is resolved against
        // it. Full superselector containment (matching a strict superset of
        // elements) is out of scope (§1 non-goals: runtime type system
        // fidelity beyond the algebra this core actually implements).
        let matches = sub
            .complexes
            .iter()
            .all(|s| sup.complexes.iter().any(|p| p.to_string() == s.to_string()));
        Ok(Value::Boolean(matches))
    });

    register(&m, "nest", 1, None, |args, span| {
        let mut current = parse(&selector_text(&args[0], span)?, span)?;
        for arg in &args[1..] {
            let next = parse(&selector_text(arg, span)?, span)?;
            current = next.resolve_parent(&current);
        }
        Ok(to_value(&current))
    });

    m
}
