use std::rc::Rc;

use sass_diagnostics::{SassError, Span};
use sass_env::ModuleMembers;
use sass_value::{ListSeparator, SassMap, Value};

use super::register;

fn map(value: &Value, span: &Span) -> Result<&SassMap, SassError> {
    match value {
        Value::Map(m) => Ok(m),
        _ => Err(SassError::TypeError {
            message: format!("{} isn't a map", value.type_name()),
            span: span.clone(),
        }),
    }
}

/// `sass:map` (§1), operating on [`SassMap`]'s structural-equality/bag
/// semantics (C4 §4.1).
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "get", 2, Some(2), |args, span| {
        Ok(map(&args[0], span)?.get(&args[1]).cloned().unwrap_or(Value::Null))
    });

    register(&m, "has-key", 2, Some(2), |args, span| {
        Ok(Value::Boolean(map(&args[0], span)?.get(&args[1]).is_some()))
    });

    register(&m, "keys", 1, Some(1), |args, span| {
        let items = map(&args[0], span)?.iter().map(|(k, _)| k.clone()).collect();
        Ok(Value::list(items, ListSeparator::Comma, false))
    });

    register(&m, "values", 1, Some(1), |args, span| {
        let items = map(&args[0], span)?.iter().map(|(_, v)| v.clone()).collect();
        Ok(Value::list(items, ListSeparator::Comma, false))
    });

    register(&m, "merge", 2, Some(2), |args, span| {
        let mut out = map(&args[0], span)?.clone();
        for (k, v) in map(&args[1], span)?.iter() {
            out.insert(k.clone(), v.clone());
        }
        Ok(Value::Map(Rc::new(out)))
    });

    register(&m, "remove", 2, None, |args, span| {
        let source = map(&args[0], span)?;
        let mut out = SassMap::new();
        for (k, v) in source.iter() {
            if !args[1..].iter().any(|target| target.equals(k)) {
                out.insert(k.clone(), v.clone());
            }
        }
        Ok(Value::Map(Rc::new(out)))
    });

    m
}
