use std::rc::Rc;

use sass_diagnostics::{SassError, Span};
use sass_env::ModuleMembers;
use sass_value::{Number, Value};

use super::{global::list_index, register};

fn string(value: &Value, span: &Span) -> Result<(&str, bool), SassError> {
    match value {
        Value::String(s, quoted) => Ok((s, *quoted)),
        _ => Err(SassError::TypeError {
            message: format!("{} isn't a string", value.type_name()),
            span: span.clone(),
        }),
    }
}

/// `sass:string` (§1).
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "length", 1, Some(1), |args, span| {
        let (s, _) = string(&args[0], span)?;
        Ok(Value::Number(Number::new(s.chars().count() as f64)))
    });

    register(&m, "to-upper-case", 1, Some(1), |args, span| {
        let (s, quoted) = string(&args[0], span)?;
        Ok(Value::string(s.to_uppercase(), quoted))
    });

    register(&m, "to-lower-case", 1, Some(1), |args, span| {
        let (s, quoted) = string(&args[0], span)?;
        Ok(Value::string(s.to_lowercase(), quoted))
    });

    register(&m, "unquote", 1, Some(1), |args, span| {
        let (s, _) = string(&args[0], span)?;
        Ok(Value::string(s.to_string(), false))
    });

    register(&m, "quote", 1, Some(1), |args, span| {
        let (s, _) = string(&args[0], span)?;
        Ok(Value::string(s.to_string(), true))
    });

    register(&m, "slice", 2, Some(3), |args, span| {
        let (s, quoted) = string(&args[0], span)?;
        let chars: Vec<char> = s.chars().collect();
        let start = list_index(&args[1], chars.len(), span)?;
        let end = match args.get(2) {
            Some(v) => list_index(v, chars.len(), span)?,
            None => chars.len() - 1,
        };
        if start > end {
            return Ok(Value::string("", quoted));
        }
        let slice: String = chars[start..=end].iter().collect();
        Ok(Value::string(slice, quoted))
    });

    m
}
