use std::rc::Rc;

use sass_diagnostics::{SassError, SassResult, Span};
use sass_env::ModuleMembers;
use sass_value::{Number, Value};

use super::register;

fn type_error(message: impl Into<String>, span: &Span) -> SassError {
    SassError::TypeError {
        message: message.into(),
        span: span.clone(),
    }
}

/// Always-visible global functions (§4.4: callable unqualified, with no
/// `@use` needed), matching the legacy global aliases of the equivalent
/// namespaced built-ins.
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "if", 2, Some(3), |args, _span| {
        if args[0].is_truthy() {
            Ok(args[1].clone())
        } else {
            Ok(args.get(2).cloned().unwrap_or(Value::Null))
        }
    });

    register(&m, "unit", 1, Some(1), |args, span| {
        let Value::Number(n) = &args[0] else {
            return Err(type_error(format!("{} isn't a number", args[0].type_name()), span));
        };
        let mut text = String::new();
        for u in &n.numer {
            text.push_str(&u.to_string());
        }
        if !n.denom.is_empty() {
            text.push('/');
            for u in &n.denom {
                text.push_str(&u.to_string());
            }
        }
        Ok(Value::string(text, true))
    });

    register(&m, "unitless", 1, Some(1), |args, span| {
        let Value::Number(n) = &args[0] else {
            return Err(type_error(format!("{} isn't a number", args[0].type_name()), span));
        };
        Ok(Value::Boolean(n.is_unitless()))
    });

    register(&m, "type-of", 1, Some(1), |args, _span| {
        Ok(Value::string(args[0].type_name(), false))
    });

    register(&m, "length", 1, Some(1), |args, _span| {
        Ok(Value::Number(Number::new(args[0].as_list().len() as f64)))
    });

    register(&m, "nth", 2, Some(2), |args, span| {
        let list = args[0].as_list();
        let index = list_index(&args[1], list.len(), span)?;
        Ok(list[index].clone())
    });

    m
}

/// Shared 1-based, negative-from-the-end index resolution used by `nth`,
/// `set-nth`, and `list.nth` (§9 list index convention).
pub(crate) fn list_index(value: &Value, len: usize, span: &Span) -> SassResult<usize> {
    let Value::Number(n) = value else {
        return Err(type_error(format!("{} isn't a number", value.type_name()), span));
    };
    let Some(i) = n.to_integer() else {
        return Err(type_error(format!("{n} isn't an integer"), span));
    };
    if i == 0 || i.unsigned_abs() as usize > len {
        return Err(type_error(format!("invalid index {i} for a list of length {len}"), span));
    }
    if i > 0 {
        Ok(i as usize - 1)
    } else {
        Ok(len - i.unsigned_abs() as usize)
    }
}
