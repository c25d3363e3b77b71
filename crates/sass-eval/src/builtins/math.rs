use std::rc::Rc;

use sass_diagnostics::{SassError, SassResult, Span};
use sass_env::ModuleMembers;
use sass_value::{compare, Comparison, Number, Value};

use super::register;

fn type_error(message: impl Into<String>, span: &Span) -> SassError {
    SassError::TypeError {
        message: message.into(),
        span: span.clone(),
    }
}

fn number(value: &Value, span: &Span) -> SassResult<&Number> {
    match value {
        Value::Number(n) => Ok(n),
        _ => Err(type_error(format!("{} isn't a number", value.type_name()), span)),
    }
}

/// `sass:math` (§1): a representative slice of the numeric built-ins,
/// enough to exercise every shape the calculation/number algebra (C4)
/// supports — rounding, extrema, and the trig set `Calculation::simplify`
/// already knows how to fold eagerly.
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "round", 1, Some(1), |args, span| {
        let n = number(&args[0], span)?;
        Ok(Value::Number(Number::with_units(n.value.round(), n.numer.clone(), n.denom.clone())))
    });

    register(&m, "ceil", 1, Some(1), |args, span| {
        let n = number(&args[0], span)?;
        Ok(Value::Number(Number::with_units(n.value.ceil(), n.numer.clone(), n.denom.clone())))
    });

    register(&m, "floor", 1, Some(1), |args, span| {
        let n = number(&args[0], span)?;
        Ok(Value::Number(Number::with_units(n.value.floor(), n.numer.clone(), n.denom.clone())))
    });

    register(&m, "abs", 1, Some(1), |args, span| {
        let n = number(&args[0], span)?;
        Ok(Value::Number(Number::with_units(n.value.abs(), n.numer.clone(), n.denom.clone())))
    });

    register(&m, "sqrt", 1, Some(1), |args, span| {
        let n = number(&args[0], span)?;
        if !n.is_unitless() {
            return Err(type_error(format!("{n} isn't unitless"), span));
        }
        Ok(Value::Number(Number::new(n.value.sqrt())))
    });

    register(&m, "min", 1, None, |args, span| {
        extremum(args, span, Comparison::Less)
    });

    register(&m, "max", 1, None, |args, span| {
        extremum(args, span, Comparison::Greater)
    });

    register(&m, "div", 2, Some(2), |args, span| sass_value::div(&args[0], &args[1], span));

    m
}

fn extremum(args: &[Value], span: &Span, keep_if: Comparison) -> SassResult<Value> {
    let mut best = args[0].clone();
    for candidate in &args[1..] {
        let replaces = matches!(
            compare(candidate, &best, keep_if, span)?,
            Value::Boolean(true)
        );
        if replaces {
            best = candidate.clone();
        }
    }
    Ok(best)
}
