use sass_diagnostics::{SassError, SassResult, Span};

use crate::number::Number;
use crate::unit::fuzzy_equals;
use crate::value::{ListSeparator, SassMap, Value};

fn type_error(message: impl Into<String>, span: &Span) -> SassError {
    SassError::TypeError {
        message: message.into(),
        span: span.clone(),
    }
}

/// `a + b`. Numeric addition unifies units (§4.1); strings concatenate,
/// inheriting the quoting of the left-hand operand; any other pairing
/// stringifies both sides and concatenates them unquoted.
pub fn plus(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric_op(a, b, span, |x, y| x + y)?)),
        (Value::String(a, quoted), rhs) => {
            let rhs_text = to_css_string(rhs, false, span)?;
            Ok(Value::string(format!("{a}{rhs_text}"), *quoted))
        }
        (Value::Map(_) | Value::List(_), _) | (_, Value::Map(_) | Value::List(_)) => {
            let a = to_css_string(lhs, false, span)?;
            let b = to_css_string(rhs, false, span)?;
            Ok(Value::string(format!("{a}{b}"), false))
        }
        _ => {
            let a = to_css_string(lhs, false, span)?;
            let b = to_css_string(rhs, false, span)?;
            Ok(Value::string(format!("{a}{b}"), false))
        }
    }
}

/// `a - b`. Numeric subtraction unifies units; any non-numeric pairing
/// produces `"a-b"` as an unquoted string (§4.1).
pub fn minus(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric_op(a, b, span, |x, y| x - y)?)),
        _ => {
            let a = to_css_string(lhs, false, span)?;
            let b = to_css_string(rhs, false, span)?;
            Ok(Value::string(format!("{a}-{b}"), false))
        }
    }
}

/// `a * b`. Defined only on numbers; units multiply (numerators and
/// denominators concatenate, then cancel).
pub fn times(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(Number::with_units(
            a.value * b.value,
            [a.numer.clone(), b.numer.clone()].concat(),
            [a.denom.clone(), b.denom.clone()].concat(),
        ))),
        _ => Err(type_error(
            format!("{} isn't a number for `*`", lhs.type_name()),
            span,
        )),
    }
}

/// `a / b`. Defined only on numbers; unlike the other arithmetic
/// operators this also records `slash_parents` on the result so the
/// legacy `a/b` serialization can still be produced (§9), but only when
/// the operands came straight from the `/` token — any later arithmetic
/// clears it, which callers enforce by only setting `slash_parents` here
/// and never propagating an existing one through `numeric_op`.
pub fn div(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let mut result = Number::with_units(
                a.value / b.value,
                [a.numer.clone(), b.denom.clone()].concat(),
                [a.denom.clone(), b.numer.clone()].concat(),
            );
            result.slash_parents = Some((Box::new(a.clone()), Box::new(b.clone())));
            Ok(Value::Number(result))
        }
        _ => Err(type_error(
            format!("{} isn't a number for `/`", lhs.type_name()),
            span,
        )),
    }
}

/// `a % b`. Defined only on numbers; the right operand is converted into
/// the left operand's units before the modulo.
pub fn modulo(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric_op(a, b, span, |x, y| {
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) {
                r + y
            } else {
                r
            }
        })?)),
        _ => Err(type_error(
            format!("{} isn't a number for `%`", lhs.type_name()),
            span,
        )),
    }
}

fn numeric_op(a: &Number, b: &Number, span: &Span, f: impl Fn(f64, f64) -> f64) -> SassResult<Number> {
    let b_value = if b.is_unitless() {
        b.value
    } else {
        b.value_in_units(&a.numer, &a.denom)
            .ok_or_else(|| type_error(format!("{a} and {b} have incompatible units"), span))?
    };
    Ok(Number::with_units(f(a.value, b_value), a.numer.clone(), a.denom.clone()))
}

/// `a == b`, structural equality (§4.1); this is total and never errors.
pub fn equals(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(lhs.equals(rhs))
}

pub fn not_equals(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(!lhs.equals(rhs))
}

#[derive(Debug, Clone, Copy)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// Numeric ordering comparisons; fails for any non-number operand (§4.1).
pub fn compare(lhs: &Value, rhs: &Value, cmp: Comparison, span: &Span) -> SassResult<Value> {
    let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
        return Err(type_error(
            format!(
                "Undefined operation: \"{} {} {}\".",
                lhs.type_name(),
                comparison_symbol(cmp),
                rhs.type_name()
            ),
            span,
        ));
    };
    let b_value = b
        .value_in_units(&a.numer, &a.denom)
        .ok_or_else(|| type_error(format!("{a} and {b} have incompatible units"), span))?;
    let result = match cmp {
        Comparison::Greater => a.value > b_value,
        Comparison::GreaterOrEqual => a.value >= b_value || fuzzy_equals(a.value, b_value),
        Comparison::Less => a.value < b_value,
        Comparison::LessOrEqual => a.value <= b_value || fuzzy_equals(a.value, b_value),
    };
    Ok(Value::Boolean(result))
}

fn comparison_symbol(cmp: Comparison) -> &'static str {
    match cmp {
        Comparison::Greater => ">",
        Comparison::GreaterOrEqual => ">=",
        Comparison::Less => "<",
        Comparison::LessOrEqual => "<=",
    }
}

/// The legacy IE `and`-less assignment operator filter syntax:
/// `a=b` renders as the unquoted string `"a=b"`.
pub fn single_equals(lhs: &Value, rhs: &Value, span: &Span) -> SassResult<Value> {
    let a = to_css_string(lhs, false, span)?;
    let b = to_css_string(rhs, false, span)?;
    Ok(Value::string(format!("{a}={b}"), false))
}

/// Short-circuiting `and`; truthiness is "not (null or false)".
pub fn and(lhs: Value, eval_rhs: impl FnOnce() -> SassResult<Value>) -> SassResult<Value> {
    if !lhs.is_truthy() {
        Ok(lhs)
    } else {
        eval_rhs()
    }
}

pub fn or(lhs: Value, eval_rhs: impl FnOnce() -> SassResult<Value>) -> SassResult<Value> {
    if lhs.is_truthy() {
        Ok(lhs)
    } else {
        eval_rhs()
    }
}

pub fn unary_plus(value: &Value, span: &Span) -> SassResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(n.clone())),
        _ => Ok(Value::string(format!("+{}", to_css_string(value, false, span)?), false)),
    }
}

pub fn unary_minus(value: &Value, span: &Span) -> SassResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(n.unary_minus())),
        _ => Ok(Value::string(format!("-{}", to_css_string(value, false, span)?), false)),
    }
}

/// `unary-divide`: the CSS-only `/x` representation used when a leading
/// slash can't be parsed as division (e.g. inside `font: /1.2 sans-serif`).
pub fn unary_divide(value: &Value, span: &Span) -> SassResult<Value> {
    Ok(Value::string(format!("/{}", to_css_string(value, false, span)?), false))
}

pub fn not(value: &Value) -> Value {
    Value::Boolean(!value.is_truthy())
}

/// The total function from §4.1: every value can be rendered as CSS text
/// except `null`, an empty (unbracketed) list, and functions, all of which
/// fail outside `inspect` mode.
pub fn to_css_string(value: &Value, inspect: bool, span: &Span) -> SassResult<String> {
    match value {
        Value::Null => {
            if inspect {
                Ok("null".to_string())
            } else {
                Err(type_error("null isn't a valid CSS value", span))
            }
        }
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(format_number(n)),
        Value::Color(c) => Ok(format_color(c)),
        Value::String(s, quoted) => {
            if inspect && *quoted {
                Ok(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")))
            } else {
                Ok(s.to_string())
            }
        }
        Value::List(list) => {
            if list.items.is_empty() && !list.has_brackets {
                if inspect {
                    return Ok("()".to_string());
                }
                return Err(type_error("() isn't a valid CSS value", span));
            }
            let sep = separator_text(list.separator);
            let mut parts = Vec::with_capacity(list.items.len());
            for item in &list.items {
                parts.push(to_css_string(item, inspect, span)?);
            }
            let joined = parts.join(sep);
            if list.has_brackets {
                Ok(format!("[{joined}]"))
            } else {
                Ok(joined)
            }
        }
        Value::ArgumentList(args) => {
            let sep = separator_text(args.separator);
            let mut parts = Vec::with_capacity(args.positional.len());
            for item in &args.positional {
                parts.push(to_css_string(item, inspect, span)?);
            }
            Ok(parts.join(sep))
        }
        Value::Map(map) => {
            if inspect {
                Ok(format_map_inspect(map, span)?)
            } else {
                Err(type_error(format!("{map:?} isn't a valid CSS value"), span))
            }
        }
        Value::Function(f) => {
            if inspect {
                Ok(format!("get-function(\"{}\")", f.name))
            } else {
                Err(type_error(format!("{} isn't a valid CSS value", f.name), span))
            }
        }
        Value::Calculation(_) => Ok("calc()".to_string()),
    }
}

fn format_map_inspect(map: &SassMap, span: &Span) -> SassResult<String> {
    let mut parts = Vec::with_capacity(map.len());
    for (k, v) in map.iter() {
        parts.push(format!(
            "{}: {}",
            to_css_string(k, true, span)?,
            to_css_string(v, true, span)?
        ));
    }
    Ok(format!("({})", parts.join(", ")))
}

fn separator_text(sep: ListSeparator) -> &'static str {
    match sep {
        ListSeparator::Space => " ",
        ListSeparator::Comma => ", ",
        ListSeparator::Slash => "/",
        ListSeparator::Undecided => " ",
    }
}

fn format_number(n: &Number) -> String {
    n.to_string()
}

fn format_color(c: &crate::color::Color) -> String {
    if let Some(text) = &c.original_text {
        return text.clone();
    }
    if c.is_fully_opaque() {
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    } else {
        format!("rgba({}, {}, {}, {})", c.red, c.green, c.blue, crate::number::format_decimal(c.alpha, 10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::SourceFile;

    fn span() -> Span {
        let f = SourceFile::new(None, "");
        Span::point(f, 0)
    }

    #[test]
    fn plus_unifies_units() {
        let a = Value::Number(Number::with_unit(1.0, "px"));
        let b = Value::Number(Number::with_unit(2.0, "px"));
        let result = plus(&a, &b, &span()).unwrap();
        match result {
            Value::Number(n) => assert_eq!(n.value, 3.0),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn plus_then_minus_same_value_is_identity() {
        let x = Value::Number(Number::with_unit(5.0, "px"));
        let y = Value::Number(Number::with_unit(2.0, "px"));
        let sum = plus(&x, &y, &span()).unwrap();
        let back = minus(&sum, &y, &span()).unwrap();
        assert!(x.equals(&back));
    }

    #[test]
    fn times_by_unitless_one_is_identity() {
        let x = Value::Number(Number::with_unit(5.0, "px"));
        let one = Value::Number(Number::new(1.0));
        let result = times(&x, &one, &span()).unwrap();
        assert!(x.equals(&result));
    }

    #[test]
    fn string_plus_number_concatenates_with_left_quoting() {
        let s = Value::string("width: ", true);
        let n = Value::Number(Number::with_unit(3.0, "px"));
        let result = plus(&s, &n, &span()).unwrap();
        match result {
            Value::String(text, quoted) => {
                assert_eq!(&*text, "width: 3px");
                assert!(quoted);
            }
            _ => panic!("expected string"),
        }
    }

    #[test]
    fn times_of_non_numbers_is_a_type_error() {
        let a = Value::string("a", true);
        let b = Value::Number(Number::new(1.0));
        assert!(times(&a, &b, &span()).is_err());
    }

    #[test]
    fn and_short_circuits_on_falsey_lhs() {
        let mut called = false;
        let result = and(Value::Boolean(false), || {
            called = true;
            Ok(Value::Boolean(true))
        })
        .unwrap();
        assert!(!called);
        assert!(!result.is_truthy());
    }
}
