use sass_ast::{BinaryOp, CallArguments, Expression, UnaryOp};
use sass_diagnostics::{ReferenceKind, SassError, SassResult, Span};
use sass_env::Environment;
use sass_value::ops::{self, Comparison};
use sass_value::{to_css_string, CalculationName, SassMap, Value};

use crate::calc;
use crate::callable;
use crate::context::Evaluator;
use crate::interpolation::eval_interpolation;

/// Evaluates a SassScript expression against the value algebra (C4),
/// implementing the total function `Expression -> Value` from §4.4.
pub fn eval(evaluator: &mut Evaluator, env: &mut Environment, expr: &Expression) -> SassResult<Value> {
    match expr {
        Expression::Literal(value, _) => Ok(value.clone()),

        Expression::StringExpr { text, quoted, .. } => {
            let evaluated = eval_interpolation(evaluator, env, text)?;
            Ok(Value::string(evaluated.text, *quoted))
        }

        Expression::ListLiteral {
            items,
            separator,
            brackets,
            ..
        } => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval(evaluator, env, item)?);
            }
            Ok(Value::list(values, *separator, *brackets))
        }

        Expression::MapLiteral { pairs, span } => {
            let mut map = SassMap::new();
            for (key_expr, value_expr) in pairs {
                let key = eval(evaluator, env, key_expr)?;
                if map.get(&key).is_some() {
                    return Err(SassError::BadArguments {
                        message: format!("Duplicate key \"{}\" in map.", to_css_string(&key, true, span)?),
                        span: span.clone(),
                    });
                }
                let value = eval(evaluator, env, value_expr)?;
                map.insert(key, value);
            }
            Ok(Value::Map(std::rc::Rc::new(map)))
        }

        Expression::Variable { name, namespace, span } => {
            env.get_variable(name, namespace.as_deref(), span)?
                .ok_or_else(|| SassError::UndefinedReference {
                    kind: ReferenceKind::Variable,
                    name: name.clone(),
                    span: span.clone(),
                })
        }

        Expression::Binary { op, left, right, span } => eval_binary(evaluator, env, *op, left, right, span),

        Expression::Unary { op, operand, span } => {
            let value = eval(evaluator, env, operand)?;
            Ok(match op {
                UnaryOp::Plus => ops::unary_plus(&value, span)?,
                UnaryOp::Minus => ops::unary_minus(&value, span)?,
                UnaryOp::Divide => ops::unary_divide(&value, span)?,
                UnaryOp::Not => ops::not(&value),
            })
        }

        Expression::FunctionCall {
            name,
            namespace,
            arguments,
            span,
        } => eval_function_call(evaluator, env, name, namespace.as_deref(), arguments, span),

        Expression::Interpolated(interp) => {
            let evaluated = eval_interpolation(evaluator, env, interp)?;
            Ok(Value::string(evaluated.text, false))
        }

        Expression::Parenthesized(inner, _) => eval(evaluator, env, inner),
    }
}

fn eval_binary(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    span: &Span,
) -> SassResult<Value> {
    // `and`/`or` short-circuit (§4.4): the right operand is only evaluated
    // when the left one doesn't already decide the result.
    match op {
        BinaryOp::And => {
            let lhs = eval(evaluator, env, left)?;
            return ops::and(lhs, || eval(evaluator, env, right));
        }
        BinaryOp::Or => {
            let lhs = eval(evaluator, env, left)?;
            return ops::or(lhs, || eval(evaluator, env, right));
        }
        _ => {}
    }

    let lhs = eval(evaluator, env, left)?;
    let rhs = eval(evaluator, env, right)?;
    match op {
        BinaryOp::Plus => ops::plus(&lhs, &rhs, span),
        BinaryOp::Minus => ops::minus(&lhs, &rhs, span),
        BinaryOp::Times => ops::times(&lhs, &rhs, span),
        BinaryOp::Div => ops::div(&lhs, &rhs, span),
        BinaryOp::Modulo => ops::modulo(&lhs, &rhs, span),
        BinaryOp::Equals => Ok(ops::equals(&lhs, &rhs)),
        BinaryOp::NotEquals => Ok(ops::not_equals(&lhs, &rhs)),
        BinaryOp::GreaterThan => ops::compare(&lhs, &rhs, Comparison::Greater, span),
        BinaryOp::GreaterOrEqual => ops::compare(&lhs, &rhs, Comparison::GreaterOrEqual, span),
        BinaryOp::LessThan => ops::compare(&lhs, &rhs, Comparison::Less, span),
        BinaryOp::LessOrEqual => ops::compare(&lhs, &rhs, Comparison::LessOrEqual, span),
        BinaryOp::SingleEquals => ops::single_equals(&lhs, &rhs, span),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn eval_function_call(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    name: &str,
    namespace: Option<&str>,
    arguments: &CallArguments,
    span: &Span,
) -> SassResult<Value> {
    // Calculation-shaped calls (`calc`, `clamp`, the trig/math set) are
    // diverted into the Calculation constructor path rather than ordinary
    // callable dispatch (§4.4), and never take a namespace.
    if namespace.is_none() {
        if let Some(calc_name) = CalculationName::from_str(name) {
            return eval_calculation_call(evaluator, env, calc_name, arguments, span);
        }
    }

    let callable = env.get_function(name, namespace, span)?.or_else(|| {
        if namespace.is_none() {
            evaluator.builtins().global_function(name)
        } else {
            None
        }
    });

    match callable {
        Some(callable) => callable::call_function(evaluator, env, &callable, arguments, span),
        None => {
            if namespace.is_some() {
                return Err(SassError::UndefinedReference {
                    kind: ReferenceKind::Function,
                    name: name.to_string(),
                    span: span.clone(),
                });
            }
            plain_css_call(evaluator, env, name, arguments, span)
        }
    }
}

/// Renders an unresolved call as a plain-CSS function string with literal
/// argument CSS (§4.4), the fallback for e.g. `rgb()`/`var()`-shaped calls
/// that aren't backed by any user or built-in callable.
pub(crate) fn plain_css_call(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    name: &str,
    arguments: &CallArguments,
    span: &Span,
) -> SassResult<Value> {
    if arguments.rest.is_some() || arguments.keyword_rest.is_some() {
        return Err(SassError::BadArguments {
            message: format!("Plain CSS function \"{name}\" doesn't support `...` arguments."),
            span: span.clone(),
        });
    }
    let mut parts = Vec::with_capacity(arguments.positional.len() + arguments.named.len());
    for arg in &arguments.positional {
        let value = eval(evaluator, env, arg)?;
        parts.push(to_css_string(&value, false, span)?);
    }
    for (arg_name, arg) in &arguments.named {
        let value = eval(evaluator, env, arg)?;
        parts.push(format!("{arg_name}: {}", to_css_string(&value, false, span)?));
    }
    Ok(Value::string(format!("{name}({})", parts.join(", ")), false))
}

fn eval_calculation_call(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    calc_name: CalculationName,
    arguments: &CallArguments,
    span: &Span,
) -> SassResult<Value> {
    if !arguments.named.is_empty() || arguments.rest.is_some() || arguments.keyword_rest.is_some() {
        return Err(SassError::BadArguments {
            message: format!("{}() doesn't take keyword or rest arguments.", calc_name.as_str()),
            span: span.clone(),
        });
    }
    let mut args = Vec::with_capacity(arguments.positional.len());
    for arg in &arguments.positional {
        args.push(calc::eval_calc_arg(evaluator, env, arg)?);
    }
    let calculation = sass_value::Calculation::new(calc_name, args);

    // Simplification is suppressed while building a calculation inside a
    // `@supports (...)` declaration clause (§4.1).
    if evaluator.in_supports_declaration() {
        Ok(Value::Calculation(std::rc::Rc::new(calculation)))
    } else {
        Ok(calc::calc_arg_to_value(calculation.simplify()))
    }
}
