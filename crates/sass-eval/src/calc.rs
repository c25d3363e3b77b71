use sass_ast::{BinaryOp, Expression};
use sass_diagnostics::{SassError, SassResult, Span};
use sass_env::Environment;
use sass_value::{CalcArg, CalcOp, Value};

use crate::context::Evaluator;
use crate::expr;

fn type_error(message: impl Into<String>, span: &Span) -> SassError {
    SassError::TypeError {
        message: message.into(),
        span: span.clone(),
    }
}

/// Evaluates an argument of a calculation-shaped function call (`calc`,
/// `clamp`, the trig/math set) directly from its unevaluated [`Expression`]
/// rather than through [`expr::eval`], so an arithmetic expression that
/// mixes a number with an opaque token (e.g. `1px + var(--x)`) stays
/// symbolic instead of erroring the way plain numeric `+` would (§4.4
/// "Calculation-shaped function calls ... diverted into the Calculation
/// constructor path").
pub fn eval_calc_arg(evaluator: &mut Evaluator, env: &mut Environment, expression: &Expression) -> SassResult<CalcArg> {
    match expression {
        Expression::Binary {
            op: op @ (BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Div),
            left,
            right,
            ..
        } => {
            let lhs = eval_calc_arg(evaluator, env, left)?;
            let rhs = eval_calc_arg(evaluator, env, right)?;
            let calc_op = match op {
                BinaryOp::Plus => CalcOp::Plus,
                BinaryOp::Minus => CalcOp::Minus,
                BinaryOp::Times => CalcOp::Times,
                BinaryOp::Div => CalcOp::Div,
                _ => unreachable!(),
            };
            Ok(CalcArg::Operation(Box::new(lhs), calc_op, Box::new(rhs)))
        }
        Expression::FunctionCall {
            name,
            namespace: None,
            arguments,
            span,
        } => {
            if let Some(calc_name) = sass_value::CalculationName::from_str(name) {
                let mut args = Vec::with_capacity(arguments.positional.len());
                for a in &arguments.positional {
                    args.push(eval_calc_arg(evaluator, env, a)?);
                }
                return Ok(CalcArg::Calculation(Box::new(sass_value::Calculation::new(calc_name, args))));
            }
            value_to_calc_arg(expr::eval(evaluator, env, expression)?, span)
        }
        other => value_to_calc_arg(expr::eval(evaluator, env, other)?, other.span()),
    }
}

fn value_to_calc_arg(value: Value, span: &Span) -> SassResult<CalcArg> {
    match value {
        Value::Number(n) => Ok(CalcArg::Number(n)),
        Value::String(s, false) => Ok(CalcArg::String(s.to_string())),
        Value::Calculation(c) => Ok(CalcArg::Calculation(Box::new((*c).clone()))),
        other => Err(type_error(format!("{} isn't a valid calculation argument", other.type_name()), span)),
    }
}

/// Converts a fully-simplified [`CalcArg`] back into a [`Value`] once
/// [`sass_value::Calculation::simplify`] has run.
pub fn calc_arg_to_value(arg: CalcArg) -> Value {
    match arg {
        CalcArg::Number(n) => Value::Number(n),
        CalcArg::String(s) => Value::string(s, false),
        CalcArg::Calculation(c) => Value::Calculation(std::rc::Rc::new(*c)),
        CalcArg::Operation(..) => unreachable!("simplify() never leaves a bare Operation at the top level"),
    }
}
