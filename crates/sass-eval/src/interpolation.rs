use sass_ast::{EvaluatedInterpolation, Interpolation, InterpolationChunk};
use sass_diagnostics::SassResult;
use sass_env::Environment;
use sass_value::to_css_string;

use crate::context::Evaluator;
use crate::expr;

/// Evaluates `#{...}` interpolation (§4.4), concatenating each text chunk
/// verbatim and each embedded expression's CSS text, and recording where
/// each expression's output began so a later re-parse (of a selector or
/// media query built from this text) can still report spans against the
/// original Sass source (§9 "Interpolation source-map").
pub fn eval_interpolation(
    evaluator: &mut Evaluator,
    env: &mut Environment,
    interp: &Interpolation,
) -> SassResult<EvaluatedInterpolation> {
    let mut text = String::new();
    let mut offsets = Vec::new();

    for chunk in &interp.chunks {
        match chunk {
            InterpolationChunk::Text(t) => text.push_str(t),
            InterpolationChunk::Expr(expression) => {
                offsets.push((text.len(), expression.span().clone()));
                let value = expr::eval(evaluator, env, expression)?;
                text.push_str(&to_css_string(&value, false, expression.span())?);
            }
        }
    }

    Ok(EvaluatedInterpolation { text, offsets })
}
