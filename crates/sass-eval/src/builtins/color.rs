use std::rc::Rc;

use sass_diagnostics::{SassError, SassResult, Span};
use sass_env::ModuleMembers;
use sass_value::{Color, Number, Value};

use super::register;

fn type_error(message: impl Into<String>, span: &Span) -> SassError {
    SassError::TypeError {
        message: message.into(),
        span: span.clone(),
    }
}

fn color(value: &Value, span: &Span) -> SassResult<&Color> {
    match value {
        Value::Color(c) => Ok(c),
        _ => Err(type_error(format!("{} isn't a color", value.type_name()), span)),
    }
}

fn channel(value: &Value, span: &Span) -> SassResult<f64> {
    match value {
        Value::Number(n) => Ok(n.value),
        _ => Err(type_error(format!("{} isn't a number", value.type_name()), span)),
    }
}

/// `sass:color` (§1): channel reflection plus the HSL round trip C4
/// already implements on [`Color`].
pub fn module() -> Rc<ModuleMembers> {
    let m = ModuleMembers::new();

    register(&m, "red", 1, Some(1), |args, span| {
        Ok(Value::Number(Number::new(color(&args[0], span)?.red as f64)))
    });
    register(&m, "green", 1, Some(1), |args, span| {
        Ok(Value::Number(Number::new(color(&args[0], span)?.green as f64)))
    });
    register(&m, "blue", 1, Some(1), |args, span| {
        Ok(Value::Number(Number::new(color(&args[0], span)?.blue as f64)))
    });
    register(&m, "alpha", 1, Some(1), |args, span| {
        Ok(Value::Number(Number::new(color(&args[0], span)?.alpha)))
    });

    register(&m, "opacify", 2, Some(2), |args, span| {
        let c = color(&args[0], span)?;
        let delta = channel(&args[1], span)?;
        Ok(Value::Color(c.with_alpha(c.alpha + delta)))
    });
    register(&m, "transparentize", 2, Some(2), |args, span| {
        let c = color(&args[0], span)?;
        let delta = channel(&args[1], span)?;
        Ok(Value::Color(c.with_alpha(c.alpha - delta)))
    });

    register(&m, "lightness", 1, Some(1), |args, span| {
        let (_, _, l) = color(&args[0], span)?.to_hsl();
        Ok(Value::Number(Number::with_unit(l, "%")))
    });
    register(&m, "saturation", 1, Some(1), |args, span| {
        let (_, s, _) = color(&args[0], span)?.to_hsl();
        Ok(Value::Number(Number::with_unit(s, "%")))
    });
    register(&m, "hue", 1, Some(1), |args, span| {
        let (h, _, _) = color(&args[0], span)?.to_hsl();
        Ok(Value::Number(Number::with_unit(h, "deg")))
    });

    register(&m, "mix", 2, Some(3), |args, span| {
        let a = color(&args[0], span)?;
        let b = color(&args[1], span)?;
        let weight = args.get(2).map(|v| channel(v, span)).transpose()?.unwrap_or(50.0) / 100.0;
        let mix_channel = |x: u8, y: u8| -> u8 { (x as f64 * weight + y as f64 * (1.0 - weight)).round() as u8 };
        Ok(Value::Color(Color::rgba(
            mix_channel(a.red, b.red),
            mix_channel(a.green, b.green),
            mix_channel(a.blue, b.blue),
            a.alpha * weight + b.alpha * (1.0 - weight),
        )))
    });

    m
}
