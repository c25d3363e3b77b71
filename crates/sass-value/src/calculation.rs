use crate::number::Number;

/// The closed set of calculation constructors recognised by the value
/// algebra (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationName {
    Calc,
    Min,
    Max,
    Clamp,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Abs,
    Exp,
    Sign,
    Hypot,
    Pow,
    Atan2,
    Log,
    Mod,
    Rem,
    Round,
}

impl CalculationName {
    pub fn from_str(name: &str) -> Option<Self> {
        use CalculationName::*;
        Some(match name {
            "calc" => Calc,
            "min" => Min,
            "max" => Max,
            "clamp" => Clamp,
            "sqrt" => Sqrt,
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "abs" => Abs,
            "exp" => Exp,
            "sign" => Sign,
            "hypot" => Hypot,
            "pow" => Pow,
            "atan2" => Atan2,
            "log" => Log,
            "mod" => Mod,
            "rem" => Rem,
            "round" => Round,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        use CalculationName::*;
        match self {
            Calc => "calc",
            Min => "min",
            Max => "max",
            Clamp => "clamp",
            Sqrt => "sqrt",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Abs => "abs",
            Exp => "exp",
            Sign => "sign",
            Hypot => "hypot",
            Pow => "pow",
            Atan2 => "atan2",
            Log => "log",
            Mod => "mod",
            Rem => "rem",
            Round => "round",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Plus,
    Minus,
    Times,
    Div,
}

/// One operand of a calculation: per §4.1 inputs must be a nested
/// `Calculation`, a `Number`, an unquoted `String` (for `var(--x)` and
/// similar opaque tokens), or an arithmetic `Operation` of two operands.
#[derive(Debug, Clone)]
pub enum CalcArg {
    Number(Number),
    String(String),
    Calculation(Box<Calculation>),
    Operation(Box<CalcArg>, CalcOp, Box<CalcArg>),
}

#[derive(Debug, Clone)]
pub struct Calculation {
    pub name: CalculationName,
    pub args: Vec<CalcArg>,
}

impl Calculation {
    pub fn new(name: CalculationName, args: Vec<CalcArg>) -> Self {
        Self { name, args }
    }

    /// Eagerly simplifies the calculation, folding fully-numeric
    /// sub-expressions into plain numbers. Per §4.1, simplification is
    /// suppressed while building a calculation inside a `@supports (...)`
    /// declaration clause; callers pass `in_supports_declaration`
    /// accordingly and skip calling this when it's set.
    pub fn simplify(self) -> CalcArg {
        let args: Vec<CalcArg> = self
            .args
            .into_iter()
            .map(Self::simplify_arg)
            .collect();

        if let Some(folded) = Self::try_fold(self.name, &args) {
            return CalcArg::Number(folded);
        }

        CalcArg::Calculation(Box::new(Calculation { name: self.name, args }))
    }

    fn simplify_arg(arg: CalcArg) -> CalcArg {
        match arg {
            CalcArg::Calculation(c) => c.simplify(),
            CalcArg::Operation(lhs, op, rhs) => {
                let lhs = Self::simplify_arg(*lhs);
                let rhs = Self::simplify_arg(*rhs);
                if let (CalcArg::Number(l), CalcArg::Number(r)) = (&lhs, &rhs) {
                    if let Some(n) = Self::fold_operation(l, op, r) {
                        return CalcArg::Number(n);
                    }
                }
                CalcArg::Operation(Box::new(lhs), op, Box::new(rhs))
            }
            other => other,
        }
    }

    fn fold_operation(lhs: &Number, op: CalcOp, rhs: &Number) -> Option<Number> {
        let rhs_value = lhs_denominated(lhs, rhs)?;
        let value = match op {
            CalcOp::Plus => lhs.value + rhs_value,
            CalcOp::Minus => lhs.value - rhs_value,
            CalcOp::Times => return Some(Number::with_units(
                lhs.value * rhs.value,
                [lhs.numer.clone(), rhs.numer.clone()].concat(),
                [lhs.denom.clone(), rhs.denom.clone()].concat(),
            )),
            CalcOp::Div => return Some(Number::with_units(
                lhs.value / rhs.value,
                [lhs.numer.clone(), rhs.denom.clone()].concat(),
                [lhs.denom.clone(), rhs.numer.clone()].concat(),
            )),
        };
        Some(Number::with_units(value, lhs.numer.clone(), lhs.denom.clone()))
    }

    fn try_fold(name: CalculationName, args: &[CalcArg]) -> Option<Number> {
        let numbers: Vec<&Number> = args
            .iter()
            .map(|a| match a {
                CalcArg::Number(n) => Some(n),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        use CalculationName::*;
        Some(match (name, numbers.as_slice()) {
            (Calc, [n]) => (*n).clone(),
            (Min, ns) if !ns.is_empty() => fold_extremum(ns, false)?,
            (Max, ns) if !ns.is_empty() => fold_extremum(ns, true)?,
            (Clamp, [min, val, max]) => {
                let v = lhs_denominated(val, min)?;
                let mx = lhs_denominated(val, max)?;
                Number::with_units(v.max(min.value).min(mx), val.numer.clone(), val.denom.clone())
            }
            (Sqrt, [n]) if n.is_unitless() => Number::new(n.value.sqrt()),
            (Sin, [n]) if n.is_unitless() => Number::new(n.value.sin()),
            (Cos, [n]) if n.is_unitless() => Number::new(n.value.cos()),
            (Tan, [n]) if n.is_unitless() => Number::new(n.value.tan()),
            (Asin, [n]) if n.is_unitless() => {
                Number::with_unit(n.value.asin().to_degrees(), "deg")
            }
            (Acos, [n]) if n.is_unitless() => {
                Number::with_unit(n.value.acos().to_degrees(), "deg")
            }
            (Atan, [n]) if n.is_unitless() => {
                Number::with_unit(n.value.atan().to_degrees(), "deg")
            }
            (Abs, [n]) => Number::with_units(n.value.abs(), n.numer.clone(), n.denom.clone()),
            (Exp, [n]) if n.is_unitless() => Number::new(n.value.exp()),
            (Sign, [n]) => Number::new(n.value.signum()),
            (Hypot, ns) if !ns.is_empty() => {
                let sum: f64 = ns.iter().map(|n| n.value * n.value).sum();
                Number::with_units(sum.sqrt(), ns[0].numer.clone(), ns[0].denom.clone())
            }
            (Pow, [base, exp]) if base.is_unitless() && exp.is_unitless() => {
                Number::new(base.value.powf(exp.value))
            }
            (Atan2, [y, x]) => {
                let x_val = lhs_denominated(y, x)?;
                Number::with_unit(y.value.atan2(x_val).to_degrees(), "deg")
            }
            (Log, [n]) if n.is_unitless() => Number::new(n.value.ln()),
            (Log, [n, base]) if n.is_unitless() && base.is_unitless() => {
                Number::new(n.value.log(base.value))
            }
            (Mod, [a, b]) => {
                let b_val = lhs_denominated(a, b)?;
                Number::with_units(a.value.rem_euclid(b_val), a.numer.clone(), a.denom.clone())
            }
            (Rem, [a, b]) => {
                let b_val = lhs_denominated(a, b)?;
                Number::with_units(a.value % b_val, a.numer.clone(), a.denom.clone())
            }
            (Round, [n]) => Number::with_units(n.value.round(), n.numer.clone(), n.denom.clone()),
            _ => return None,
        })
    }
}

/// Converts `rhs` into `lhs`'s units, for operations whose operands must
/// share a unit family (§4.1: "operand compatibility is checked by unit
/// category, not exact unit equality").
fn lhs_denominated(lhs: &Number, rhs: &Number) -> Option<f64> {
    if rhs.is_unitless() {
        Some(rhs.value)
    } else {
        rhs.value_in_units(&lhs.numer, &lhs.denom)
    }
}

fn fold_extremum(ns: &[&Number], want_max: bool) -> Option<Number> {
    let first = ns[0];
    let mut best = first.value;
    for n in &ns[1..] {
        let v = lhs_denominated(first, n)?;
        best = if want_max { best.max(v) } else { best.min(v) };
    }
    Some(Number::with_units(best, first.numer.clone(), first.denom.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_of_a_single_number_simplifies_to_that_number() {
        let c = Calculation::new(CalculationName::Calc, vec![CalcArg::Number(Number::new(3.0))]);
        match c.simplify() {
            CalcArg::Number(n) => assert_eq!(n.value, 3.0),
            other => panic!("expected a folded number, got {other:?}"),
        }
    }

    #[test]
    fn min_picks_the_smallest_operand() {
        let c = Calculation::new(
            CalculationName::Min,
            vec![
                CalcArg::Number(Number::new(3.0)),
                CalcArg::Number(Number::new(1.0)),
                CalcArg::Number(Number::new(2.0)),
            ],
        );
        match c.simplify() {
            CalcArg::Number(n) => assert_eq!(n.value, 1.0),
            other => panic!("expected a folded number, got {other:?}"),
        }
    }

    #[test]
    fn calc_with_a_var_reference_does_not_fold() {
        let c = Calculation::new(
            CalculationName::Calc,
            vec![CalcArg::Operation(
                Box::new(CalcArg::Number(Number::with_unit(1.0, "px"))),
                CalcOp::Plus,
                Box::new(CalcArg::String("var(--x)".into())),
            )],
        );
        match c.simplify() {
            CalcArg::Calculation(_) => {}
            other => panic!("expected an unsimplified calculation, got {other:?}"),
        }
    }
}
