use std::fmt;

use crate::unit::{fuzzy_equals, Unit, EPSILON};

/// A SassScript number: a magnitude plus a multiset of numerator and
/// denominator units (§3). `slash_parents` records the two operands of a
/// `/` operation so the number can still be serialized in its legacy
/// slash-separated form; any further arithmetic clears it (§9).
#[derive(Debug, Clone)]
pub struct Number {
    pub value: f64,
    pub numer: Vec<Unit>,
    pub denom: Vec<Unit>,
    pub slash_parents: Option<(Box<Number>, Box<Number>)>,
}

impl Number {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            numer: Vec::new(),
            denom: Vec::new(),
            slash_parents: None,
        }
    }

    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            numer: vec![Unit::new(unit)],
            denom: Vec::new(),
            slash_parents: None,
        }
    }

    pub fn with_units(value: f64, numer: Vec<Unit>, denom: Vec<Unit>) -> Self {
        let mut n = Self {
            value,
            numer,
            denom,
            slash_parents: None,
        };
        n.simplify_units();
        n
    }

    pub fn is_unitless(&self) -> bool {
        self.numer.is_empty() && self.denom.is_empty()
    }

    /// The single numerator unit, if this number has exactly one unit in
    /// the numerator and none in the denominator.
    pub fn single_unit(&self) -> Option<&Unit> {
        if self.numer.len() == 1 && self.denom.is_empty() {
            Some(&self.numer[0])
        } else {
            None
        }
    }

    pub fn has_unit(&self, name: &str) -> bool {
        self.single_unit()
            .is_some_and(|u| u.0.eq_ignore_ascii_case(name))
    }

    /// Cancels identical units that appear in both numerator and
    /// denominator, e.g. `px/px` collapses to unitless (§3 invariant: "a
    /// unit collapses to 1 only when both numerator and denominator
    /// contain it").
    fn simplify_units(&mut self) {
        let mut numer = Vec::new();
        let mut denom = self.denom.clone();
        for unit in self.numer.drain(..) {
            if let Some(pos) = denom
                .iter()
                .position(|d| d.0.eq_ignore_ascii_case(&unit.0))
            {
                denom.remove(pos);
            } else {
                numer.push(unit);
            }
        }
        self.numer = numer;
        self.denom = denom;
    }

    /// True if `self` is within tolerance of an integer.
    pub fn is_integer(&self) -> bool {
        fuzzy_equals(self.value, self.value.round())
    }

    pub fn to_integer(&self) -> Option<i64> {
        self.is_integer().then(|| self.value.round() as i64)
    }

    /// Converts `self`'s magnitude into the given target units, returning
    /// `None` if the unit multisets aren't compatible (different lengths,
    /// or an incompatible family pairing).
    pub fn value_in_units(&self, target_numer: &[Unit], target_denom: &[Unit]) -> Option<f64> {
        let mut value = self.value;
        value = Self::convert_side(value, &self.numer, target_numer, false)?;
        value = Self::convert_side(value, &self.denom, target_denom, true)?;
        Some(value)
    }

    fn convert_side(
        mut value: f64,
        from: &[Unit],
        to: &[Unit],
        invert: bool,
    ) -> Option<f64> {
        if from.len() != to.len() {
            return None;
        }
        let mut remaining_to: Vec<&Unit> = to.iter().collect();
        for f in from {
            let idx = remaining_to
                .iter()
                .position(|t| f.is_compatible_with(t))?;
            let t = remaining_to.remove(idx);
            let factor = f.conversion_factor(t)?;
            value = if invert { value / factor } else { value * factor };
        }
        Some(value)
    }

    /// Whether `self`'s units are compatible with `other`'s for addition,
    /// subtraction and comparison.
    pub fn is_comparable_to(&self, other: &Number) -> bool {
        self.value_in_units(&other.numer, &other.denom).is_some()
    }

    pub fn unary_minus(&self) -> Number {
        Number {
            value: -self.value,
            numer: self.numer.clone(),
            denom: self.denom.clone(),
            slash_parents: None,
        }
    }

    /// Decimal text with no exponent notation, rounding half-up to at most
    /// `max_fraction_digits` digits after the point, dropping a trailing
    /// `.0` when the value is integral (§4.6).
    pub fn format_plain(&self, max_fraction_digits: usize) -> String {
        format_decimal(self.value, max_fraction_digits)
    }
}

/// Shared by [`Number::format_plain`] and the CSS serializer's color/number
/// formatting: renders `value` without scientific notation, rounding
/// half-up at `max_fraction_digits`.
pub fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    if fuzzy_equals(value, value.round()) && value.abs() < 1e15 {
        return format!("{}", value.round() as i64);
    }

    let negative = value.is_sign_negative();
    let abs = value.abs();
    let scale = 10f64.powi(max_fraction_digits as i32);
    let rounded = (abs * scale + 0.5 + EPSILON).floor() / scale;

    let mut s = format!("{:.*}", max_fraction_digits, rounded);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if negative && rounded != 0.0 {
        format!("-{s}")
    } else {
        s
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_plain(10))?;
        for u in &self.numer {
            write!(f, "{u}")?;
        }
        if !self.denom.is_empty() {
            f.write_str("/")?;
            for u in &self.denom {
                write!(f, "{u}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_over_px_is_unitless() {
        let n = Number::with_units(2.0, vec![Unit::new("px")], vec![Unit::new("px")]);
        assert!(n.is_unitless());
    }

    #[test]
    fn mixed_units_do_not_cancel() {
        let n = Number::with_units(2.0, vec![Unit::new("px")], vec![Unit::new("s")]);
        assert!(!n.is_unitless());
        assert_eq!(n.numer.len(), 1);
        assert_eq!(n.denom.len(), 1);
    }

    #[test]
    fn value_in_units_converts_compatible_units() {
        let n = Number::with_unit(1.0, "in");
        let v = n.value_in_units(&[Unit::new("px")], &[]).unwrap();
        assert!((v - 96.0).abs() < 1e-9);
    }

    #[test]
    fn format_plain_drops_trailing_zeros() {
        assert_eq!(format_decimal(3.0, 10), "3");
        assert_eq!(format_decimal(3.5, 10), "3.5");
        assert_eq!(format_decimal(-0.5, 10), "-0.5");
    }

    #[test]
    fn format_plain_rounds_half_up_at_precision() {
        assert_eq!(format_decimal(1.0 / 3.0, 5), "0.33333");
    }
}
