use std::fmt;

/// Relative tolerance used everywhere two magnitudes are compared: numbers,
/// color alpha channels, integer detection. `10^-10` of the greater
/// magnitude, per §4.1 and §8 property 2.
pub const EPSILON: f64 = 1e-10;

pub fn fuzzy_equals(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= EPSILON * scale.max(1.0)
}

/// A CSS unit attached to a [`crate::Number`]. Units are grouped into
/// conversion families (length, angle, time, frequency, resolution); units
/// in different families are never compatible, and `Other` units are only
/// ever compatible with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit(pub String);

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Unit(name.into())
    }

    fn family(&self) -> Option<UnitFamily> {
        UnitFamily::of(&self.0)
    }

    /// The multiplier to convert one unit of `self` into the family's
    /// canonical unit (e.g. `px` -> `in` is `1.0 / 96.0`).
    fn canonical_factor(&self) -> f64 {
        self.family()
            .and_then(|fam| fam.factor(&self.0))
            .unwrap_or(1.0)
    }

    /// Whether `self` and `other` belong to the same conversion family
    /// (and so can be added, subtracted or compared once converted).
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        match (self.family(), other.family()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0.eq_ignore_ascii_case(&other.0),
        }
    }

    /// Factor to multiply a magnitude in `self` units by to get the
    /// equivalent magnitude in `target` units. `None` if incompatible.
    pub fn conversion_factor(&self, target: &Unit) -> Option<f64> {
        if !self.is_compatible_with(target) {
            return None;
        }
        Some(self.canonical_factor() / target.canonical_factor())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitFamily {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
}

impl UnitFamily {
    fn of(unit: &str) -> Option<Self> {
        let lower = unit.to_ascii_lowercase();
        Some(match lower.as_str() {
            "px" | "in" | "cm" | "mm" | "q" | "pt" | "pc" => UnitFamily::Length,
            "deg" | "grad" | "rad" | "turn" => UnitFamily::Angle,
            "s" | "ms" => UnitFamily::Time,
            "hz" | "khz" => UnitFamily::Frequency,
            "dpi" | "dpcm" | "dppx" => UnitFamily::Resolution,
            _ => return None,
        })
    }

    /// Multiplier from `unit` to this family's canonical unit: `in` for
    /// length, `deg` for angle, `s` for time, `hz` for frequency, `dppx`
    /// for resolution. Matches the constants dart-sass uses.
    fn factor(self, unit: &str) -> Option<f64> {
        let lower = unit.to_ascii_lowercase();
        Some(match (self, lower.as_str()) {
            (UnitFamily::Length, "in") => 1.0,
            (UnitFamily::Length, "px") => 1.0 / 96.0,
            (UnitFamily::Length, "cm") => 1.0 / 2.54,
            (UnitFamily::Length, "mm") => 1.0 / 25.4,
            (UnitFamily::Length, "q") => 1.0 / 101.6,
            (UnitFamily::Length, "pt") => 1.0 / 72.0,
            (UnitFamily::Length, "pc") => 1.0 / 6.0,

            (UnitFamily::Angle, "deg") => 1.0,
            (UnitFamily::Angle, "grad") => 0.9,
            (UnitFamily::Angle, "rad") => 180.0 / std::f64::consts::PI,
            (UnitFamily::Angle, "turn") => 360.0,

            (UnitFamily::Time, "s") => 1.0,
            (UnitFamily::Time, "ms") => 1.0 / 1000.0,

            (UnitFamily::Frequency, "hz") => 1.0,
            (UnitFamily::Frequency, "khz") => 1000.0,

            (UnitFamily::Resolution, "dppx") => 1.0,
            (UnitFamily::Resolution, "dpi") => 1.0 / 96.0,
            (UnitFamily::Resolution, "dpcm") => 1.0 / 37.795_28,

            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_and_in_are_compatible() {
        let px = Unit::new("px");
        let inch = Unit::new("in");
        assert!(px.is_compatible_with(&inch));
        assert!((px.conversion_factor(&inch).unwrap() - 1.0 / 96.0).abs() < 1e-12);
    }

    #[test]
    fn unrelated_units_are_incompatible() {
        let px = Unit::new("px");
        let s = Unit::new("s");
        assert!(!px.is_compatible_with(&s));
        assert!(px.conversion_factor(&s).is_none());
    }

    #[test]
    fn unknown_units_are_only_compatible_with_themselves() {
        let a = Unit::new("foo");
        let b = Unit::new("foo");
        let c = Unit::new("bar");
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
    }

    #[test]
    fn fuzzy_equals_within_tolerance() {
        assert!(fuzzy_equals(1.0, 1.0 + 1e-11));
        assert!(!fuzzy_equals(1.0, 1.0 + 1e-8));
    }
}
