use crate::unit::fuzzy_equals;

/// An sRGB color with an alpha channel. `original_text` preserves how the
/// color was written (e.g. `"rebeccapurple"` or `"#036"`) so the serializer
/// can choose to reproduce it verbatim when that's shorter than any
/// recomputed representation.
#[derive(Debug, Clone)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
    pub original_text: Option<String>,
}

impl Color {
    pub fn rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: alpha.clamp(0.0, 1.0),
            original_text: None,
        }
    }

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    pub fn is_fully_opaque(&self) -> bool {
        fuzzy_equals(self.alpha, 1.0)
    }

    pub fn is_fully_transparent(&self) -> bool {
        fuzzy_equals(self.alpha, 0.0)
    }

    /// Structural equality: exact channels, alpha within the shared
    /// tolerance (§4.1).
    pub fn equals(&self, other: &Color) -> bool {
        self.red == other.red
            && self.green == other.green
            && self.blue == other.blue
            && fuzzy_equals(self.alpha, other.alpha)
    }

    pub fn with_alpha(&self, alpha: f64) -> Color {
        Color {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha: alpha.clamp(0.0, 1.0),
            original_text: None,
        }
    }

    /// HSL channels, computed from RGB on demand; Sass colors are stored
    /// canonically as RGBA and convert lazily rather than keeping both
    /// representations in sync.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.red as f64 / 255.0;
        let g = self.green as f64 / 255.0;
        let b = self.blue as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let lightness = (max + min) / 2.0;

        if delta.abs() < f64::EPSILON {
            return (0.0, 0.0, lightness * 100.0);
        }

        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * (((b - r) / delta) + 2.0)
        } else {
            60.0 * (((r - g) / delta) + 4.0)
        };

        (hue, saturation * 100.0, lightness * 100.0)
    }

    pub fn from_hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self::rgba(v, v, v, alpha);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        let to_channel = |t: f64| -> u8 {
            let mut t = t;
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 1.0 / 2.0 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };

        Self::rgba(
            to_channel(h + 1.0 / 3.0),
            to_channel(h),
            to_channel(h - 1.0 / 3.0),
            alpha,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_tolerates_alpha_noise() {
        let a = Color::rgba(10, 20, 30, 0.5);
        let b = Color::rgba(10, 20, 30, 0.5 + 1e-11);
        assert!(a.equals(&b));
    }

    #[test]
    fn hsl_roundtrip_red() {
        let red = Color::rgb(255, 0, 0);
        let (h, s, l) = red.to_hsl();
        assert!((h - 0.0).abs() < 1e-6);
        assert!((s - 100.0).abs() < 1e-6);
        assert!((l - 50.0).abs() < 1e-6);
        let back = Color::from_hsla(h, s, l, 1.0);
        assert!(back.equals(&red));
    }
}
