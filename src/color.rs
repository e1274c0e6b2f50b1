//! Colors as they appear on the surface.
//!
//! Every color is kept in the form it is emitted in (a CSS color string) and
//! can be resolved to RGB for raster export.

use std::fmt;

/// The color used whenever a value cannot be mapped.
pub const SENTINEL: Color = Color::Named("steelblue", (70, 130, 180));

pub const WHITE: Color = Color::Named("white", (255, 255, 255));
pub const BLACK: Color = Color::Named("black", (0, 0, 0));
pub const LIGHTBLUE: Color = Color::Named("lightblue", (173, 216, 230));
pub const DARKBLUE: Color = Color::Named("darkblue", (0, 0, 139));

/// CSS named colors understood by [`Color::parse`].
const NAMED: [(&str, (u8, u8, u8)); 10] = [
    ("steelblue", (70, 130, 180)),
    ("white", (255, 255, 255)),
    ("black", (0, 0, 0)),
    ("lightblue", (173, 216, 230)),
    ("darkblue", (0, 0, 139)),
    ("grey", (128, 128, 128)),
    ("gray", (128, 128, 128)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// A CSS keyword with its RGB value.
    Named(&'static str, (u8, u8, u8)),
    /// Emitted as `#rrggbb`.
    Hex(u8, u8, u8),
    /// Emitted as `rgb(r, g, b)`.
    Rgb(u8, u8, u8),
    /// Emitted as `hsl(h, s%, l%)`; hue in degrees, saturation and lightness in percent.
    Hsl(f64, u8, u8),
}

impl Color {
    /// Parse `#rrggbb`, `r,g,b` or a known CSS keyword.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Hex(r, g, b));
        }

        let rgb_parts: Vec<u8> = s
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        if rgb_parts.len() == 3 && s.split(',').count() == 3 {
            return Some(Color::Rgb(rgb_parts[0], rgb_parts[1], rgb_parts[2]));
        }

        let lower = s.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(name, rgb)| Color::Named(name, rgb))
    }

    /// Resolve to an RGB triple.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match *self {
            Color::Named(_, rgb) => rgb,
            Color::Hex(r, g, b) | Color::Rgb(r, g, b) => (r, g, b),
            Color::Hsl(h, s, l) => hsl_to_rgb(h, s as f64 / 100.0, l as f64 / 100.0),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name, _) => write!(f, "{}", name),
            Color::Hex(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            Color::Rgb(r, g, b) => write!(f, "rgb({}, {}, {})", r, g, b),
            Color::Hsl(h, s, l) => write!(f, "hsl({:.1}, {}%, {}%)", h, s, l),
        }
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r1), to_byte(g1), to_byte(b1))
}

/// Linear RGB interpolation between `a` and `b` at `t` (clamped to [0, 1]).
pub fn interpolate_rgb(a: Color, b: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let (ar, ag, ab) = a.to_rgb();
    let (br, bg, bb) = b.to_rgb();
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Color::Rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
}

/// FNV-1a 32-bit hash over the UTF-16 code units of `s`.
pub fn fnv1a_32(s: &str) -> u32 {
    let mut h: u32 = 2_166_136_261;
    for unit in s.encode_utf16() {
        h ^= unit as u32;
        h = h.wrapping_mul(16_777_619);
    }
    h
}

/// Deterministic color for an open-ended identifier.
///
/// The hue walks the circle in golden-angle steps of the hash; saturation and
/// lightness take small perturbations from the low and second bytes so that
/// identifiers landing on close hues remain distinguishable.
pub fn identifier_color(id: &str) -> Color {
    let h = fnv1a_32(id);
    let hue = (h as f64 * 137.508) % 360.0;
    let sat = 60 + (h % 25) as u8;
    let light = 42 + ((h >> 8) % 16) as u8;
    Color::Hsl(hue, sat, light)
}

/// True if `s` is a color string this crate emits or parses.
pub fn is_valid_color_string(s: &str) -> bool {
    if Color::parse(s).is_some() {
        return true;
    }
    let inner = |prefix: &str| {
        s.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(')'))
            .map(|body| body.split(',').map(str::trim).collect::<Vec<_>>())
    };
    if let Some(parts) = inner("rgb(") {
        return parts.len() == 3 && parts.iter().all(|p| p.parse::<u8>().is_ok());
    }
    if let Some(parts) = inner("hsl(") {
        return parts.len() == 3
            && parts[0].parse::<f64>().is_ok()
            && parts[1..]
                .iter()
                .all(|p| p.strip_suffix('%').map_or(false, |v| v.parse::<u8>().is_ok()));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_triplet() {
        assert_eq!(Color::parse("#ff8000"), Some(Color::Hex(255, 128, 0)));
        assert_eq!(Color::parse("10, 20,30"), Some(Color::Rgb(10, 20, 30)));
        assert_eq!(Color::parse("SteelBlue"), Some(SENTINEL));
        assert_eq!(Color::parse("#ff80"), None);
        assert_eq!(Color::parse("1,2,3,4"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SENTINEL.to_string(), "steelblue");
        assert_eq!(Color::Hex(1, 2, 255).to_string(), "#0102ff");
        assert_eq!(Color::Rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
        assert_eq!(Color::Hsl(123.456, 70, 50).to_string(), "hsl(123.5, 70%, 50%)");
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a_32(""), 0x811c9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9cf968);
    }

    #[test]
    fn test_identifier_color_is_stable() {
        let a = identifier_color("HGDP00535_unphased");
        let b = identifier_color("HGDP00535_unphased");
        assert_eq!(a, b);
        assert!(is_valid_color_string(&a.to_string()));

        if let Color::Hsl(h, s, l) = a {
            assert!((0.0..360.0).contains(&h));
            assert!((60..=84).contains(&s));
            assert!((42..=57).contains(&l));
        } else {
            panic!("expected hsl color");
        }
    }

    #[test]
    fn test_hsl_to_rgb() {
        assert_eq!(Color::Hsl(0.0, 100, 50).to_rgb(), (255, 0, 0));
        assert_eq!(Color::Hsl(120.0, 100, 50).to_rgb(), (0, 255, 0));
        assert_eq!(Color::Hsl(240.0, 100, 50).to_rgb(), (0, 0, 255));
        assert_eq!(Color::Hsl(42.0, 0, 100).to_rgb(), (255, 255, 255));
    }

    #[test]
    fn test_interpolate_rgb_clamps() {
        assert_eq!(interpolate_rgb(LIGHTBLUE, DARKBLUE, 0.0), Color::Rgb(173, 216, 230));
        assert_eq!(interpolate_rgb(LIGHTBLUE, DARKBLUE, 1.0), Color::Rgb(0, 0, 139));
        assert_eq!(interpolate_rgb(LIGHTBLUE, DARKBLUE, 7.0), Color::Rgb(0, 0, 139));
        assert_eq!(interpolate_rgb(LIGHTBLUE, DARKBLUE, -1.0), Color::Rgb(173, 216, 230));
    }

    #[test]
    fn test_valid_color_strings() {
        assert!(is_valid_color_string("rgb(0, 0, 139)"));
        assert!(is_valid_color_string("hsl(12.5, 60%, 42%)"));
        assert!(!is_valid_color_string("rgb(0, 0)"));
        assert!(!is_valid_color_string("hsl(12.5, 60, 42%)"));
        assert!(!is_valid_color_string(""));
    }
}
