//! Color values for path classes.
//!
//! Provides the `#RRGGBB` parsing used by stored class records and the
//! deterministic default-color derivation applied when a class is created
//! without an explicit color.

use crate::error::ProjectError;

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a color from explicit channel values.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ProjectError> {
        let Some(digits) = hex.strip_prefix('#') else {
            return Err(ProjectError::invalid_color(format!(
                "expected leading '#' in {hex:?}"
            )));
        };
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ProjectError::invalid_color(format!(
                "expected 6 hex digits in {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| {
                ProjectError::invalid_color(format!("non-hex digit in {hex:?}"))
            })
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Return the channels as a `(r, g, b)` tuple.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Format as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Derive the default color for a class name (derivation scheme v1).
    ///
    /// The scheme is fixed for compatibility with existing project files
    /// and must never change without a version bump:
    ///
    /// 1. Hash the name with the 32-bit polynomial hash over its UTF-16
    ///    code units, multiplier 31 (`h = 31 * h + unit`, wrapping).
    /// 2. Sign-extend the hash to 64 bits and seed a 48-bit linear
    ///    congruential generator (multiplier `0x5DEECE66D`, increment
    ///    `0xB`, seed XOR-scrambled with the multiplier).
    /// 3. Draw three bounded values in `[0, 256)`; they become R, G, B
    ///    in that order.
    ///
    /// Reference: `"MyNew"` always yields `(49, 139, 153)`.
    pub fn derived_from(name: &str) -> Self {
        let mut rng = Lcg48::new(string_hash(name) as i64);
        Self {
            r: rng.next_u8(),
            g: rng.next_u8(),
            b: rng.next_u8(),
        }
    }
}

/// Color argument for class construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Derive a stable color from the class name
    #[default]
    Auto,
    /// No color
    Unset,
    /// Explicit color value
    Rgb(Color),
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        Self::Rgb(color)
    }
}

/// 32-bit polynomial string hash over UTF-16 code units.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// 48-bit linear congruential generator.
struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    const MULTIPLIER: u64 = 0x5DEECE66D;
    const INCREMENT: u64 = 0xB;
    const MASK: u64 = (1 << 48) - 1;

    fn new(seed: i64) -> Self {
        Self {
            state: (seed as u64 ^ Self::MULTIPLIER) & Self::MASK,
        }
    }

    /// Advance the generator and return the top 31 bits of state.
    fn next31(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
            & Self::MASK;
        (self.state >> 17) as u32
    }

    /// Bounded draw in `[0, 256)`.
    fn next_u8(&mut self) -> u8 {
        // 256 is a power of two, so the draw is a plain bit extraction
        ((256u64 * u64::from(self.next31())) >> 31) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_parses_channels() {
        let color = Color::from_hex("#ff8000").unwrap();
        assert_eq!(color.to_rgb(), (255, 128, 0));
    }

    #[test]
    fn test_from_hex_case_insensitive() {
        assert_eq!(
            Color::from_hex("#AaBbCc").unwrap(),
            Color::from_hex("#aabbcc").unwrap()
        );
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(matches!(
            Color::from_hex("ff8000"),
            Err(ProjectError::InvalidColor { .. })
        ));
        assert!(matches!(
            Color::from_hex("#ff80"),
            Err(ProjectError::InvalidColor { .. })
        ));
        assert!(matches!(
            Color::from_hex("#ff80001"),
            Err(ProjectError::InvalidColor { .. })
        ));
        assert!(matches!(
            Color::from_hex("#ff80zz"),
            Err(ProjectError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::new(49, 139, 153);
        assert_eq!(Color::from_hex(&color.to_hex()).unwrap(), color);
    }

    #[test]
    fn test_derived_reference_values() {
        // Pinned values from existing deployed projects; these must never
        // change across releases.
        assert_eq!(Color::derived_from("MyNew").to_rgb(), (49, 139, 153));
        assert_eq!(Color::derived_from("MyClass").to_rgb(), (207, 157, 79));
        assert_eq!(Color::derived_from("Tumor").to_rgb(), (48, 208, 169));
        assert_eq!(Color::derived_from("Stroma").to_rgb(), (122, 143, 23));
    }

    #[test]
    fn test_derived_is_deterministic() {
        for name in ["a", "Immune cells", "MyNew"] {
            assert_eq!(Color::derived_from(name), Color::derived_from(name));
        }
    }

    #[test]
    fn test_string_hash_sign_extension() {
        // "MyClass" hashes negative; the seed must sign-extend
        assert!(string_hash("MyClass") < 0);
        assert_eq!(string_hash("MyNew"), 74_794_036);
    }
}
