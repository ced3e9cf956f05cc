use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raw channels produced by [`decode`], each in `0..=255`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorComponents {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub opacity: u8,
}

impl ColorComponents {
    /// Channels divided by 255, in `red, green, blue, opacity` order
    pub fn normalized(&self) -> [f64; 4] {
        [self.red, self.green, self.blue, self.opacity].map(|c| f64::from(c) / 255.0)
    }

    /// Channels packed as `0xRRGGBBAA`
    pub fn as_u32(&self) -> u32 {
        (u32::from(self.red) << 24)
            | (u32::from(self.green) << 16)
            | (u32::from(self.blue) << 8)
            | u32::from(self.opacity)
    }
}

/// Why a hex string could not be turned into [`ColorComponents`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("The hex \"{hex}\" contains invalid characters: {}", join_chars(.characters))]
    InvalidCharacters { hex: String, characters: Vec<char> },

    #[error("The hex \"{hex}\" must be exactly 6 or 8 characters long")]
    InvalidLength { hex: String },

    #[error("The hex \"{hex}\" could not be decoded")]
    DecodingFailed { hex: String },
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decode `RRGGBB` or `RRGGBBAA`, with an optional single leading `#`.
///
/// Six-digit input is padded with `ff` so the result is fully opaque.
/// Characters are validated before length, so `"#zz"` reports the `z`s
/// rather than the length.
pub fn decode(hex: &str) -> Result<ColorComponents, DecodeError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    let invalid: Vec<char> = digits.chars().filter(|c| !c.is_ascii_hexdigit()).collect();
    if !invalid.is_empty() {
        return Err(DecodeError::InvalidCharacters {
            hex: hex.to_string(),
            characters: invalid,
        });
    }

    let padded = match digits.len() {
        6 => format!("{digits}ff"),
        8 => digits.to_string(),
        _ => {
            return Err(DecodeError::InvalidLength {
                hex: hex.to_string(),
            })
        }
    };

    let value = u32::from_str_radix(&padded, 16).map_err(|_| DecodeError::DecodingFailed {
        hex: hex.to_string(),
    })?;

    Ok(ColorComponents {
        red: ((value >> 24) & 0xFF) as u8,
        green: ((value >> 16) & 0xFF) as u8,
        blue: ((value >> 8) & 0xFF) as u8,
        opacity: (value & 0xFF) as u8,
    })
}

/// A color with normalized `0.0..=1.0` channels
///
/// Serialized as a `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub opacity: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64, opacity: f64) -> Self {
        Color {
            red,
            green,
            blue,
            opacity,
        }
    }

    pub fn from_components(components: ColorComponents) -> Self {
        let [red, green, blue, opacity] = components.normalized();
        Color::new(red, green, blue, opacity)
    }

    /// Runtime counterpart of `color!`
    pub fn from_hex(hex: &str) -> Result<Self, DecodeError> {
        decode(hex).map(Color::from_components)
    }

    /// Channels scaled back to `0..=255`, rounding to the nearest step
    pub fn components(&self) -> ColorComponents {
        let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        ColorComponents {
            red: channel(self.red),
            green: channel(self.green),
            blue: channel(self.blue),
            opacity: channel(self.opacity),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:08x}", self.components().as_u32())
    }

    // Common color constants
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ColorComponents> for Color {
    fn from(components: ColorComponents) -> Self {
        Color::from_components(components)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl std::str::FromStr for Color {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_hash_prefix_is_optional() {
        let with = decode("#ffffff").unwrap();
        let without = decode("ffffff").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.opacity, 255);
    }

    #[test]
    fn test_six_digits_pad_to_opaque() {
        let c = decode("676C60").unwrap();
        assert_eq!((c.red, c.green, c.blue, c.opacity), (103, 108, 96, 255));
    }

    #[test]
    fn test_eight_digits_keep_opacity() {
        let c = decode("676C6080").unwrap();
        assert_eq!((c.red, c.green, c.blue, c.opacity), (103, 108, 96, 128));
    }

    #[test]
    fn test_invalid_characters_listed_in_order() {
        let err = decode("#g0z0gg").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidCharacters {
                hex: "#g0z0gg".to_string(),
                characters: vec!['g', 'z', 'g', 'g'],
            }
        );
        assert_eq!(
            err.to_string(),
            "The hex \"#g0z0gg\" contains invalid characters: g, z, g, g"
        );
    }

    #[test]
    fn test_second_hash_is_an_invalid_character() {
        assert_matches!(
            decode("##ffffff"),
            Err(DecodeError::InvalidCharacters { characters, .. }) if characters == vec!['#']
        );
    }

    #[test]
    fn test_characters_checked_before_length() {
        assert_matches!(decode("xy"), Err(DecodeError::InvalidCharacters { .. }));
    }

    #[test]
    fn test_empty_and_bare_hash_are_invalid_length() {
        assert_matches!(decode(""), Err(DecodeError::InvalidLength { .. }));
        assert_matches!(decode("#"), Err(DecodeError::InvalidLength { hex }) if hex == "#");
    }

    #[test]
    fn test_color_round_trips_through_hex() {
        let color = Color::from_hex("#1a1a2e80").unwrap();
        assert_eq!(color.to_string(), "#1a1a2e80");
        assert_eq!(Color::WHITE.to_hex(), "#ffffffff");
    }

    #[test]
    fn test_color_serde_as_hex_string() {
        let color = Color::from_hex("336699").unwrap();
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#336699ff\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<Color>("\"#33669\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_hex_of_wrong_length_is_rejected(
            digits in prop::sample::select(vec![0usize, 1, 2, 3, 4, 5, 7, 9, 10])
                .prop_flat_map(|len| proptest::string::string_regex(&format!("[0-9a-fA-F]{{{len}}}")).unwrap())
        ) {
            let is_invalid_length = matches!(decode(&digits), Err(DecodeError::InvalidLength { .. }));
            prop_assert!(is_invalid_length);
        }

        #[test]
        fn prop_reports_exactly_the_non_hex_characters(input in "[0-9a-zA-Z#!? ]{0,12}") {
            let stripped = input.strip_prefix('#').unwrap_or(&input);
            let expected: Vec<char> = stripped.chars().filter(|c| !c.is_ascii_hexdigit()).collect();
            match decode(&input) {
                Err(DecodeError::InvalidCharacters { characters, hex }) => {
                    prop_assert_eq!(characters, expected);
                    prop_assert_eq!(hex, input.clone());
                }
                _ => prop_assert!(expected.is_empty()),
            }
        }

        #[test]
        fn prop_decode_is_deterministic(input in ".{0,10}") {
            prop_assert_eq!(decode(&input), decode(&input));
        }

        #[test]
        fn prop_eight_digits_round_trip(value in any::<u32>()) {
            let hex = format!("{value:08x}");
            prop_assert_eq!(decode(&hex).unwrap().as_u32(), value);
        }
    }
}
