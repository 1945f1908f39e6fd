use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const CHANNEL_MIN: i32 = 0;
pub const CHANNEL_MAX: i32 = 255;

const HEX_DIGITS: usize = 6;

/// Clips the result of channel arithmetic into `0..=255`.
pub fn clamp_channel(value: i32) -> u8 {
    value.clamp(CHANNEL_MIN, CHANNEL_MAX) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("'{input}' is not a colour: expected 6 hexadecimal digits, found {found}")]
    WrongLength { input: String, found: usize },
    #[error("'{input}' is not a colour: '{digit}' is not a hexadecimal digit")]
    InvalidDigit { input: String, digit: char },
}

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The pair of text colours shown over a cell when it is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColors {
    pub black: Color,
    pub white: Color,
}

/// Sort key grouping colours by their dominant channels, see [`Color::palette_key`].
pub type PaletteKey = (Reverse<usize>, Reverse<Vec<usize>>, Reverse<u8>, Reverse<u16>, [u8; 3]);

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from unbounded channel values, clamping each one.
    pub fn from_channels(r: i32, g: i32, b: i32) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn offset(self, dr: i32, dg: i32, db: i32) -> Self {
        Self::from_channels(
            i32::from(self.r) + dr,
            i32::from(self.g) + dg,
            i32::from(self.b) + db,
        )
    }

    /// `#RRGGBB`, uppercase.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Largest per-channel difference between two colours.
    pub fn distance(self, other: Color) -> u8 {
        self.channels()
            .into_iter()
            .zip(other.channels())
            .map(|(a, b)| a.abs_diff(b))
            .max()
            .unwrap_or(0)
    }

    pub fn contrasting_text_colors(self) -> TextColors {
        TextColors {
            black: Color::BLACK,
            white: Color::WHITE,
        }
    }

    /// Ordering used to lay out a grid.
    ///
    /// Colours with more channels tied for the maximum sort first, so greys
    /// lead, then secondaries, then primaries. Ties are broken by which
    /// channels dominate (blue before green before red), then by the dominant
    /// value and the sum of the other channels, both descending.
    pub fn palette_key(self) -> PaletteKey {
        let channels = self.channels();
        let max = channels.iter().copied().max().unwrap_or(0);
        let dominant: Vec<usize> = (0..channels.len())
            .filter(|&i| channels[i] == max)
            .collect();
        let rest: u16 = (0..channels.len())
            .filter(|i| !dominant.contains(i))
            .map(|i| u16::from(channels[i]))
            .sum();
        (
            Reverse(dominant.len()),
            Reverse(dominant),
            Reverse(max),
            Reverse(rest),
            channels,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#RRGGBB` or `RRGGBB` in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let digits = input.strip_prefix('#').unwrap_or(input);
        if let Some(digit) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit {
                input: input.to_string(),
                digit,
            });
        }
        if digits.len() != HEX_DIGITS {
            return Err(ColorParseError::WrongLength {
                input: input.to_string(),
                found: digits.len(),
            });
        }
        let channel = |at: usize| {
            u8::from_str_radix(&digits[at..at + 2], 16).map_err(|_| ColorParseError::InvalidDigit {
                input: input.to_string(),
                digit: digits.as_bytes()[at] as char,
            })
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "tests/color_tests.rs"]
mod tests;
