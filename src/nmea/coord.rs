use crate::config::{SignRule, LAT_DIGITS, LON_DIGITS};
use crate::Position;

// "MM.mmmm" following the degree digits
const MINUTES_WIDTH: usize = 7;
// Four fractional minute digits
const FRAC_SCALE: f32 = 10_000.0;

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordError {
    #[error("coordinate has {got} characters, need {need}")]
    TooShort { need: usize, got: usize },
    #[error("expected a digit at offset {index}, found {byte:#04x}")]
    NonDigit { index: usize, byte: u8 },
}

/// Converts fixed-width degrees-minutes text (`DDMM.mmmm` with
/// `degree_digits` leading degree digits) to decimal degrees.
///
/// Exactly `degree_digits + 7` characters are consumed. The character
/// between the whole and fractional minutes is skipped without being
/// looked at; every other consumed character must be an ASCII digit.
pub fn dmm_to_degrees(field: &[u8], degree_digits: usize) -> Result<f32, CoordError> {
    let need = degree_digits + MINUTES_WIDTH;
    let text = field.get(..need).ok_or(CoordError::TooShort {
        need,
        got: field.len(),
    })?;

    let point = degree_digits + 2;
    let mut degrees = 0u32;
    let mut minutes = 0u32;
    let mut frac = 0u32;

    for (index, &byte) in text.iter().enumerate() {
        if index == point {
            continue;
        }
        if !byte.is_ascii_digit() {
            return Err(CoordError::NonDigit { index, byte });
        }
        let acc = if index < degree_digits {
            &mut degrees
        } else if index < point {
            &mut minutes
        } else {
            &mut frac
        };
        *acc = *acc * 10 + u32::from(byte - b'0');
    }

    Ok(degrees as f32 + (minutes as f32 + frac as f32 / FRAC_SCALE) / 60.0)
}

/// `DDMM.mmmm` latitude magnitude.
pub fn latitude_degrees(field: &[u8]) -> Result<f32, CoordError> {
    dmm_to_degrees(field, LAT_DIGITS - MINUTES_WIDTH)
}

/// `DDDMM.mmmm` longitude magnitude.
pub fn longitude_degrees(field: &[u8]) -> Result<f32, CoordError> {
    dmm_to_degrees(field, LON_DIGITS - MINUTES_WIDTH)
}

/// Folds the hemisphere letters into the signs of `magnitude`.
pub fn apply_hemispheres(
    magnitude: Position,
    ns: Option<char>,
    ew: Option<char>,
    rule: SignRule,
) -> Position {
    let Position { mut lat, mut lon } = magnitude;
    match rule {
        SignRule::Literal => {
            // Both letters act on latitude, longitude keeps its magnitude
            if ew == Some('W') {
                lat = -lat;
            }
            if ns == Some('S') {
                lat = -lat;
            }
        }
        SignRule::Corrected => {
            if ns == Some('S') {
                lat = -lat;
            }
            if ew == Some('W') {
                lon = -lon;
            }
        }
    }
    Position { lat, lon }
}

/// Converts raw latitude/longitude fields plus hemisphere letters into a
/// signed position.
pub fn convert(
    latitude: &[u8],
    ns: Option<char>,
    longitude: &[u8],
    ew: Option<char>,
    rule: SignRule,
) -> Result<Position, CoordError> {
    let magnitude = Position {
        lat: latitude_degrees(latitude)?,
        lon: longitude_degrees(longitude)?,
    };
    Ok(apply_hemispheres(magnitude, ns, ew, rule))
}
