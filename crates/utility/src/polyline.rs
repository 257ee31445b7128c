//! Codec for the encoded polyline format used by routing services: signed
//! coordinate deltas at a precision of 1e-5 degrees, ZigZag encoded and split
//! into 5-bit chunks offset by 63.

use std::{error, fmt};

const PRECISION: f64 = 1e5;
const CHUNK_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineError {
    /// The input ended while a value still had its continuation bit set.
    Truncated { position: usize },
    /// The input ended after a latitude without the matching longitude.
    MissingLongitude { position: usize },
    /// A byte outside of the encoding alphabet (`?` to `~`).
    InvalidCharacter { position: usize, byte: u8 },
    /// A value did not fit into 64 bits.
    Overflow { position: usize },
}

impl error::Error for PolylineError {}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Truncated { position } => {
                write!(f, "polyline ends inside a value at byte {}", position)
            }
            Self::MissingLongitude { position } => {
                write!(f, "polyline ends after a latitude at byte {}", position)
            }
            Self::InvalidCharacter { position, byte } => {
                write!(f, "invalid polyline byte {:#04x} at {}", byte, position)
            }
            Self::Overflow { position } => {
                write!(f, "polyline value overflows at byte {}", position)
            }
        }
    }
}

/// Reads a single varint starting at `*index` and returns the ZigZag decoded
/// delta.
fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&raw) = bytes.get(*index) else {
            return Err(PolylineError::Truncated { position: *index });
        };
        if !(CHUNK_OFFSET..=127).contains(&raw) {
            return Err(PolylineError::InvalidCharacter {
                position: *index,
                byte: raw,
            });
        }
        if shift >= 64 {
            return Err(PolylineError::Overflow { position: *index });
        }
        *index += 1;

        let byte = u64::from(raw - CHUNK_OFFSET);
        result |= (byte & CHUNK_MASK) << shift;
        shift += 5;

        if byte < CONTINUATION_BIT {
            break;
        }
    }

    let value = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !value } else { value })
}

/// Decodes an encoded polyline into `(latitude, longitude)` pairs in degrees.
///
/// Points are returned in encoding order. Malformed input never yields a
/// partial result.
pub fn decode(encoded: &str) -> Result<Vec<(f64, f64)>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while index < bytes.len() {
        latitude = latitude
            .checked_add(decode_value(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow { position: index })?;
        if index >= bytes.len() {
            return Err(PolylineError::MissingLongitude { position: index });
        }
        longitude = longitude
            .checked_add(decode_value(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow { position: index })?;

        points.push((latitude as f64 / PRECISION, longitude as f64 / PRECISION));
    }

    Ok(points)
}

fn encode_value(delta: i64, output: &mut String) {
    let mut value = if delta < 0 {
        !((delta as u64) << 1)
    } else {
        (delta as u64) << 1
    };
    while value >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (value & CHUNK_MASK)) as u8 + CHUNK_OFFSET;
        output.push(chunk as char);
        value >>= 5;
    }
    output.push((value as u8 + CHUNK_OFFSET) as char);
}

/// Encodes `(latitude, longitude)` pairs in degrees.
pub fn encode<I>(points: I) -> String
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut output = String::new();
    let mut previous = (0_i64, 0_i64);
    for (latitude, longitude) in points {
        let latitude = (latitude * PRECISION).round() as i64;
        let longitude = (longitude * PRECISION).round() as i64;
        encode_value(latitude - previous.0, &mut output);
        encode_value(longitude - previous.1, &mut output);
        previous = (latitude, longitude);
    }
    output
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;

    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    #[test]
    fn decodes_reference_vector() {
        let points = decode(REFERENCE).unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        assert_eq!(points.len(), expected.len());
        for (point, expected) in points.iter().zip(expected) {
            assert_float_absolute_eq!(point.0, expected.0, 1e-9);
            assert_float_absolute_eq!(point.1, expected.1, 1e-9);
        }
    }

    #[test]
    fn encodes_reference_vector() {
        let encoded = encode(vec![(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
        assert_eq!(encoded, REFERENCE);
    }

    #[test]
    fn empty_input_is_an_empty_path() {
        assert_eq!(decode("").unwrap(), Vec::new());
        assert_eq!(encode(Vec::new()), "");
    }

    #[test]
    fn trailing_continuation_is_truncated() {
        let malformed = format!("{REFERENCE}_");
        assert_eq!(
            decode(&malformed),
            Err(PolylineError::Truncated {
                position: REFERENCE.len() + 1
            })
        );
    }

    #[test]
    fn lone_latitude_is_rejected() {
        // "_p~iF" is the first latitude of the reference vector
        assert_eq!(
            decode("_p~iF"),
            Err(PolylineError::MissingLongitude { position: 5 })
        );
    }

    #[test]
    fn characters_below_the_alphabet_are_rejected() {
        assert_eq!(
            decode("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter {
                position: 5,
                byte: b' '
            })
        );
    }

    #[test]
    fn endless_continuation_overflows() {
        let encoded = "_".repeat(20);
        assert!(matches!(
            decode(&encoded),
            Err(PolylineError::Overflow { .. })
        ));
    }
}
