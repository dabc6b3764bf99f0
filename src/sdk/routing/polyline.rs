//! Encoded polyline codec.
//!
//! Each coordinate is stored as a latitude delta followed by a longitude delta, both
//! zig-zag folded and split into 5-bit groups (least significant first) offset by 63.
//! A group carrying `0x20` is followed by another group of the same value.

use super::coord::Coord;
use super::error::DecodeError;

/// Number of decimal digits an encoded integer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision(u32);

impl Precision {
    /// Valhalla encodes shapes at 1e-6 degrees.
    pub const VALHALLA: Precision = Precision(6);
    /// Google-style polylines use 1e-5 degrees.
    pub const GOOGLE: Precision = Precision(5);

    pub fn new(digits: u32) -> Option<Self> {
        (1..=10).contains(&digits).then_some(Precision(digits))
    }

    pub fn digits(&self) -> u32 {
        self.0
    }

    fn factor(&self) -> f64 {
        10f64.powi(self.0 as i32)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::VALHALLA
    }
}

const OFFSET: u8 = 63;
const MAX_BYTE: u8 = OFFSET + 0x3f;
const CONTINUATION: u64 = 0x20;
const PAYLOAD: u64 = 0x1f;
const MAX_SHIFT: u32 = 60;

/// Decodes a Valhalla shape string into (lon, lat) coordinates.
pub fn decode(encoded: &str) -> Result<Vec<Coord>, DecodeError> {
    decode_with_precision(encoded, Precision::VALHALLA)
}

pub fn decode_with_precision(encoded: &str, precision: Precision) -> Result<Vec<Coord>, DecodeError> {
    let bytes = encoded.as_bytes();
    let factor = precision.factor();
    let mut coords = Vec::new();
    let mut previous_lat: i64 = 0;
    let mut previous_lon: i64 = 0;
    let mut offset = 0;

    while offset < bytes.len() {
        let (lat_delta, next) = decode_value(bytes, offset)?;
        let (lon_delta, next) = decode_value(bytes, next)?;

        previous_lat = previous_lat
            .checked_add(lat_delta)
            .ok_or(DecodeError::Overflow { offset })?;
        previous_lon = previous_lon
            .checked_add(lon_delta)
            .ok_or(DecodeError::Overflow { offset })?;
        offset = next;

        coords.push(Coord::new(
            scale(previous_lon, factor),
            scale(previous_lat, factor),
        ));
    }

    Ok(coords)
}

/// Reads one zig-zag value starting at `offset`, returning it with the offset just past it.
fn decode_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), DecodeError> {
    let start = offset;
    let mut raw: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(offset).ok_or(DecodeError::Truncated { offset })?;
        if !(OFFSET..=MAX_BYTE).contains(&byte) {
            return Err(DecodeError::InvalidByte { offset, byte });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { offset: start });
        }

        let chunk = u64::from(byte - OFFSET);
        let payload = chunk & PAYLOAD;
        // The last group may only use the bits still left in a u64.
        if (payload << shift) >> shift != payload {
            return Err(DecodeError::Overflow { offset: start });
        }
        raw |= payload << shift;
        shift += 5;
        offset += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let delta = if raw & 1 == 1 {
        !((raw >> 1) as i64)
    } else {
        (raw >> 1) as i64
    };
    Ok((delta, offset))
}

// Division by a power of ten already yields the nearest f64 to the `digits`-place value.
fn scale(value: i64, factor: f64) -> f64 {
    value as f64 / factor
}

/// Encodes coordinates at the given precision. Inverse of [`decode_with_precision`].
pub fn encode(coords: &[Coord], precision: Precision) -> String {
    let factor = precision.factor();
    let mut out = String::with_capacity(coords.len() * 8);
    let mut previous_lat: i64 = 0;
    let mut previous_lon: i64 = 0;

    for coord in coords {
        let lat = (coord.lat * factor).round() as i64;
        let lon = (coord.lon * factor).round() as i64;
        encode_value(lat - previous_lat, &mut out);
        encode_value(lon - previous_lon, &mut out);
        previous_lat = lat;
        previous_lon = lon;
    }

    out
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;
    while value >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (value & PAYLOAD)) as u8) + OFFSET));
        value >>= 5;
    }
    out.push(char::from(value as u8 + OFFSET));
}
