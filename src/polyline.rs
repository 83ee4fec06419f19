//! Encoded polyline decoding.
//!
//! Directions services return route geometry as a compact ASCII string:
//! each coordinate is stored as the delta from the previous one, scaled to
//! an integer, zig-zag encoded, and split into 5-bit chunks offset by 63.
//! See <https://developers.google.com/maps/documentation/utilities/polylinealgorithm>.

use crate::{Error, GpsPoint, Result};

/// Precision used by the Google Directions API (5 decimal places).
pub const DEFAULT_PRECISION: u32 = 5;

const CHUNK_OFFSET: u8 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
// 64-bit accumulator; anything past this shift is garbage
const MAX_SHIFT: u32 = 60;

/// Decode a polyline encoded with 5 decimal places of precision.
///
/// ```rust
/// use shelter_router::{decode_polyline, GpsPoint};
///
/// let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(points, vec![
///     GpsPoint::new(38.5, -120.2),
///     GpsPoint::new(40.7, -120.95),
///     GpsPoint::new(43.252, -126.453),
/// ]);
/// ```
pub fn decode_polyline(encoded: &str) -> Result<Vec<GpsPoint>> {
    decode_polyline_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline with an explicit precision (5 for Google, 6 for OSRM/Valhalla).
pub fn decode_polyline_with_precision(encoded: &str, precision: u32) -> Result<Vec<GpsPoint>> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();

    // Every coordinate pair takes at least two bytes
    let mut points = Vec::with_capacity(bytes.len() / 2);
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        lat = accumulate(lat, next_value(bytes, &mut pos)?, start)?;
        if pos >= bytes.len() {
            return Err(Error::MalformedPolyline {
                position: pos,
                reason: "latitude without matching longitude",
            });
        }
        lng = accumulate(lng, next_value(bytes, &mut pos)?, start)?;

        let point = GpsPoint::new(lat as f64 / factor, lng as f64 / factor);
        if !point.is_valid() {
            return Err(Error::MalformedPolyline {
                position: start,
                reason: "coordinate out of range",
            });
        }
        points.push(point);
    }

    Ok(points)
}

fn accumulate(total: i64, delta: i64, position: usize) -> Result<i64> {
    total.checked_add(delta).ok_or(Error::MalformedPolyline {
        position,
        reason: "coordinate overflow",
    })
}

/// Read one zig-zag encoded delta starting at `pos`, advancing it.
fn next_value(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(Error::MalformedPolyline {
                position: *pos,
                reason: "value truncated mid-sequence",
            });
        };
        if !(CHUNK_OFFSET..=b'~').contains(&byte) {
            return Err(Error::MalformedPolyline {
                position: *pos,
                reason: "character outside encoding range",
            });
        }
        if shift > MAX_SHIFT {
            return Err(Error::MalformedPolyline {
                position: *pos,
                reason: "value too long",
            });
        }

        let chunk = (byte - CHUNK_OFFSET) as i64;
        *pos += 1;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    // Undo zig-zag: low bit carries the sign
    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_geometry() {
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(
            points,
            vec![
                GpsPoint::new(38.5, -120.2),
                GpsPoint::new(40.7, -120.95),
                GpsPoint::new(43.252, -126.453),
            ]
        );
    }

    #[test]
    fn test_decode_empty_string() {
        assert!(decode_polyline("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_origin_point() {
        // Zero deltas encode as '?'
        assert_eq!(decode_polyline("??").unwrap(), vec![GpsPoint::new(0.0, 0.0)]);
    }

    #[test]
    fn test_decode_negative_values() {
        assert_eq!(decode_polyline("?`~oia@").unwrap(), vec![GpsPoint::new(0.0, -179.98321)]);
        assert_eq!(
            decode_polyline("b_vmEaa|y[").unwrap(),
            vec![GpsPoint::new(-33.86882, 151.20929)]
        );
    }

    #[test]
    fn test_decode_precision_six() {
        // Same integers, one more decimal place
        let points = decode_polyline_with_precision("_p~iF~ps|U", 6).unwrap();
        assert_eq!(points, vec![GpsPoint::new(3.85, -12.02)]);
    }

    #[test]
    fn test_decode_rejects_truncated_value() {
        // '|' has the continuation bit set and nothing follows
        let err = decode_polyline("_p~iF~ps|").unwrap_err();
        assert!(matches!(err, Error::MalformedPolyline { position: 9, .. }));
    }

    #[test]
    fn test_decode_rejects_dangling_latitude() {
        let err = decode_polyline("_p~iF").unwrap_err();
        assert!(matches!(err, Error::MalformedPolyline { position: 5, .. }));
    }

    #[test]
    fn test_decode_rejects_out_of_range_character() {
        let err = decode_polyline("_p~iF ps|U").unwrap_err();
        assert!(matches!(err, Error::MalformedPolyline { position: 5, .. }));
    }

    #[test]
    fn test_decode_rejects_huge_deltas_without_panicking() {
        // Each latitude delta is 2^62-1; summing three would overflow i64
        let encoded = format!("}}{}F?", "~".repeat(11)).repeat(3);
        let err = decode_polyline(&encoded).unwrap_err();
        assert!(matches!(err, Error::MalformedPolyline { position: 0, .. }));
    }

    #[test]
    fn test_accumulate_overflow_is_an_error() {
        assert_eq!(accumulate(1, 2, 0).unwrap(), 3);
        let err = accumulate(i64::MAX, 1, 7).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPolyline { position: 7, reason: "coordinate overflow" }
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_latitude() {
        // Latitude 95.0, longitude 0.0
        let err = decode_polyline("_uybQ?").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPolyline { position: 0, reason: "coordinate out of range" }
        ));
    }

    #[test]
    fn test_decode_rejects_endless_continuation() {
        let encoded = "~".repeat(20);
        let err = decode_polyline(&encoded).unwrap_err();
        assert!(matches!(err, Error::MalformedPolyline { reason: "value too long", .. }));
    }
}
