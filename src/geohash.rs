//! Geohash encoding for cache keys.
//!
//! Standard base-32 geohash: interleave longitude/latitude interval halving,
//! five bits per output character. Used purely as a deterministic cache key,
//! not for proximity search. Precision 5 gives a cell of roughly ±2.4 km,
//! so nearby queries land in the same cell.

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Cache key precision used by the geocache.
pub const CACHE_PRECISION: usize = 5;

/// Encode a coordinate as a geohash string of the given length.
///
/// Deterministic: the same input always yields the same key. Callers are
/// expected to validate coordinates before encoding.
pub fn encode(lat: f64, lon: f64, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);

    let mut hash = String::with_capacity(precision);
    let mut bits = 0u8;
    let mut bit_count = 0u8;
    let mut even_bit = true; // longitude first

    while hash.len() < precision {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if lon >= mid {
                bits = (bits << 1) | 1;
                lon_range.0 = mid;
            } else {
                bits <<= 1;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if lat >= mid {
                bits = (bits << 1) | 1;
                lat_range.0 = mid;
            } else {
                bits <<= 1;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;

        bit_count += 1;
        if bit_count == 5 {
            hash.push(BASE32[bits as usize] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    hash
}
