//! Collision-resistant identifiers for entities that must stay unique
//! across process restarts (§9): `trade_id`, `review_id`, and alert ids are
//! 8 hex characters drawn from a cryptographic RNG, distinct from the
//! monotone-counter `event_id` scheme used by the compliance log.

use rand::RngCore;

/// Returns `digits` lowercase hex characters (so `hex_token(8)` yields the
/// 8-hex-char tokens §9 specifies for `trade_id`/`review_id`).
pub fn hex_token(digits: usize) -> String {
    let bytes_needed = digits.div_ceil(2);
    let mut bytes = vec![0u8; bytes_needed];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut hex = String::with_capacity(bytes_needed * 2);
    for b in bytes {
        hex.push_str(&format!("{b:02x}"));
    }
    hex.truncate(digits);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_length() {
        assert_eq!(hex_token(8).len(), 8);
    }

    #[test]
    fn two_calls_differ() {
        assert_ne!(hex_token(8), hex_token(8));
    }
}
