//! Pairing-code generation.
//!
//! A pairing code is the human-entered alternative to scanning a QR image:
//! eight random digits behind a fixed product prefix, generated exactly once
//! per session. Codes are not required to be unique — only the session id
//! is — so no collision check is performed.

/// Prefix on every pairing code.
pub const PAIRING_CODE_PREFIX: &str = "WABridge";

const DIGITS_MIN: u64 = 10_000_000;
const DIGITS_SPAN: u64 = 90_000_000;

#[derive(Debug, thiserror::Error)]
#[error("RNG failure: {0}")]
pub struct PairingCodeError(getrandom::Error);

/// Generate a fresh `WABridge-<8 digits>` pairing code.
pub fn generate_pairing_code() -> Result<String, PairingCodeError> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(PairingCodeError)?;
    let digits = DIGITS_MIN + u64::from_le_bytes(buf) % DIGITS_SPAN;
    Ok(format!("{PAIRING_CODE_PREFIX}-{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_prefix_and_eight_digits() {
        let code = generate_pairing_code().unwrap();
        let digits = code.strip_prefix("WABridge-").expect("missing prefix");
        assert_eq!(digits.len(), 8);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn digits_stay_in_range() {
        for _ in 0..64 {
            let code = generate_pairing_code().unwrap();
            let digits: u64 = code.strip_prefix("WABridge-").unwrap().parse().unwrap();
            assert!((10_000_000..=99_999_999).contains(&digits));
        }
    }
}
