use crate::domain::IndexError;

/// Parse a base address given as hexadecimal text
///
/// Accepts `0x`/`0X` prefixed values, a bare `x` prefix, or plain hex digits.
/// Surrounding whitespace is ignored.
///
/// # Errors
/// Returns [`IndexError::InvalidBaseAddress`] for empty input, non-hex
/// digits, or values that do not fit in 64 bits
pub fn parse_base_address(text: &str) -> Result<u64, IndexError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('x'))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IndexError::InvalidBaseAddress(text.to_string()));
    }

    u64::from_str_radix(digits, 16).map_err(|_| IndexError::InvalidBaseAddress(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_forms() {
        assert_eq!(parse_base_address("0x400000").unwrap(), 0x40_0000);
        assert_eq!(parse_base_address("0X1F").unwrap(), 0x1f);
        assert_eq!(parse_base_address("x10").unwrap(), 0x10);
    }

    #[test]
    fn test_plain_hex_and_zero() {
        assert_eq!(parse_base_address("7fff0000").unwrap(), 0x7fff_0000);
        assert_eq!(parse_base_address("0").unwrap(), 0);
        assert_eq!(parse_base_address("0x0").unwrap(), 0);
        assert_eq!(parse_base_address(" 0x20 ").unwrap(), 0x20);
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "0x", "zz", "0x12g4", "+10", "-1", "0x1_000"] {
            let err = parse_base_address(bad).unwrap_err();
            assert!(matches!(err, IndexError::InvalidBaseAddress(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_base_address("0x10000000000000000").is_err());
        assert_eq!(parse_base_address("0xffffffffffffffff").unwrap(), u64::MAX);
    }
}
