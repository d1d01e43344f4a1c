/// Stored in the cell when input has no leading integer.
pub const FALLBACK_VALUE: u32 = 0;

/// Parses the leading base-10 integer of `input` and wraps it into `u32` range.
///
/// Leading whitespace and one `+`/`-` sign are accepted, then the longest run of ASCII digits.
/// Anything after the digits is ignored. Returns `None` when no digit is found.
///
/// Wrapping is modulo 2^32, so `-1` gives `u32::MAX` and `4294967296` gives `0`.
pub fn parse_leading_u32(input: &str) -> Option<u32> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: u32 = 0;
    let mut seen_digit = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.wrapping_mul(10).wrapping_add(u32::from(b - b'0'));
        seen_digit = true;
    }

    if !seen_digit {
        return None;
    }

    Some(if negative { value.wrapping_neg() } else { value })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_leading_u32("0"), Some(0));
        assert_eq!(parse_leading_u32("31337"), Some(31337));
        assert_eq!(parse_leading_u32("4294967295"), Some(u32::MAX));
        assert_eq!(parse_leading_u32("+42"), Some(42));
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(parse_leading_u32("4294967296"), Some(0));
        assert_eq!(parse_leading_u32("4294967297"), Some(1));
        assert_eq!(parse_leading_u32("-1"), Some(4294967295));
        assert_eq!(parse_leading_u32("-4294967295"), Some(1));
        assert_eq!(parse_leading_u32("-0"), Some(0));
        // 10^20 mod 2^32
        assert_eq!(parse_leading_u32("100000000000000000000"), Some(1661992960));
    }

    #[test]
    fn test_leading_prefix() {
        assert_eq!(parse_leading_u32("  12abc"), Some(12));
        assert_eq!(parse_leading_u32("\t7 8"), Some(7));
        assert_eq!(parse_leading_u32("1e3"), Some(1));
        assert_eq!(parse_leading_u32("3.99"), Some(3));
        assert_eq!(parse_leading_u32("0x10"), Some(0));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(parse_leading_u32(""), None);
        assert_eq!(parse_leading_u32("abc"), None);
        assert_eq!(parse_leading_u32("-"), None);
        assert_eq!(parse_leading_u32("+-1"), None);
        assert_eq!(parse_leading_u32("- 1"), None);
        assert_eq!(parse_leading_u32("Infinity"), None);
        assert_eq!(parse_leading_u32("٣"), None);
    }
}
