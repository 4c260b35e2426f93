//! Locale-independent number scanning with SVG grammar termination rules.
//!
//! A number is `sign? (digits ('.' digits?)? | '.' digits) exponent?` where
//! the exponent is only consumed when at least one digit follows `e`/`E`.
//! This keeps `1em` and `2ex` scanning as the number `1`/`2` followed by a
//! unit, and lets `0.5.5` split into two numbers.

/// Find the end of the number starting at `start`. Returns `start` when
/// no number is present.
pub fn scan_number_end(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let mut pos = start;
    let mut last_valid = start;
    let mut mantissa_digits = false;

    if pos < len && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }
    while pos < len && bytes[pos].is_ascii_digit() {
        pos += 1;
        mantissa_digits = true;
        last_valid = pos;
    }
    if pos < len && bytes[pos] == b'.' {
        let dot = pos;
        pos += 1;
        let mut fraction_digits = false;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
            fraction_digits = true;
        }
        if fraction_digits {
            mantissa_digits = true;
            last_valid = pos;
        } else if mantissa_digits {
            // "1." is a complete number
            last_valid = dot + 1;
            pos = dot + 1;
        }
    }
    if !mantissa_digits {
        return start;
    }
    if pos < len && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < len && bytes[exp].is_ascii_digit() {
            while exp < len && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            last_valid = exp;
        }
    }
    last_valid
}

/// Scan a float at `start`. Returns the value and the end offset.
pub fn scan_float(input: &str, start: usize) -> Option<(f32, usize)> {
    let end = scan_number_end(input.as_bytes(), start);
    if end == start {
        return None;
    }
    input[start..end].parse::<f32>().ok().map(|v| (v, end))
}

/// Scan an optionally signed decimal integer at `start`.
pub fn scan_integer(input: &str, start: usize) -> Option<(i32, usize)> {
    let bytes = input.as_bytes();
    let mut pos = start;
    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    // Saturate rather than fail on absurdly long digit runs
    let value = input[start..pos]
        .parse::<i64>()
        .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .unwrap_or(if bytes[start] == b'-' { i32::MIN } else { i32::MAX });
    Some((value, pos))
}

/// Parse a whole string as a number. Surrounding whitespace is allowed,
/// anything else is not.
pub fn parse_number(s: &str) -> Option<f32> {
    let s = s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    match scan_float(s, 0) {
        Some((v, end)) if end == s.len() => Some(v),
        _ => None,
    }
}

/// Value of one hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse a run of hex digits (at most 8) into an integer.
pub fn parse_hex(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    digits
        .bytes()
        .try_fold(0u32, |acc, b| Some(acc << 4 | hex_val(b)? as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(s: &str) -> Option<(f32, usize)> {
        scan_float(s, 0)
    }

    #[test]
    fn plain_and_signed_numbers() {
        assert_eq!(scan("12"), Some((12.0, 2)));
        assert_eq!(scan("-3.5"), Some((-3.5, 4)));
        assert_eq!(scan("+.25"), Some((0.25, 4)));
        assert_eq!(scan("1."), Some((1.0, 2)));
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(scan("1e3"), Some((1000.0, 3)));
        assert_eq!(scan("2.5E-1x"), Some((0.25, 6)));
        // "em" is a unit, not an exponent
        assert_eq!(scan("1em"), Some((1.0, 1)));
        assert_eq!(scan("4ex"), Some((4.0, 1)));
    }

    #[test]
    fn adjacent_numbers_split_on_second_dot() {
        let (a, end) = scan("0.5.5").unwrap();
        assert_eq!((a, end), (0.5, 3));
        assert_eq!(scan_float("0.5.5", end), Some((0.5, 5)));
    }

    #[test]
    fn non_numbers() {
        assert_eq!(scan(""), None);
        assert_eq!(scan("."), None);
        assert_eq!(scan("-"), None);
        assert_eq!(scan("abc"), None);
    }

    #[test]
    fn whole_string_parse_is_strict() {
        assert_eq!(parse_number(" 0.75 "), Some(0.75));
        assert_eq!(parse_number("0.75px"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn integers_and_hex() {
        assert_eq!(scan_integer("-42%", 0), Some((-42, 3)));
        assert_eq!(scan_integer("x", 0), None);
        assert_eq!(parse_hex("ff00"), Some(0xff00));
        assert_eq!(parse_hex("fg"), None);
        assert_eq!(parse_hex("123456789"), None);
    }
}
