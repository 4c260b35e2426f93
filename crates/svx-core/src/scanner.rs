//! Cursor-based scanner shared by every micro-grammar in the crate
//! (path data, transform lists, colours, lengths, fonts, CSS).
//!
//! The scanner never allocates and never fails: primitives either advance
//! the cursor and return a value, or return an absence value and leave the
//! cursor where it was.

use crate::number;
use crate::values::{Length, Unit};

/// Whitespace as defined by the SVG and XML grammars.
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

/// Trim SVG whitespace from both ends.
pub fn trim(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

#[derive(Debug, Clone)]
pub struct TextScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TextScanner<'a> {
    /// Create a scanner over `input` with surrounding whitespace removed.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: trim(input),
            pos: 0,
        }
    }

    /// Create a scanner over `input` exactly as given.
    pub fn untrimmed(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a position previously returned by [`position`](Self::position).
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    pub fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Skip `wsp* (',' wsp*)?`. Returns whether a comma was consumed.
    pub fn skip_comma_whitespace(&mut self) -> bool {
        self.skip_whitespace();
        if self.peek() != Some(b',') {
            return false;
        }
        self.pos += 1;
        self.skip_whitespace();
        true
    }

    /// Scan a number. Returns `NaN` and leaves the cursor untouched when
    /// there is no number at the cursor; callers must test with `is_nan()`.
    pub fn next_float(&mut self) -> f32 {
        match number::scan_float(self.input, self.pos) {
            Some((value, end)) => {
                self.pos = end;
                value
            }
            None => f32::NAN,
        }
    }

    /// Scan `comma-wsp number`. On failure the cursor is restored and
    /// `NaN` is returned.
    pub fn possible_next_float(&mut self) -> f32 {
        let start = self.pos;
        self.skip_comma_whitespace();
        let value = self.next_float();
        if value.is_nan() {
            self.pos = start;
        }
        value
    }

    /// Scan `comma-wsp number` but only if a number actually follows.
    /// Used to chain optional trailing arguments.
    pub fn check_for_float(&mut self) -> Option<f32> {
        let v = self.possible_next_float();
        (!v.is_nan()).then_some(v)
    }

    pub fn next_integer(&mut self) -> Option<i32> {
        let (value, end) = number::scan_integer(self.input, self.pos)?;
        self.pos = end;
        Some(value)
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Scan a number with an optional unit suffix. A bare number is in px.
    pub fn next_length(&mut self) -> Option<Length> {
        let value = self.next_float();
        if value.is_nan() {
            return None;
        }
        let unit = self.next_unit().unwrap_or(Unit::Px);
        Some(Length::new(value, unit))
    }

    /// Scan a single `0`/`1` arc flag.
    pub fn next_flag(&mut self) -> Option<bool> {
        match self.peek()? {
            b'0' => {
                self.pos += 1;
                Some(false)
            }
            b'1' => {
                self.pos += 1;
                Some(true)
            }
            _ => None,
        }
    }

    /// Consume `ch` if it is next.
    pub fn consume(&mut self, ch: u8) -> bool {
        let found = self.peek() == Some(ch);
        if found {
            self.pos += 1;
        }
        found
    }

    /// Consume `literal` entirely, or nothing at all.
    pub fn consume_str(&mut self, literal: &str) -> bool {
        let found = self.remaining().starts_with(literal);
        if found {
            self.pos += literal.len();
        }
        found
    }

    /// ASCII case-insensitive form of [`consume_str`](Self::consume_str).
    pub fn consume_str_ignore_case(&mut self, literal: &str) -> bool {
        let rest = self.remaining().as_bytes();
        let found = rest.len() >= literal.len()
            && rest[..literal.len()].eq_ignore_ascii_case(literal.as_bytes());
        if found {
            self.pos += literal.len();
        }
        found
    }

    /// Scan a run of characters up to whitespace or `terminator`.
    pub fn next_token(&mut self, terminator: u8) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && !is_whitespace(bytes[end]) && bytes[end] != terminator {
            end += 1;
        }
        if end == start {
            return None;
        }
        self.pos = end;
        Some(&self.input[start..end])
    }

    /// Scan a run of characters up to whitespace.
    pub fn next_word(&mut self) -> Option<&'a str> {
        self.next_token(b' ')
    }

    /// Scan `letters wsp* '('` and return the letters. Restores the cursor
    /// if no open bracket follows.
    pub fn next_function(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }
        let mut p = end;
        while p < bytes.len() && is_whitespace(bytes[p]) {
            p += 1;
        }
        if end > start && p < bytes.len() && bytes[p] == b'(' {
            self.pos = p + 1;
            return Some(&self.input[start..end]);
        }
        None
    }

    /// Scan a length unit: `%` or one of the two-letter unit keywords.
    pub fn next_unit(&mut self) -> Option<Unit> {
        if self.consume(b'%') {
            return Some(Unit::Percent);
        }
        let rest = self.remaining();
        let unit = Unit::from_suffix(rest.get(..2)?)?;
        self.pos += 2;
        Some(unit)
    }

    pub fn has_letter(&self) -> bool {
        self.peek().is_some_and(|c| c.is_ascii_alphabetic())
    }

    /// Scan a single- or double-quoted string and return its contents.
    /// An unterminated string consumes nothing.
    pub fn next_quoted_string(&mut self) -> Option<&'a str> {
        let quote = self.peek()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let body_start = self.pos + 1;
        let close = self.input[body_start..].find(quote as char)?;
        self.pos = body_start + close + 1;
        Some(&self.input[body_start..body_start + close])
    }

    /// Scan a CSS identifier: `-? [A-Za-z_] [A-Za-z0-9_-]*`.
    pub fn next_identifier(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut p = start;
        if p < bytes.len() && bytes[p] == b'-' {
            p += 1;
        }
        if p >= bytes.len() || !(bytes[p].is_ascii_alphabetic() || bytes[p] == b'_') {
            return None;
        }
        p += 1;
        while p < bytes.len()
            && (bytes[p].is_ascii_alphanumeric() || bytes[p] == b'_' || bytes[p] == b'-')
        {
            p += 1;
        }
        self.pos = p;
        Some(&self.input[start..p])
    }

    /// Everything from the cursor to the end.
    pub fn rest_of_text(&mut self) -> Option<&'a str> {
        if self.empty() {
            return None;
        }
        let rest = self.remaining();
        self.pos = self.input.len();
        Some(rest)
    }

    /// The next whitespace-delimited chunk without consuming it. Used in
    /// diagnostics.
    pub fn ahead(&self) -> &'a str {
        let rest = self.remaining();
        let end = rest
            .bytes()
            .position(is_whitespace)
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_float_returns_nan_and_keeps_position() {
        let mut s = TextScanner::new("abc");
        assert!(s.next_float().is_nan());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn comma_whitespace_reports_comma() {
        let mut s = TextScanner::new("1 , 2 3");
        assert_eq!(s.next_float(), 1.0);
        assert!(s.skip_comma_whitespace());
        assert_eq!(s.next_float(), 2.0);
        assert!(!s.skip_comma_whitespace());
        assert_eq!(s.next_float(), 3.0);
        assert!(s.empty());
    }

    #[test]
    fn consume_is_all_or_nothing() {
        let mut s = TextScanner::new("auto");
        assert!(!s.consume_str("autos"));
        assert_eq!(s.position(), 0);
        assert!(s.consume_str("auto"));
        assert!(s.empty());
    }

    #[test]
    fn possible_next_float_restores_on_failure() {
        let mut s = TextScanner::new("10, x");
        assert_eq!(s.next_float(), 10.0);
        let before = s.position();
        assert!(s.possible_next_float().is_nan());
        assert_eq!(s.position(), before);
    }

    #[test]
    fn function_names_and_lengths() {
        let mut s = TextScanner::new("rotate (45)");
        assert_eq!(s.next_function(), Some("rotate"));
        assert_eq!(s.next_float(), 45.0);
        assert!(s.consume(b')'));

        let mut s = TextScanner::new("12.5mm 3 50%");
        assert_eq!(s.next_length(), Some(Length::new(12.5, Unit::Mm)));
        s.skip_whitespace();
        assert_eq!(s.next_length(), Some(Length::px(3.0)));
        s.skip_whitespace();
        assert_eq!(s.next_length(), Some(Length::new(50.0, Unit::Percent)));
    }

    #[test]
    fn tokens_quotes_and_identifiers() {
        let mut s = TextScanner::new("'Times New' serif");
        assert_eq!(s.next_quoted_string(), Some("Times New"));
        s.skip_whitespace();
        assert_eq!(s.next_word(), Some("serif"));

        let mut s = TextScanner::new("-my_class2.b");
        assert_eq!(s.next_identifier(), Some("-my_class2"));
        assert!(s.consume(b'.'));

        let mut s = TextScanner::new("\"open");
        assert_eq!(s.next_quoted_string(), None);
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn flags_are_single_characters() {
        let mut s = TextScanner::new("10");
        assert_eq!(s.next_flag(), Some(true));
        assert_eq!(s.next_flag(), Some(false));
        assert_eq!(s.next_flag(), None);
    }
}
