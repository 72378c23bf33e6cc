//! Dotted-quad address extraction from free-form log text.
//!
//! The scanner is deliberately permissive: it recognises four groups of one
//! to three ASCII digits separated by dots, bounded on both sides by
//! non-word characters. Octet ranges are not checked, so `999.999.999.999`
//! is extracted just like `10.0.0.1`.

use std::borrow::Borrow;
use std::fmt;

/// A dotted-quad token extracted from a log line.
///
/// Identity is the string form; no numeric normalisation happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Wrap a string that is known to be a full dotted-quad.
    ///
    /// Returns `None` if `s` is not exactly one address.
    pub fn parse(s: &str) -> Option<Self> {
        if is_address(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lazy iterator over the addresses found in one line, left to right.
pub struct Addresses<'a> {
    text: &'a str,
    pos: usize,
}

/// Scan `text` for dotted-quad addresses.
pub fn addresses(text: &str) -> Addresses<'_> {
    Addresses { text, pos: 0 }
}

/// Whether `s` consists of exactly one dotted-quad and nothing else.
pub fn is_address(s: &str) -> bool {
    match_at(s, 0) == Some(s.len())
}

impl<'a> Iterator for Addresses<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;

            if bytes[start].is_ascii_digit() && at_word_start(self.text, start) {
                if let Some(end) = match_at(self.text, start) {
                    self.pos = end;
                    return Some(&self.text[start..end]);
                }
            }

            self.pos += 1;
        }

        None
    }
}

/// Try to match a dotted-quad starting at `start`; returns the end offset.
///
/// Digit groups are taken greedily; a group longer than three digits can
/// never match because the following character would be a digit rather than
/// a dot or a boundary.
fn match_at(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = start;

    for group in 0..4 {
        let run = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        if run == 0 || run > 3 {
            return None;
        }
        pos += run;

        if group < 3 {
            if bytes.get(pos) != Some(&b'.') {
                return None;
            }
            pos += 1;
        }
    }

    if at_word_end(text, pos) {
        Some(pos)
    } else {
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn at_word_start(text: &str, pos: usize) -> bool {
    !text[..pos].chars().next_back().is_some_and(is_word_char)
}

fn at_word_end(text: &str, pos: usize) -> bool {
    !text[pos..].chars().next().is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(line: &str) -> Vec<&str> {
        addresses(line).collect()
    }

    #[test]
    fn test_extracts_in_order() {
        assert_eq!(
            collect("alert from 203.0.113.42 and 192.168.1.10"),
            vec!["203.0.113.42", "192.168.1.10"]
        );
    }

    #[test]
    fn test_no_octet_validation() {
        assert_eq!(collect("weird 999.999.999.999 here"), vec!["999.999.999.999"]);
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert!(collect("").is_empty());
        assert!(collect("nothing to see, version 1.2.3").is_empty());
    }

    #[test]
    fn test_word_boundaries() {
        // Glued to letters or underscores on either side: no match.
        assert!(collect("host10.0.0.1").is_empty());
        assert!(collect("10.0.0.1abc").is_empty());
        assert!(collect("_10.0.0.1").is_empty());

        // Punctuation is a boundary.
        assert_eq!(collect("[10.0.0.1]:443"), vec!["10.0.0.1"]);
        assert_eq!(collect("ip=10.0.0.1,"), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_overlong_groups_rejected() {
        assert!(collect("1234.1.1.1").is_empty());
        assert!(collect("1.2.3.4567").is_empty());
    }

    #[test]
    fn test_trailing_dot_groups() {
        // Scanning resumes after each match.
        assert_eq!(collect("1.2.3.4.5.6.7.8"), vec!["1.2.3.4", "5.6.7.8"]);
        assert_eq!(collect("1.2.3.4."), vec!["1.2.3.4"]);
    }

    #[test]
    fn test_restartable() {
        let line = "a 1.1.1.1 b 2.2.2.2";
        assert_eq!(collect(line), collect(line));
        assert_eq!(addresses(line).count(), 2);
    }

    #[test]
    fn test_non_ascii_neighbours() {
        assert_eq!(collect("→10.0.0.1←"), vec!["10.0.0.1"]);
        assert!(collect("é10.0.0.1").is_empty());
    }

    #[test]
    fn test_is_address() {
        assert!(is_address("203.0.113.42"));
        assert!(!is_address("203.0.113"));
        assert!(!is_address(" 203.0.113.42"));
        assert!(!is_address("203.0.113.42 "));
        assert!(!is_address("not-an-ip"));
    }

    #[test]
    fn test_address_parse() {
        assert_eq!(
            Address::parse("45.83.64.12").map(|a| a.to_string()),
            Some("45.83.64.12".to_string())
        );
        assert!(Address::parse("45.83.64").is_none());
    }
}
