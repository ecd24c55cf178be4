//! Lexical line matchers used to find drawing operators.
//!
//! This is a heuristic, not a content-stream tokenizer: a line matches if its
//! bytes contain the pattern anywhere.

use regex::bytes::Regex;

use crate::error::{Result, UnveilError};
use crate::latin1;

/// The XObject painting operator, preceded by the operand separator.
pub const DRAW_OPERATOR: &str = " Do";

/// Decides whether a single byte-line contains the operator of interest.
pub trait LineMatcher {
    fn matches(&self, line: &[u8]) -> bool;

    /// Human-readable form of the pattern, for logs.
    fn describe(&self) -> String;
}

/// Substring match against the latin-1 view of the line.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    token: Vec<u8>,
}

impl SubstringMatcher {
    pub fn new(token: &str) -> Result<Self> {
        let token = latin1::encode(token).ok_or_else(|| {
            UnveilError::InvalidPattern(format!("{:?} is not representable as latin-1", token))
        })?;
        Ok(Self { token })
    }

    pub fn draw_operator() -> Self {
        Self {
            token: DRAW_OPERATOR.as_bytes().to_vec(),
        }
    }
}

impl Default for SubstringMatcher {
    fn default() -> Self {
        Self::draw_operator()
    }
}

impl LineMatcher for SubstringMatcher {
    fn matches(&self, line: &[u8]) -> bool {
        if self.token.is_empty() {
            return true;
        }
        line.windows(self.token.len()).any(|w| w == self.token.as_slice())
    }

    fn describe(&self) -> String {
        format!("{:?}", latin1::decode(&self.token))
    }
}

/// Regular-expression match over the raw line bytes.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    re: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| UnveilError::InvalidPattern(e.to_string()))?;
        Ok(Self { re })
    }
}

impl LineMatcher for RegexMatcher {
    fn matches(&self, line: &[u8]) -> bool {
        self.re.is_match(line)
    }

    fn describe(&self) -> String {
        format!("/{}/", self.re.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_operator_substring() {
        let m = SubstringMatcher::default();
        assert!(m.matches(b"/X1 Do"));
        assert!(m.matches(b"q 400 0 0 100 100 592 cm /Im0 Do Q"));
        assert!(!m.matches(b"/X1Do"));
        assert!(!m.matches(b"q"));
        assert!(!m.matches(b""));
    }

    #[test]
    fn test_substring_on_binary_line() {
        let m = SubstringMatcher::new(" Do").unwrap();
        assert!(m.matches(b"\xff\x00 /Fm3 Do\x80"));
    }

    #[test]
    fn test_empty_token_matches_everything() {
        let m = SubstringMatcher::new("").unwrap();
        assert!(m.matches(b""));
        assert!(m.matches(b"anything"));
    }

    #[test]
    fn test_non_latin1_token_rejected() {
        assert!(matches!(
            SubstringMatcher::new("\u{4e2d}"),
            Err(UnveilError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_regex_matcher() {
        let m = RegexMatcher::new(r"/Im\d+ Do").unwrap();
        assert!(m.matches(b"/Im12 Do"));
        assert!(!m.matches(b"/Fm1 Do"));
        assert_eq!(m.describe(), r"//Im\d+ Do/");
    }

    #[test]
    fn test_bad_regex() {
        assert!(matches!(
            RegexMatcher::new("(unclosed"),
            Err(UnveilError::InvalidPattern(_))
        ));
    }
}
