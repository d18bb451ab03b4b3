//! Token rules
//!
//! A token rule inspects one line of text at a given offset and either
//! recognizes a token ending at some later offset or reports no match.
//! No match is the normal branch, not an error. Rules are immutable after
//! construction; everything that can go wrong is caught by the constructor.

use crate::rules::error::check_token_id;
use crate::rules::{HashTable, RuleError, TokenId, URIDetector};
use crate::syntax::IdentifierSyntax;
use regex::Regex;
use std::sync::Arc;

/// A rule recognizing text bounded by a start and an end sequence, such as
/// a string literal or a block comment opener.
///
/// An optional escape character protects the character after it from being
/// taken as the start of the end sequence. When the end sequence is missing
/// before the line ends the token extends to the end of the line; the
/// single-line scanner treats the construct as still open there.
#[derive(Debug, Clone)]
pub struct RegionTokenRule {
    id: TokenId,
    start: String,
    end: String,
    escape: Option<char>,
    case_sensitive: bool,
}

impl RegionTokenRule {
    /// Build a region rule. The end sequence may be empty, in which case
    /// the token always runs to the end of the line.
    pub fn new(
        id: TokenId,
        start: impl Into<String>,
        end: impl Into<String>,
        escape: Option<char>,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        check_token_id(id)?;
        let start = start.into();
        if start.is_empty() {
            return Err(RuleError::EmptyStartSequence);
        }
        Ok(Self {
            id,
            start,
            end: end.into(),
            escape,
            case_sensitive,
        })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    fn sequences_eq(&self, text: &str, seq: &str) -> bool {
        if self.case_sensitive {
            text.starts_with(seq)
        } else {
            text.len() >= seq.len()
                && text.get(..seq.len()).is_some_and(|t| t.eq_ignore_ascii_case(seq))
        }
    }

    /// Try to recognize a region token at `at`, returning the exclusive
    /// end offset.
    pub fn matches(&self, line: &str, at: usize) -> Option<usize> {
        let rest = &line[at..];
        if rest.len() < self.start.len() + self.end.len() || !self.sequences_eq(rest, &self.start) {
            return None;
        }
        if self.end.is_empty() {
            return Some(line.len());
        }
        let body = &line[at + self.start.len()..];
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            if self.escape == Some(c) {
                chars.next();
            } else if self.sequences_eq(&body[i..], &self.end) {
                return Some(at + self.start.len() + i + self.end.len());
            }
        }
        Some(line.len())
    }
}

/// A rule recognizing numeric literals using the ECMAScript 3 grammar for
/// decimal and hexadecimal literals (octal literals are not recognized).
#[derive(Debug, Clone, Copy)]
pub struct NumberTokenRule {
    id: TokenId,
}

impl NumberTokenRule {
    pub fn new(id: TokenId) -> Result<Self, RuleError> {
        check_token_id(id)?;
        Ok(Self { id })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Try to recognize a numeric literal at `at`.
    ///
    /// The character before the offset must not be a hexadecimal digit and
    /// the character after the literal must not be a digit or an identifier
    /// start, so that `f00d` or `x1.5` never yield a number in the middle.
    pub fn matches(&self, line: &str, at: usize, syntax: &dyn IdentifierSyntax) -> Option<usize> {
        let bytes = line.as_bytes();
        if at > 0 {
            let prev = line[..at].chars().next_back()?;
            if prev.is_ascii_hexdigit() {
                return None;
            }
        }
        let rest = &bytes[at..];
        let mut e;
        if rest.len() > 2 && rest[0] == b'0' && (rest[1] == b'x' || rest[1] == b'X') {
            // HexIntegerLiteral ::= /0[xX][0-9A-Fa-f]+/
            e = 2;
            while e < rest.len() && rest[e].is_ascii_hexdigit() {
                e += 1;
            }
            if e == 2 {
                return None;
            }
        } else {
            // DecimalLiteral ::= /(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?/
            //                  | /\.[0-9]+([eE][+-]?[0-9]+)?/
            let mut found_integer = false;
            let mut found_dot = false;
            e = 0;
            if !rest.is_empty() && rest[0].is_ascii_digit() {
                found_integer = true;
                e = 1;
                if rest[0] != b'0' {
                    while e < rest.len() && rest[e].is_ascii_digit() {
                        e += 1;
                    }
                }
            }
            if e < rest.len() && rest[e] == b'.' {
                found_dot = true;
                e += 1;
                let digits_start = e;
                while e < rest.len() && rest[e].is_ascii_digit() {
                    e += 1;
                }
                if e == digits_start {
                    return None;
                }
            }
            if !found_integer && !found_dot {
                return None;
            }
            if e < rest.len() && (rest[e] == b'e' || rest[e] == b'E') {
                e += 1;
                if e == rest.len() {
                    return None;
                }
                if rest[e] == b'+' || rest[e] == b'-' {
                    e += 1;
                    if e == rest.len() {
                        return None;
                    }
                }
                let digits_start = e;
                while e < rest.len() && rest[e].is_ascii_digit() {
                    e += 1;
                }
                if e == digits_start {
                    return None;
                }
            }
        }
        // reject when a digit or identifier-start character follows
        if let Some(next) = line[at + e..].chars().next() {
            if next.is_ascii_digit() || syntax.is_word_start(next) {
                return None;
            }
        }
        Some(at + e)
    }
}

/// A rule delegating to a compiled regular expression with looking-at
/// semantics: the match must begin exactly at the scan offset.
///
/// The compiled program is reference counted, so cloning the rule shares
/// it instead of recompiling.
#[derive(Debug, Clone)]
pub struct RegexTokenRule {
    id: TokenId,
    pattern: Arc<Regex>,
}

impl RegexTokenRule {
    pub fn new(id: TokenId, pattern: &str) -> Result<Self, RuleError> {
        check_token_id(id)?;
        Ok(Self {
            id,
            pattern: Arc::new(Regex::new(pattern)?),
        })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn matches(&self, line: &str, at: usize) -> Option<usize> {
        let m = self.pattern.find_at(line, at)?;
        if m.start() == at && m.end() > at {
            Some(m.end())
        } else {
            None
        }
    }
}

/// A rule recognizing URIs via a [`URIDetector`] anchored at the offset.
#[derive(Debug, Clone)]
pub struct UriTokenRule {
    id: TokenId,
    detector: Arc<URIDetector>,
}

impl UriTokenRule {
    pub fn new(id: TokenId, detector: Arc<URIDetector>) -> Result<Self, RuleError> {
        check_token_id(id)?;
        Ok(Self { id, detector })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn matches(&self, line: &str, at: usize) -> Option<usize> {
        self.detector.detect(&line[at..]).map(|len| at + len)
    }
}

/// A rule classifying pre-segmented words against a fixed word set.
///
/// Unlike the other rules this one does not consume text itself; the
/// scanner segments a word using the identifier syntax and asks each word
/// rule whether that exact word is its token.
#[derive(Debug, Clone)]
pub struct WordTokenRule {
    id: TokenId,
    words: HashTable,
}

impl WordTokenRule {
    pub fn from_words<I, S>(id: TokenId, words: I, case_sensitive: bool) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_token_id(id)?;
        Ok(Self {
            id,
            words: HashTable::from_words(words, case_sensitive)?,
        })
    }

    /// Build from a single separator-delimited string, e.g. `"if|else"`.
    pub fn from_separated(
        id: TokenId,
        words: &str,
        separator: char,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        check_token_id(id)?;
        Ok(Self {
            id,
            words: HashTable::from_separated(words, separator, case_sensitive)?,
        })
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn matches(&self, word: &str) -> bool {
        self.words.matches(word)
    }
}

/// The closed set of token rule kinds the scanner can apply.
///
/// Word rules are deliberately not a variant here; they operate on
/// pre-segmented words and are registered with the scanner separately.
#[derive(Debug, Clone)]
pub enum TokenRule {
    Region(RegionTokenRule),
    Number(NumberTokenRule),
    Regex(RegexTokenRule),
    Uri(UriTokenRule),
}

impl TokenRule {
    pub fn id(&self) -> TokenId {
        match self {
            TokenRule::Region(r) => r.id(),
            TokenRule::Number(r) => r.id(),
            TokenRule::Regex(r) => r.id(),
            TokenRule::Uri(r) => r.id(),
        }
    }

    /// Try to recognize a token at `at`, returning the exclusive end
    /// offset of the recognized text.
    pub fn matches(
        &self,
        line: &str,
        at: usize,
        syntax: &dyn IdentifierSyntax,
    ) -> Option<usize> {
        match self {
            TokenRule::Region(r) => r.matches(line, at),
            TokenRule::Number(r) => r.matches(line, at, syntax),
            TokenRule::Regex(r) => r.matches(line, at),
            TokenRule::Uri(r) => r.matches(line, at),
        }
    }
}

impl From<RegionTokenRule> for TokenRule {
    fn from(r: RegionTokenRule) -> Self {
        TokenRule::Region(r)
    }
}

impl From<NumberTokenRule> for TokenRule {
    fn from(r: NumberTokenRule) -> Self {
        TokenRule::Number(r)
    }
}

impl From<RegexTokenRule> for TokenRule {
    fn from(r: RegexTokenRule) -> Self {
        TokenRule::Regex(r)
    }
}

impl From<UriTokenRule> for TokenRule {
    fn from(r: UriTokenRule) -> Self {
        TokenRule::Uri(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::UNCALCULATED;
    use crate::syntax::DefaultIdentifierSyntax;
    use assert_matches::assert_matches;

    const SYNTAX: DefaultIdentifierSyntax = DefaultIdentifierSyntax;

    #[test]
    fn test_reserved_id_rejected() {
        assert_matches!(
            NumberTokenRule::new(UNCALCULATED),
            Err(RuleError::ReservedTokenId(_))
        );
        assert_matches!(
            RegionTokenRule::new(UNCALCULATED, "\"", "\"", None, true),
            Err(RuleError::ReservedTokenId(_))
        );
    }

    #[test]
    fn test_region_empty_start_rejected() {
        assert_matches!(
            RegionTokenRule::new(1, "", "*/", None, true),
            Err(RuleError::EmptyStartSequence)
        );
    }

    #[test]
    fn test_region_simple_quotes() {
        let rule = RegionTokenRule::new(2, "\"", "\"", None, true).unwrap();
        let line = "x\"abc\"y";
        assert_eq!(rule.matches(line, 1), Some(6));
        assert_eq!(rule.matches(line, 0), None);
    }

    #[test]
    fn test_region_escape_protects_end() {
        let rule = RegionTokenRule::new(2, "\"", "\"", Some('\\'), true).unwrap();
        // the escaped quote after b must not close the region
        let line = r#"a"b\"c"d"#;
        assert_eq!(rule.matches(line, 1), Some(7));
        assert_eq!(&line[1..7], r#""b\"c""#);
    }

    #[test]
    fn test_region_unterminated_runs_to_line_end() {
        let rule = RegionTokenRule::new(3, "/*", "*/", None, true).unwrap();
        let line = "a/*b c";
        assert_eq!(rule.matches(line, 1), Some(line.len()));
    }

    #[test]
    fn test_region_caseless() {
        let rule = RegionTokenRule::new(4, "<b>", "</b>", None, false).unwrap();
        assert_eq!(rule.matches("<B>x</B>!", 0), Some(8));
    }

    #[test]
    fn test_number_decimal_forms() {
        let rule = NumberTokenRule::new(5).unwrap();
        assert_eq!(rule.matches("42 ", 0, &SYNTAX), Some(2));
        assert_eq!(rule.matches("3.14;", 0, &SYNTAX), Some(4));
        assert_eq!(rule.matches(".5+", 0, &SYNTAX), Some(2));
        assert_eq!(rule.matches("1e10,", 0, &SYNTAX), Some(4));
        assert_eq!(rule.matches("2E-3 ", 0, &SYNTAX), Some(4));
    }

    #[test]
    fn test_number_hex() {
        let rule = NumberTokenRule::new(5).unwrap();
        assert_eq!(rule.matches("0xFF)", 0, &SYNTAX), Some(4));
        // "0x" with no digits is not a hex literal
        assert_eq!(rule.matches("0x ", 0, &SYNTAX), None);
    }

    #[test]
    fn test_number_rejects_adjacent_identifier() {
        let rule = NumberTokenRule::new(5).unwrap();
        // preceded by a hex digit character
        assert_eq!(rule.matches("f1", 1, &SYNTAX), None);
        // followed by an identifier start
        assert_eq!(rule.matches("1x", 0, &SYNTAX), None);
        // a dot alone is not a number
        assert_eq!(rule.matches(". ", 0, &SYNTAX), None);
        // truncated exponent
        assert_eq!(rule.matches("1e", 0, &SYNTAX), None);
    }

    #[test]
    fn test_regex_anchored_at_offset() {
        let rule = RegexTokenRule::new(6, "[0-9]+").unwrap();
        assert_eq!(rule.matches("ab123", 2), Some(5));
        assert_eq!(rule.matches("ab123", 0), None);
    }

    #[test]
    fn test_regex_invalid_pattern_is_error() {
        assert_matches!(
            RegexTokenRule::new(6, "(unclosed"),
            Err(RuleError::InvalidPattern(_))
        );
    }

    #[test]
    fn test_uri_rule() {
        let rule = UriTokenRule::new(7, URIDetector::default_generic()).unwrap();
        let line = "see http://example.com/x here";
        assert_eq!(rule.matches(line, 4), Some(line.len() - 5));
        assert_eq!(rule.matches(line, 0), None);
    }

    #[test]
    fn test_word_rule() {
        let rule = WordTokenRule::from_separated(8, "if|else|while", '|', true).unwrap();
        assert!(rule.matches("if"));
        assert!(!rule.matches("ifx"));
        assert!(!rule.matches("IF"));
    }
}
