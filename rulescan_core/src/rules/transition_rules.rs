//! Transition rules
//!
//! A transition rule watches one content type and recognizes the sequence
//! that hands the scan over to another content type. `matches` reports the
//! length of the recognized sequence, with 0 meaning no transition here.

use crate::partition::ContentType;
use crate::rules::RuleError;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// A transition introduced by a fixed character sequence.
///
/// Two special behaviors:
/// - an empty pattern matches the end of the line and reports length 1, so
///   a line break itself can close a partition (e.g. a `//` comment);
/// - when an escape character is set and the character just before the
///   offset is that character, the pattern is suppressed.
#[derive(Debug, Clone)]
pub struct LiteralTransitionRule {
    content_type: ContentType,
    destination: ContentType,
    pattern: String,
    escape: Option<char>,
    case_sensitive: bool,
}

impl LiteralTransitionRule {
    pub fn new(
        content_type: ContentType,
        destination: ContentType,
        pattern: impl Into<String>,
        escape: Option<char>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            content_type,
            destination,
            pattern: pattern.into(),
            escape,
            case_sensitive,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn destination(&self) -> ContentType {
        self.destination
    }

    /// Length of the transition sequence found at `at`, or 0.
    pub fn matches(&self, line: &str, at: usize) -> usize {
        if let Some(escape) = self.escape {
            if at > 0 && line[..at].ends_with(escape) {
                return 0;
            }
        }
        if self.pattern.is_empty() {
            return if at == line.len() { 1 } else { 0 };
        }
        let rest = &line[at..];
        if rest.len() < self.pattern.len() {
            return 0;
        }
        let head = &rest[..self.pattern.len()];
        let hit = if self.case_sensitive {
            head == self.pattern
        } else {
            head.eq_ignore_ascii_case(&self.pattern)
        };
        if hit {
            self.pattern.len()
        } else {
            0
        }
    }
}

/// A transition introduced by a regular expression with looking-at
/// semantics: the match must begin exactly at the scan offset.
///
/// The compiled program is shared between clones; each scan drives its own
/// cursor over it, so concurrent scanners never contend on matcher state.
/// A zero-width match still reports length 1 so the scan always advances.
#[derive(Debug, Clone)]
pub struct RegexTransitionRule {
    content_type: ContentType,
    destination: ContentType,
    pattern: Arc<Regex>,
}

impl RegexTransitionRule {
    pub fn new(
        content_type: ContentType,
        destination: ContentType,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self {
            content_type,
            destination,
            pattern: Arc::new(pattern),
        })
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn destination(&self) -> ContentType {
        self.destination
    }

    /// Length of the transition sequence found at `at`, or 0.
    pub fn matches(&self, line: &str, at: usize) -> usize {
        match self.pattern.find_at(line, at) {
            Some(m) if m.start() == at => (m.end() - m.start()).max(1),
            _ => 0,
        }
    }
}

/// The closed set of transition rule kinds.
#[derive(Debug, Clone)]
pub enum TransitionRule {
    Literal(LiteralTransitionRule),
    Regex(RegexTransitionRule),
}

impl TransitionRule {
    /// The content type this rule transitions away from.
    pub fn content_type(&self) -> ContentType {
        match self {
            TransitionRule::Literal(r) => r.content_type(),
            TransitionRule::Regex(r) => r.content_type(),
        }
    }

    /// The content type this rule transitions into.
    pub fn destination(&self) -> ContentType {
        match self {
            TransitionRule::Literal(r) => r.destination(),
            TransitionRule::Regex(r) => r.destination(),
        }
    }

    /// Length of the transition sequence found at `at`, or 0.
    pub fn matches(&self, line: &str, at: usize) -> usize {
        match self {
            TransitionRule::Literal(r) => r.matches(line, at),
            TransitionRule::Regex(r) => r.matches(line, at),
        }
    }
}

impl From<LiteralTransitionRule> for TransitionRule {
    fn from(r: LiteralTransitionRule) -> Self {
        TransitionRule::Literal(r)
    }
}

impl From<RegexTransitionRule> for TransitionRule {
    fn from(r: RegexTransitionRule) -> Self {
        TransitionRule::Regex(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: ContentType = ContentType::DEFAULT;

    fn dest() -> ContentType {
        ContentType::from_u32(9)
    }

    #[test]
    fn test_literal_match() {
        let rule = LiteralTransitionRule::new(SRC, dest(), "/*", None, true);
        assert_eq!(rule.matches("a/*b", 1), 2);
        assert_eq!(rule.matches("a/*b", 0), 0);
        assert_eq!(rule.matches("a/", 1), 0);
    }

    #[test]
    fn test_literal_caseless() {
        let rule = LiteralTransitionRule::new(SRC, dest(), "<script>", None, false);
        assert_eq!(rule.matches("<SCRIPT>x", 0), 8);
    }

    #[test]
    fn test_literal_escape_suppresses() {
        let rule = LiteralTransitionRule::new(SRC, dest(), "\"", Some('\\'), true);
        assert_eq!(rule.matches("a\"", 1), 1);
        assert_eq!(rule.matches("\\\"", 1), 0);
    }

    #[test]
    fn test_empty_pattern_matches_end_of_line() {
        let rule = LiteralTransitionRule::new(SRC, dest(), "", None, true);
        assert_eq!(rule.matches("abc", 3), 1);
        assert_eq!(rule.matches("abc", 2), 0);
    }

    #[test]
    fn test_regex_looking_at() {
        let rule = RegexTransitionRule::new(SRC, dest(), "=+", true).unwrap();
        assert_eq!(rule.matches("a===b", 1), 3);
        assert_eq!(rule.matches("a===b", 0), 0);
    }

    #[test]
    fn test_regex_zero_width_reports_one() {
        let rule = RegexTransitionRule::new(SRC, dest(), "x?", true).unwrap();
        assert_eq!(rule.matches("abc", 1), 1);
    }

    #[test]
    fn test_regex_caseless() {
        let rule = RegexTransitionRule::new(SRC, dest(), "end", false).unwrap();
        assert_eq!(rule.matches("END", 0), 3);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(RegexTransitionRule::new(SRC, dest(), "(", true).is_err());
    }
}
