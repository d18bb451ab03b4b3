//! Token scanners
//!
//! A token scanner walks one line-region of document text and emits the
//! tokens its rules recognize, in document order. Scanning is synchronous
//! and pure; the caller drives it one `next_token` call at a time.

use crate::logging::codes;
use crate::partition::ContentType;
use crate::rules::{Token, TokenRule, TransitionRule, WordTokenRule};
use crate::syntax::{eat_identifier, DefaultIdentifierSyntax, IdentifierSyntax};
use crate::utils::{Position, Region};
use crate::{log_debug, log_error};
use std::sync::Arc;

/// Errors raised by scanner operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScannerError {
    /// `next_token` was called before `parse`, or after the region was
    /// exhausted.
    #[error("the scanner has no parsed region to scan")]
    BadState,

    /// A rule registration arrived while a scan was in progress.
    #[error("rules cannot be added while a scan is in progress")]
    Running,

    /// The region handed to `parse` does not lie within the given line.
    #[error("the region {0} is outside the given line text")]
    RegionOutOfBounds(Region),
}

/// A partition boundary crossing observed during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ContentType,
    pub to: ContentType,
    /// The text that introduced the transition.
    pub region: Region,
}

/// Walks a line-region and yields classified tokens.
///
/// `parse` binds the scanner to a line and region and may be called again
/// at any time to restart on new text. `next_token` yields `Ok(Some(_))`
/// per recognized token, `Ok(None)` once when the region runs out, and
/// [`ScannerError::BadState`] on any call after that (or before `parse`).
pub trait TokenScanner {
    /// The identifier syntax used for word segmentation.
    fn identifier_syntax(&self) -> &dyn IdentifierSyntax;

    /// Current scan position.
    fn position(&self) -> Position;

    /// Whether the cursor has not yet reached the end of the region.
    fn has_next(&self) -> bool;

    /// Bind the scanner to one line of text and the region to scan.
    fn parse(&mut self, line: &str, region: Region) -> Result<(), ScannerError>;

    /// Scan forward to the next token.
    fn next_token(&mut self) -> Result<Option<Token>, ScannerError>;
}

/// A scanner with no rules at all; it recognizes nothing.
///
/// Useful as a placeholder where a scanner is structurally required but a
/// content type has no tokens of its own.
#[derive(Debug, Default)]
pub struct NullTokenScanner {
    syntax: DefaultIdentifierSyntax,
    position: Position,
    parsed: bool,
}

impl NullTokenScanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenScanner for NullTokenScanner {
    fn identifier_syntax(&self) -> &dyn IdentifierSyntax {
        &self.syntax
    }

    fn position(&self) -> Position {
        self.position
    }

    fn has_next(&self) -> bool {
        false
    }

    fn parse(&mut self, line: &str, region: Region) -> Result<(), ScannerError> {
        if !region.is_single_line() || region.end().offset > line.len() {
            return Err(ScannerError::RegionOutOfBounds(region));
        }
        self.position = region.end();
        self.parsed = true;
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<Token>, ScannerError> {
        if self.parsed {
            self.parsed = false;
            Ok(None)
        } else {
            Err(ScannerError::BadState)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unparsed,
    Ready,
    Exhausted,
}

/// Rule-programmed scanner for a single content type.
///
/// Rules are applied first-match-wins in registration order. At every
/// position transition rules run first, then token rules (only while the
/// active content type is the scanner's own), then word rules against a
/// segmented word; if nothing matches the cursor advances one character,
/// so a scan always terminates.
pub struct LexicalTokenScanner {
    content_type: ContentType,
    syntax: Arc<dyn IdentifierSyntax>,
    rules: Vec<TokenRule>,
    word_rules: Vec<WordTokenRule>,
    transition_rules: Vec<TransitionRule>,
    state: ScanState,
    line: String,
    region: Region,
    cursor: usize,
    active_type: ContentType,
    last_transition: Option<Transition>,
}

impl LexicalTokenScanner {
    /// Create a scanner for `content_type` with the default identifier
    /// syntax and no rules.
    pub fn new(content_type: ContentType) -> Self {
        Self::with_syntax(content_type, Arc::new(DefaultIdentifierSyntax))
    }

    /// Create a scanner with a caller-supplied identifier syntax.
    pub fn with_syntax(content_type: ContentType, syntax: Arc<dyn IdentifierSyntax>) -> Self {
        Self {
            content_type,
            syntax,
            rules: Vec::new(),
            word_rules: Vec::new(),
            transition_rules: Vec::new(),
            state: ScanState::Unparsed,
            line: String::new(),
            region: Region::on_line(0, 0, 0),
            cursor: 0,
            active_type: content_type,
            last_transition: None,
        }
    }

    /// The content type this scanner's token rules apply to.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn check_not_running(&self) -> Result<(), ScannerError> {
        if self.state == ScanState::Ready {
            log_error!(
                codes::SCAN_RUNNING,
                "rule registration rejected during scan",
                "content" => self.content_type
            );
            Err(ScannerError::Running)
        } else {
            Ok(())
        }
    }

    /// Register a token rule. Fails while a scan is in progress.
    pub fn add_rule(&mut self, rule: impl Into<TokenRule>) -> Result<&mut Self, ScannerError> {
        self.check_not_running()?;
        self.rules.push(rule.into());
        Ok(self)
    }

    /// Register a word rule. Fails while a scan is in progress.
    pub fn add_word_rule(&mut self, rule: WordTokenRule) -> Result<&mut Self, ScannerError> {
        self.check_not_running()?;
        self.word_rules.push(rule);
        Ok(self)
    }

    /// Register a transition rule. Fails while a scan is in progress.
    pub fn add_transition_rule(
        &mut self,
        rule: impl Into<TransitionRule>,
    ) -> Result<&mut Self, ScannerError> {
        self.check_not_running()?;
        self.transition_rules.push(rule.into());
        Ok(self)
    }

    /// The most recent partition boundary seen by the current or previous
    /// scan, if any.
    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    /// Advance the cursor past one whole character.
    fn advance_char(&mut self) {
        if let Some(c) = self.line[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        } else {
            self.cursor = self.region.end().offset;
        }
    }

    fn make_token(&self, id: crate::rules::TokenId, start: usize, end: usize) -> Token {
        Token::new(id, Region::on_line(self.region.start().line, start, end))
    }
}

impl TokenScanner for LexicalTokenScanner {
    fn identifier_syntax(&self) -> &dyn IdentifierSyntax {
        self.syntax.as_ref()
    }

    fn position(&self) -> Position {
        Position::new(self.region.start().line, self.cursor)
    }

    fn has_next(&self) -> bool {
        self.state == ScanState::Ready && self.cursor < self.region.end().offset
    }

    fn parse(&mut self, line: &str, region: Region) -> Result<(), ScannerError> {
        if !region.is_single_line()
            || region.end().offset > line.len()
            || !line.is_char_boundary(region.start().offset)
            || !line.is_char_boundary(region.end().offset)
        {
            log_error!(
                codes::SCAN_BAD_REGION,
                "scan region rejected",
                region = region,
                "line_len" => line.len()
            );
            return Err(ScannerError::RegionOutOfBounds(region));
        }
        self.line.clear();
        self.line.push_str(line);
        self.region = region;
        self.cursor = region.start().offset;
        self.active_type = self.content_type;
        self.last_transition = None;
        self.state = ScanState::Ready;
        log_debug!(
            "scan started",
            "content" => self.content_type,
            "region" => region
        );
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<Token>, ScannerError> {
        if self.state != ScanState::Ready {
            log_error!(codes::SCAN_BAD_STATE, "next_token without a scannable region");
            return Err(ScannerError::BadState);
        }
        let end = self.region.end().offset;
        'scan: while self.cursor < end {
            // insignificant whitespace between tokens
            while let Some(c) = self.line[self.cursor..end].chars().next() {
                if self.syntax.is_whitespace(c) {
                    self.cursor += c.len_utf8();
                } else {
                    break;
                }
            }
            if self.cursor >= end {
                break;
            }

            // partition boundaries take precedence over tokens
            for rule in &self.transition_rules {
                if rule.content_type() != self.active_type {
                    continue;
                }
                let len = rule.matches(&self.line, self.cursor);
                if len > 0 {
                    let to = if rule.destination() == ContentType::PARENT {
                        self.content_type
                    } else {
                        rule.destination()
                    };
                    let start = self.cursor;
                    self.cursor = (self.cursor + len).min(end);
                    self.last_transition = Some(Transition {
                        from: self.active_type,
                        to,
                        region: Region::on_line(self.region.start().line, start, self.cursor),
                    });
                    self.active_type = to;
                    continue 'scan;
                }
            }

            // token rules classify text of this scanner's own content type
            if self.active_type == self.content_type {
                for i in 0..self.rules.len() {
                    if let Some(token_end) =
                        self.rules[i].matches(&self.line, self.cursor, self.syntax.as_ref())
                    {
                        let token_end = token_end.min(end);
                        let token = self.make_token(self.rules[i].id(), self.cursor, token_end);
                        self.cursor = token_end;
                        return Ok(Some(token));
                    }
                }

                let word_end = eat_identifier(&self.line[..end], self.cursor, self.syntax.as_ref());
                if word_end > self.cursor {
                    let word = &self.line[self.cursor..word_end];
                    for rule in &self.word_rules {
                        if rule.matches(word) {
                            let token = self.make_token(rule.id(), self.cursor, word_end);
                            self.cursor = word_end;
                            return Ok(Some(token));
                        }
                    }
                    // an unclassified word is skipped whole
                    self.cursor = word_end;
                    continue;
                }
            }

            // nothing recognized here; skip one character and keep going
            self.advance_char();
        }
        self.state = ScanState::Exhausted;
        log_debug!("scan exhausted", "content" => self.content_type, "at" => self.cursor);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{
        LiteralTransitionRule, NumberTokenRule, RegexTokenRule, RegionTokenRule, WordTokenRule,
    };
    use assert_matches::assert_matches;

    const ID_NUMBER: crate::rules::TokenId = 1;
    const ID_KEYWORD: crate::rules::TokenId = 2;
    const ID_STRING: crate::rules::TokenId = 3;

    fn line_region(line: &str) -> Region {
        Region::on_line(0, 0, line.len())
    }

    fn scanner_with_rules() -> LexicalTokenScanner {
        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        scanner
            .add_rule(NumberTokenRule::new(ID_NUMBER).unwrap())
            .unwrap()
            .add_rule(RegionTokenRule::new(ID_STRING, "\"", "\"", Some('\\'), true).unwrap())
            .unwrap()
            .add_word_rule(WordTokenRule::from_separated(ID_KEYWORD, "if|else", '|', true).unwrap())
            .unwrap();
        scanner
    }

    fn collect(scanner: &mut LexicalTokenScanner, line: &str) -> Vec<Token> {
        scanner.parse(line, line_region(line)).unwrap();
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_next_token_before_parse_is_error() {
        let mut scanner = scanner_with_rules();
        assert_matches!(scanner.next_token(), Err(ScannerError::BadState));
    }

    #[test]
    fn test_next_token_after_exhaustion_is_error() {
        let mut scanner = scanner_with_rules();
        let line = "1";
        scanner.parse(line, line_region(line)).unwrap();
        assert!(scanner.next_token().unwrap().is_some());
        assert_eq!(scanner.next_token().unwrap(), None);
        assert_matches!(scanner.next_token(), Err(ScannerError::BadState));
    }

    #[test]
    fn test_tokens_in_document_order() {
        let mut scanner = scanner_with_rules();
        let tokens = collect(&mut scanner, "if x 42 \"s\" else");
        let ids: Vec<_> = tokens.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![ID_KEYWORD, ID_NUMBER, ID_STRING, ID_KEYWORD]);
        assert_eq!(tokens[1].region, Region::on_line(0, 5, 7));
        assert_eq!(tokens[2].region, Region::on_line(0, 8, 11));
    }

    #[test]
    fn test_unclassified_words_are_skipped_whole() {
        let mut scanner = scanner_with_rules();
        // "iffy" must not be split into "if" + "fy"
        let tokens = collect(&mut scanner, "iffy if");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].region, Region::on_line(0, 5, 7));
    }

    #[test]
    fn test_progress_on_unmatched_characters() {
        let mut scanner = scanner_with_rules();
        let tokens = collect(&mut scanner, "+-*/ 7");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].id, ID_NUMBER);
    }

    #[test]
    fn test_empty_region_yields_nothing() {
        let mut scanner = scanner_with_rules();
        scanner.parse("abc", Region::on_line(0, 1, 1)).unwrap();
        assert!(!scanner.has_next());
        assert_eq!(scanner.next_token().unwrap(), None);
    }

    #[test]
    fn test_region_out_of_bounds() {
        let mut scanner = scanner_with_rules();
        assert_matches!(
            scanner.parse("ab", Region::on_line(0, 0, 5)),
            Err(ScannerError::RegionOutOfBounds(_))
        );
    }

    #[test]
    fn test_reparse_resets_the_scan() {
        let mut scanner = scanner_with_rules();
        assert_eq!(collect(&mut scanner, "1 2").len(), 2);
        assert_eq!(collect(&mut scanner, "3").len(), 1);
    }

    #[test]
    fn test_add_rule_while_running_is_error() {
        let mut scanner = scanner_with_rules();
        scanner.parse("1 2", line_region("1 2")).unwrap();
        assert!(scanner.next_token().unwrap().is_some());
        assert_matches!(
            scanner.add_rule(NumberTokenRule::new(9).unwrap()).err(),
            Some(ScannerError::Running)
        );
        // after exhaustion registration works again
        while scanner.next_token().unwrap().is_some() {}
        assert!(scanner.add_rule(NumberTokenRule::new(9).unwrap()).is_ok());
    }

    #[test]
    fn test_literal_transition_suspends_token_rules() {
        let comment = ContentType::from_u32(5);
        let mut scanner = scanner_with_rules();
        scanner
            .add_transition_rule(LiteralTransitionRule::new(
                ContentType::DEFAULT,
                comment,
                "/*",
                None,
                true,
            ))
            .unwrap()
            .add_transition_rule(LiteralTransitionRule::new(
                comment,
                ContentType::PARENT,
                "*/",
                None,
                true,
            ))
            .unwrap();

        let line = "1 /* 2 */ 3";
        let tokens = collect(&mut scanner, line);
        // the 2 inside the comment partition is not tokenized
        let ids: Vec<_> = tokens.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![ID_NUMBER, ID_NUMBER]);
        assert_eq!(tokens[1].region, Region::on_line(0, 10, 11));
        let transition = scanner.last_transition().unwrap();
        assert_eq!(transition.from, comment);
        assert_eq!(transition.to, ContentType::DEFAULT);
        assert_eq!(transition.region, Region::on_line(0, 7, 9));
    }

    #[test]
    fn test_first_match_wins_over_registration_order() {
        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        scanner
            .add_rule(RegexTokenRule::new(10, "[a-z]+").unwrap())
            .unwrap()
            .add_rule(RegexTokenRule::new(11, "[a-z0-9]+").unwrap())
            .unwrap();
        let line = "abc9";
        scanner.parse(line, line_region(line)).unwrap();
        // the first registered rule wins even though the second would
        // match a longer span
        let token = scanner.next_token().unwrap().unwrap();
        assert_eq!(token.id, 10);
        assert_eq!(token.region, Region::on_line(0, 0, 3));
    }

    #[test]
    fn test_token_clamped_to_region_end() {
        let mut scanner = scanner_with_rules();
        // the unterminated string would run to the line end, but the scan
        // covers only a leading sub-region
        let line = "a \"bc def";
        scanner.parse(line, Region::on_line(0, 0, 6)).unwrap();
        let token = scanner.next_token().unwrap().unwrap();
        assert_eq!(token.id, ID_STRING);
        assert_eq!(token.region, Region::on_line(0, 2, 6));
        assert_eq!(scanner.next_token().unwrap(), None);
    }

    #[test]
    fn test_scan_lifecycle_is_logged() {
        use crate::logging::{self, LogLevel, LoggingService, MemoryLogger};

        let memory = Arc::new(MemoryLogger::new());
        logging::init_global_logging_with(Arc::new(LoggingService::new(
            memory.clone(),
            LogLevel::Debug,
        )))
        .unwrap();

        let mut scanner = scanner_with_rules();
        assert_matches!(scanner.next_token(), Err(ScannerError::BadState));
        let line = "1";
        scanner.parse(line, line_region(line)).unwrap();
        while scanner.next_token().unwrap().is_some() {}

        let events = memory.events();
        let codes: Vec<&str> = events.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"E010"));
        assert!(events.iter().any(|e| e.message == "scan started"));
        assert!(events.iter().any(|e| e.message == "scan exhausted"));
    }

    #[test]
    fn test_null_scanner() {
        let mut scanner = NullTokenScanner::new();
        assert_matches!(scanner.next_token(), Err(ScannerError::BadState));
        scanner.parse("abc", Region::on_line(0, 0, 3)).unwrap();
        assert!(!scanner.has_next());
        assert_eq!(scanner.next_token().unwrap(), None);
        assert_matches!(scanner.next_token(), Err(ScannerError::BadState));
    }
}
