//! Identifier syntax interface
//!
//! The engine does not know what counts as a word or a digit in any given
//! language; an [`IdentifierSyntax`] supplies those predicates. Number rules
//! and word segmentation consume this interface, nothing in the engine
//! defines it beyond the plain default below.

/// Character classification predicates supplied by the caller.
pub trait IdentifierSyntax: Send + Sync {
    /// True if `ch` can start an identifier/word.
    fn is_word_start(&self, ch: char) -> bool;

    /// True if `ch` can continue an identifier/word.
    fn is_word_continue(&self, ch: char) -> bool;

    /// True if `ch` is a numeric digit.
    fn is_digit(&self, ch: char) -> bool;

    /// True if `ch` is insignificant whitespace between tokens.
    fn is_whitespace(&self, ch: char) -> bool;
}

/// Unicode alphanumerics plus `_`, ASCII digits, Unicode whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdentifierSyntax;

impl IdentifierSyntax for DefaultIdentifierSyntax {
    fn is_word_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_word_continue(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    fn is_digit(&self, ch: char) -> bool {
        ch.is_ascii_digit()
    }

    fn is_whitespace(&self, ch: char) -> bool {
        ch.is_whitespace()
    }
}

/// Segment the maximal word starting at byte offset `at` of `line`.
///
/// Returns the end offset (exclusive) of the word, or `at` itself when no
/// word starts there.
pub fn eat_identifier(line: &str, at: usize, syntax: &dyn IdentifierSyntax) -> usize {
    let mut chars = line[at..].char_indices();
    match chars.next() {
        Some((_, ch)) if syntax.is_word_start(ch) => {}
        _ => return at,
    }
    for (i, ch) in chars {
        if !syntax.is_word_continue(ch) {
            return at + i;
        }
    }
    line.len()
}
