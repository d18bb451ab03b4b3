//! Interned word set for word and scheme matching

use crate::rules::RuleError;
use std::collections::HashSet;

/// Read-only set of interned words built once at rule construction.
///
/// Case-insensitive tables fold words when they are inserted and fold the
/// probe at lookup, so membership tests stay O(word length). The longest
/// stored word is remembered as an early-out for oversized probes.
#[derive(Debug, Clone)]
pub struct HashTable {
    words: HashSet<String>,
    max_length: usize,
    case_sensitive: bool,
}

impl HashTable {
    /// Build a table from a sequence of words.
    pub fn from_words<I, S>(words: I, case_sensitive: bool) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        let mut max_length = 0;
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            let folded = if case_sensitive {
                word.to_string()
            } else {
                fold(word)
            };
            max_length = max_length.max(folded.len());
            set.insert(folded);
        }
        if set.is_empty() {
            return Err(RuleError::EmptyWordSet);
        }
        Ok(Self {
            words: set,
            max_length,
            case_sensitive,
        })
    }

    /// Build a table from a single separator-delimited string, e.g.
    /// `"if|else|while"` with separator `'|'`. Empty segments are skipped.
    pub fn from_separated(
        words: &str,
        separator: char,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        Self::from_words(words.split(separator), case_sensitive)
    }

    /// Membership test for an exact word.
    pub fn matches(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        if self.case_sensitive {
            word.len() <= self.max_length && self.words.contains(word)
        } else {
            let folded = fold(word);
            folded.len() <= self.max_length && self.words.contains(&folded)
        }
    }

    /// Length in bytes of the longest stored word.
    pub fn maximum_length(&self) -> usize {
        self.max_length
    }
}

/// Simple case folding used for caseless tables.
fn fold(s: &str) -> String {
    s.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_case_sensitive_membership() {
        let table = HashTable::from_words(["if", "else"], true).unwrap();
        assert!(table.matches("if"));
        assert!(!table.matches("IF"));
        assert!(!table.matches("elif"));
    }

    #[test]
    fn test_case_insensitive_membership() {
        let table = HashTable::from_words(["if", "else"], false).unwrap();
        assert!(table.matches("IF"));
        assert!(table.matches("Else"));
        assert!(!table.matches("then"));
    }

    #[test]
    fn test_from_separated() {
        let table = HashTable::from_separated("aaa|bbb||ccc", '|', true).unwrap();
        assert!(table.matches("aaa"));
        assert!(table.matches("ccc"));
        assert!(!table.matches(""));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert_matches!(
            HashTable::from_words(Vec::<&str>::new(), true),
            Err(RuleError::EmptyWordSet)
        );
        assert_matches!(
            HashTable::from_separated("|||", '|', true),
            Err(RuleError::EmptyWordSet)
        );
    }

    #[test]
    fn test_maximum_length() {
        let table = HashTable::from_words(["a", "abcd"], true).unwrap();
        assert_eq!(table.maximum_length(), 4);
    }
}
