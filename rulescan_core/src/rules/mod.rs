//! Rule-based text scanning
//!
//! This module holds the pattern rules the scanner is programmed with:
//! token rules classify text inside one partition, transition rules detect
//! the boundaries where the partition's content type changes.

pub mod error;
pub mod hash_table;
pub mod token;
pub mod token_rules;
pub mod transition_rules;
pub mod uri_detector;

pub use error::RuleError;
pub use hash_table::HashTable;
pub use token::{Token, TokenId, UNCALCULATED};
pub use token_rules::{
    NumberTokenRule, RegexTokenRule, RegionTokenRule, TokenRule, UriTokenRule, WordTokenRule,
};
pub use transition_rules::{LiteralTransitionRule, RegexTransitionRule, TransitionRule};
pub use uri_detector::URIDetector;
