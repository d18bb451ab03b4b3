//! Token value type

use crate::utils::Region;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a token kind, chosen by the caller when building rules.
pub type TokenId = u16;

/// Reserved "not yet computed" identifier. No rule may be constructed with
/// it and no scanner ever emits it.
pub const UNCALCULATED: TokenId = 0xFFFF;

/// A classified, positioned text unit emitted by a token rule.
///
/// Tokens are transient values: one is produced per `next_token` call and
/// owned by the caller. Scanning a document can produce thousands, so the
/// type stays plain and copyable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The identifier of the rule that recognized this token
    pub id: TokenId,
    /// The text region the token covers
    pub region: Region,
}

impl Token {
    /// Create a new token.
    pub fn new(id: TokenId, region: Region) -> Self {
        Self { id, region }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}@{}", self.id, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Region;

    #[test]
    fn test_token_equality() {
        let a = Token::new(3, Region::on_line(0, 1, 4));
        let b = Token::new(3, Region::on_line(0, 1, 4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_display() {
        let t = Token::new(7, Region::on_line(2, 0, 5));
        assert_eq!(t.to_string(), "token#7@2:0-5");
    }
}
