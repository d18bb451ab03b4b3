//! Rule construction errors
//!
//! Construction failures are caller bugs and surface immediately; a rule
//! that constructed successfully never fails later. Absence of a match at
//! scan time is not an error at all.

/// Errors raised while building a rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("token identifier {0:#06x} is reserved")]
    ReservedTokenId(crate::rules::TokenId),

    #[error("the start sequence is empty")]
    EmptyStartSequence,

    #[error("the word set contains no words")]
    EmptyWordSet,

    #[error("invalid URI scheme name: '{0}'")]
    InvalidScheme(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl RuleError {
    /// The log code describing this error.
    pub fn code(&self) -> crate::logging::Code {
        use crate::logging::codes;
        match self {
            RuleError::ReservedTokenId(_) => codes::RULE_RESERVED_ID,
            RuleError::EmptyStartSequence => codes::RULE_EMPTY_START,
            RuleError::EmptyWordSet => codes::RULE_EMPTY_WORDS,
            RuleError::InvalidScheme(_) => codes::RULE_BAD_SCHEME,
            RuleError::InvalidPattern(_) => codes::RULE_BAD_PATTERN,
        }
    }
}

/// Reject the reserved token identifier at construction time.
pub(crate) fn check_token_id(id: crate::rules::TokenId) -> Result<(), RuleError> {
    if id == crate::rules::UNCALCULATED {
        Err(RuleError::ReservedTokenId(id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_to_code_mapping() {
        assert_eq!(RuleError::ReservedTokenId(0xFFFF).code().as_str(), "E001");
        assert_eq!(RuleError::EmptyStartSequence.code().as_str(), "E002");
        assert_eq!(RuleError::EmptyWordSet.code().as_str(), "E003");
        assert_eq!(
            RuleError::InvalidScheme("9x".into()).code().as_str(),
            "E004"
        );
    }
}
