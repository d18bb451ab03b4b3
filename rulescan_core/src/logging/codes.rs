//! Event codes for scanner diagnostics
//!
//! Single source of truth for the codes attached to log events. Codes are
//! stable identifiers for tooling; the human-readable text lives on the
//! event message.

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CODES
// ============================================================================

/// A rule was built with the reserved token identifier
pub const RULE_RESERVED_ID: Code = Code::new("E001");
/// A region rule was built with an empty start sequence
pub const RULE_EMPTY_START: Code = Code::new("E002");
/// A word rule or scheme set was built with no words
pub const RULE_EMPTY_WORDS: Code = Code::new("E003");
/// A URI detector was given a malformed scheme name
pub const RULE_BAD_SCHEME: Code = Code::new("E004");
/// A regex rule was built from an invalid pattern
pub const RULE_BAD_PATTERN: Code = Code::new("E005");

/// The scanner was driven outside its state contract
pub const SCAN_BAD_STATE: Code = Code::new("E010");
/// A rule registration arrived mid-scan
pub const SCAN_RUNNING: Code = Code::new("E011");
/// A scan region fell outside the line it was paired with
pub const SCAN_BAD_REGION: Code = Code::new("E012");

/// A rule set file could not be read or parsed
pub const RULESET_LOAD_FAILED: Code = Code::new("E020");
/// An input file could not be read
pub const INPUT_READ_FAILED: Code = Code::new("E021");

// ============================================================================
// SUCCESS CODES
// ============================================================================

/// A rule set was loaded and compiled
pub const RULESET_LOADED: Code = Code::new("S001");
/// A scan finished over the whole input
pub const SCAN_COMPLETED: Code = Code::new("S002");

// ============================================================================
// GENERIC CODES
// ============================================================================

pub const GENERIC_WARNING: Code = Code::new("W000");
pub const GENERIC_INFO: Code = Code::new("I000");
pub const GENERIC_DEBUG: Code = Code::new("D000");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(RULE_RESERVED_ID.to_string(), "E001");
        assert_eq!(SCAN_COMPLETED.as_str(), "S002");
    }
}
