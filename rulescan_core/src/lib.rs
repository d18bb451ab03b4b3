// Internal modules
#[macro_use]
pub mod logging;
pub mod partition;
pub mod presentation;
pub mod rules;
pub mod scanner;
pub mod syntax;
pub mod utils;

// Re-export key types for library consumers
pub use partition::{AllocationError, ContentType, ContentTypeAllocator};
pub use presentation::{LexicalPartitionPresentationReconstructor, StyledRun, TextRunStyle};
pub use rules::{
    HashTable, LiteralTransitionRule, NumberTokenRule, RegexTokenRule, RegexTransitionRule,
    RegionTokenRule, RuleError, Token, TokenId, TokenRule, TransitionRule, URIDetector,
    UriTokenRule, WordTokenRule, UNCALCULATED,
};
pub use scanner::{
    LexicalTokenScanner, NullTokenScanner, ScannerError, TokenScanner, Transition,
};
pub use syntax::{DefaultIdentifierSyntax, IdentifierSyntax};
pub use utils::{Position, Region};
