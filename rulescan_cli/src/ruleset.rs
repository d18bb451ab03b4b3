//! Rule set files
//!
//! A rule set is a TOML document declaring content types, transition
//! rules, token rules, word rules and styles. Loading one produces a
//! ready-to-run scanner and reconstructor.
//!
//! ```toml
//! [[content_types]]
//! name = "comment"
//!
//! [[transitions]]
//! from = "default"
//! to = "comment"
//! kind = "literal"
//! pattern = "/*"
//!
//! [[rules]]
//! kind = "number"
//! id = 1
//!
//! [[word_rules]]
//! id = 2
//! words = ["if", "else"]
//!
//! [styles.1]
//! foreground = "#0000ff"
//! ```

use rulescan_core::{
    ContentType, ContentTypeAllocator, LexicalPartitionPresentationReconstructor,
    LexicalTokenScanner, LiteralTransitionRule, NumberTokenRule, RegexTokenRule,
    RegexTransitionRule, RegionTokenRule, RuleError, ScannerError, TextRunStyle, TokenId,
    URIDetector, UriTokenRule, WordTokenRule,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Errors raised while loading or compiling a rule set file.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("cannot read rule set: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed rule set: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rule: {0}")]
    Rule(#[from] RuleError),

    #[error("rule registration rejected: {0}")]
    Scanner(#[from] ScannerError),

    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    #[error("content type '{0}' declared twice")]
    DuplicateContentType(String),

    #[error(transparent)]
    Allocation(#[from] rulescan_core::AllocationError),

    #[error("style key '{0}' is not a token identifier")]
    BadStyleKey(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    content_types: Vec<ContentTypeDecl>,
    #[serde(default)]
    transitions: Vec<TransitionDecl>,
    #[serde(default)]
    rules: Vec<RuleDecl>,
    #[serde(default)]
    word_rules: Vec<WordRuleDecl>,
    #[serde(default)]
    styles: HashMap<String, TextRunStyle>,
    #[serde(default)]
    default_style: Option<TextRunStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentTypeDecl {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransitionDecl {
    from: String,
    to: String,
    kind: TransitionKind,
    pattern: String,
    #[serde(default)]
    escape: Option<char>,
    #[serde(default = "default_true")]
    case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransitionKind {
    Literal,
    Regex,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RuleDecl {
    Region {
        id: TokenId,
        start: String,
        #[serde(default)]
        end: String,
        #[serde(default)]
        escape: Option<char>,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },
    Number {
        id: TokenId,
    },
    Regex {
        id: TokenId,
        pattern: String,
    },
    Uri {
        id: TokenId,
        /// Restrict to these schemes; omitted means the IANA set.
        #[serde(default)]
        schemes: Option<Vec<String>>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WordRuleDecl {
    id: TokenId,
    words: Vec<String>,
    #[serde(default = "default_true")]
    case_sensitive: bool,
}

fn default_true() -> bool {
    true
}

impl RuleSet {
    /// Parse a rule set from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, RuleSetError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a rule set file.
    pub fn load(path: &Path) -> Result<Self, RuleSetError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    fn resolve(
        &self,
        name: &str,
        named: &HashMap<String, ContentType>,
    ) -> Result<ContentType, RuleSetError> {
        match name {
            "default" => Ok(ContentType::DEFAULT),
            "parent" => Ok(ContentType::PARENT),
            other => named
                .get(other)
                .copied()
                .ok_or_else(|| RuleSetError::UnknownContentType(other.to_string())),
        }
    }

    /// Compile the declarations into a scanner for the default content.
    pub fn build_scanner(&self) -> Result<LexicalTokenScanner, RuleSetError> {
        let allocator = ContentTypeAllocator::new();
        let mut named = HashMap::new();
        for decl in &self.content_types {
            let ct = allocator.allocate()?;
            if named.insert(decl.name.clone(), ct).is_some() {
                return Err(RuleSetError::DuplicateContentType(decl.name.clone()));
            }
        }

        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        for decl in &self.transitions {
            let from = self.resolve(&decl.from, &named)?;
            let to = self.resolve(&decl.to, &named)?;
            match decl.kind {
                TransitionKind::Literal => {
                    scanner.add_transition_rule(LiteralTransitionRule::new(
                        from,
                        to,
                        decl.pattern.clone(),
                        decl.escape,
                        decl.case_sensitive,
                    ))?;
                }
                TransitionKind::Regex => {
                    scanner.add_transition_rule(RegexTransitionRule::new(
                        from,
                        to,
                        &decl.pattern,
                        decl.case_sensitive,
                    )?)?;
                }
            }
        }

        for decl in &self.rules {
            match decl {
                RuleDecl::Region {
                    id,
                    start,
                    end,
                    escape,
                    case_sensitive,
                } => {
                    scanner.add_rule(RegionTokenRule::new(
                        *id,
                        start.clone(),
                        end.clone(),
                        *escape,
                        *case_sensitive,
                    )?)?;
                }
                RuleDecl::Number { id } => {
                    scanner.add_rule(NumberTokenRule::new(*id)?)?;
                }
                RuleDecl::Regex { id, pattern } => {
                    scanner.add_rule(RegexTokenRule::new(*id, pattern)?)?;
                }
                RuleDecl::Uri { id, schemes } => {
                    let detector = match schemes {
                        Some(schemes) => {
                            let mut detector = URIDetector::new();
                            detector.set_valid_schemes(schemes, false)?;
                            Arc::new(detector)
                        }
                        None => URIDetector::default_iana(),
                    };
                    scanner.add_rule(UriTokenRule::new(*id, detector)?)?;
                }
            }
        }

        for decl in &self.word_rules {
            scanner.add_word_rule(WordTokenRule::from_words(
                decl.id,
                &decl.words,
                decl.case_sensitive,
            )?)?;
        }

        Ok(scanner)
    }

    /// Compile into a presentation reconstructor using the declared styles.
    pub fn build_reconstructor(
        &self,
    ) -> Result<LexicalPartitionPresentationReconstructor, RuleSetError> {
        let scanner = self.build_scanner()?;
        let mut styles = HashMap::new();
        for (key, style) in &self.styles {
            let id: TokenId = key
                .parse()
                .map_err(|_| RuleSetError::BadStyleKey(key.clone()))?;
            styles.insert(id, Arc::new(style.clone()));
        }
        Ok(LexicalPartitionPresentationReconstructor::new(
            Box::new(scanner),
            styles,
            self.default_style.clone().map(Arc::new),
        ))
    }
}
