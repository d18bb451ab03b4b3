//! Presentation reconstruction
//!
//! Maps a scanner's token stream onto contiguous style runs for a
//! rendering layer. The reconstructor owns a scanner and a token
//! identifier to style mapping; it has no scan state of its own.

use crate::rules::TokenId;
use crate::scanner::{ScannerError, TokenScanner};
use crate::utils::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Visual attributes applied to a run of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRunStyle {
    /// Foreground color as a `#rrggbb` string, if overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// One contiguous region rendered with one style.
///
/// `style` is `None` where no override applies and the renderer should use
/// its own base style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub region: Region,
    pub style: Option<Arc<TextRunStyle>>,
}

/// Turns tokens into style runs covering a whole region.
///
/// Each token's identifier is looked up in the style map; identifiers
/// without an entry, and the gaps between tokens, get the default style.
/// Runs are contiguous: their regions tile the scanned region exactly.
pub struct LexicalPartitionPresentationReconstructor {
    scanner: Box<dyn TokenScanner>,
    styles: HashMap<TokenId, Arc<TextRunStyle>>,
    default_style: Option<Arc<TextRunStyle>>,
}

impl LexicalPartitionPresentationReconstructor {
    pub fn new(
        scanner: Box<dyn TokenScanner>,
        styles: HashMap<TokenId, Arc<TextRunStyle>>,
        default_style: Option<Arc<TextRunStyle>>,
    ) -> Self {
        Self {
            scanner,
            styles,
            default_style,
        }
    }

    /// Scan `region` of `line` and produce the style runs tiling it.
    pub fn style_runs(
        &mut self,
        line: &str,
        region: Region,
    ) -> Result<Vec<StyledRun>, ScannerError> {
        self.scanner.parse(line, region)?;
        let line_no = region.start().line;
        let mut runs = Vec::new();
        let mut at = region.start().offset;
        while let Some(token) = self.scanner.next_token()? {
            if token.region.start().offset > at {
                runs.push(StyledRun {
                    region: Region::on_line(line_no, at, token.region.start().offset),
                    style: self.default_style.clone(),
                });
            }
            let style = self
                .styles
                .get(&token.id)
                .cloned()
                .or_else(|| self.default_style.clone());
            runs.push(StyledRun {
                region: token.region,
                style,
            });
            at = token.region.end().offset;
        }
        if at < region.end().offset {
            runs.push(StyledRun {
                region: Region::on_line(line_no, at, region.end().offset),
                style: self.default_style.clone(),
            });
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::ContentType;
    use crate::rules::NumberTokenRule;
    use crate::scanner::{LexicalTokenScanner, NullTokenScanner};

    fn number_style() -> Arc<TextRunStyle> {
        Arc::new(TextRunStyle {
            foreground: Some("#0000ff".into()),
            ..TextRunStyle::default()
        })
    }

    fn default_style() -> Arc<TextRunStyle> {
        Arc::new(TextRunStyle::default())
    }

    fn reconstructor() -> LexicalPartitionPresentationReconstructor {
        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        scanner.add_rule(NumberTokenRule::new(1).unwrap()).unwrap();
        let mut styles = HashMap::new();
        styles.insert(1, number_style());
        LexicalPartitionPresentationReconstructor::new(
            Box::new(scanner),
            styles,
            Some(default_style()),
        )
    }

    #[test]
    fn test_runs_tile_the_region() {
        let mut r = reconstructor();
        let line = "x = 42;";
        let runs = r.style_runs(line, Region::on_line(0, 0, line.len())).unwrap();
        // gap, number, gap
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].region, Region::on_line(0, 0, 4));
        assert_eq!(runs[1].region, Region::on_line(0, 4, 6));
        assert_eq!(runs[2].region, Region::on_line(0, 6, 7));
        assert_eq!(runs[1].style, Some(number_style()));
        assert_eq!(runs[0].style, Some(default_style()));
        let mut at = 0;
        for run in &runs {
            assert_eq!(run.region.start().offset, at);
            at = run.region.end().offset;
        }
        assert_eq!(at, line.len());
    }

    #[test]
    fn test_unmapped_token_falls_back_to_default() {
        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        scanner.add_rule(NumberTokenRule::new(1).unwrap()).unwrap();
        let mut r = LexicalPartitionPresentationReconstructor::new(
            Box::new(scanner),
            HashMap::new(),
            Some(default_style()),
        );
        let runs = r.style_runs("7", Region::on_line(0, 0, 1)).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].style, Some(default_style()));
    }

    #[test]
    fn test_no_default_style_means_no_override() {
        let mut scanner = LexicalTokenScanner::new(ContentType::DEFAULT);
        scanner.add_rule(NumberTokenRule::new(1).unwrap()).unwrap();
        let mut r = LexicalPartitionPresentationReconstructor::new(
            Box::new(scanner),
            HashMap::new(),
            None,
        );
        let runs = r.style_runs("a 1", Region::on_line(0, 0, 3)).unwrap();
        assert!(runs.iter().any(|run| run.style.is_none()));
    }

    #[test]
    fn test_tokenless_scanner_yields_single_default_run() {
        let mut r = LexicalPartitionPresentationReconstructor::new(
            Box::new(NullTokenScanner::new()),
            HashMap::new(),
            Some(default_style()),
        );
        let runs = r.style_runs("abc", Region::on_line(0, 0, 3)).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].region, Region::on_line(0, 0, 3));
    }
}
