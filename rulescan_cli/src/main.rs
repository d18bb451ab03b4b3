//! # Rulescan CLI
//!
//! Loads a TOML rule set, scans an input file line by line and prints the
//! recognized tokens as text or JSON.

mod ruleset;

use clap::{Parser, Subcommand};
use ruleset::{RuleSet, RuleSetError};
use rulescan_core::logging::codes;
use rulescan_core::logging::{ConsoleLogger, LogLevel, LoggingService};
use rulescan_core::{log_error, log_info, log_success, logging};
use rulescan_core::{Region, TokenScanner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rulescan", version, about = "Rule-driven lexical scanner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan an input file with a rule set and print its tokens
    Scan {
        /// Rule set file (TOML)
        ruleset: PathBuf,
        /// Input text file
        input: PathBuf,
        /// Emit tokens as JSON
        #[arg(long, conflicts_with = "text")]
        json: bool,
        /// Emit tokens as plain text (the default)
        #[arg(long)]
        text: bool,
        /// Log debug-level detail regardless of RULESCAN_LOG
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(serde::Serialize)]
struct TokenRecord {
    line: usize,
    start: usize,
    end: usize,
    id: u16,
    text: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan {
            ruleset,
            input,
            json,
            text: _,
            verbose,
        } => {
            if verbose {
                logging::init_global_logging_with(Arc::new(LoggingService::new(
                    Arc::new(ConsoleLogger),
                    LogLevel::Debug,
                )))?;
            } else {
                logging::init_global_logging()?;
            }
            scan(&ruleset, &input, json)
        }
    }
}

fn scan(ruleset_path: &Path, input_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let set = match RuleSet::load(ruleset_path) {
        Ok(set) => set,
        Err(error) => {
            log_error!(
                codes::RULESET_LOAD_FAILED,
                "cannot load rule set",
                "path" => ruleset_path.display(),
                "error" => error
            );
            return Err(error.into());
        }
    };
    let mut scanner = match set.build_scanner() {
        Ok(scanner) => scanner,
        Err(error) => {
            let code = match &error {
                RuleSetError::Rule(rule_error) => rule_error.code(),
                _ => codes::RULESET_LOAD_FAILED,
            };
            log_error!(
                code,
                "cannot compile rule set",
                "path" => ruleset_path.display(),
                "error" => error
            );
            return Err(error.into());
        }
    };
    log_success!(
        codes::RULESET_LOADED,
        "rule set loaded",
        "path" => ruleset_path.display()
    );

    let text = match std::fs::read_to_string(input_path) {
        Ok(text) => text,
        Err(error) => {
            log_error!(
                codes::INPUT_READ_FAILED,
                "cannot read input",
                "path" => input_path.display(),
                "error" => error
            );
            return Err(error.into());
        }
    };

    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        scanner.parse(line, Region::on_line(line_no, 0, line.len()))?;
        while let Some(token) = scanner.next_token()? {
            records.push(TokenRecord {
                line: line_no,
                start: token.region.start().offset,
                end: token.region.end().offset,
                id: token.id,
                text: token.region.slice(line).to_string(),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!(
                "{}:{}-{}\t#{}\t{}",
                record.line, record.start, record.end, record.id, record.text
            );
        }
    }
    log_info!("scan finished", "tokens" => records.len());
    log_success!(codes::SCAN_COMPLETED, "scan completed");
    Ok(())
}
