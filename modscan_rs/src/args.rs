//! Command-line argument parsing for the `modscan` binary.

use std::collections::HashSet;
use std::path::PathBuf;

/// Binary mode: one scan printed to stdout, or a batch resolved from a
/// request file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Scan,
    Batch(PathBuf),
}

#[derive(Debug)]
pub struct ParsedArgs {
    pub mode: Mode,
    /// Raw invocation tokens, everything after `--`.
    pub command: Vec<String>,
    pub placeholders: HashSet<String>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub show_help: bool,
    pub show_version: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        Self {
            mode: Mode::Scan,
            command: Vec::new(),
            placeholders: HashSet::new(),
            output: None,
            verbose: false,
            show_help: false,
            show_version: false,
        }
    }
}

pub fn parse_args(argv: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut idx = 0;

    while idx < argv.len() {
        let arg = argv[idx].as_str();
        match arg {
            "--" => {
                parsed.command = argv[idx + 1..].to_vec();
                break;
            }
            "--batch" => {
                let value = argv
                    .get(idx + 1)
                    .ok_or_else(|| "--batch expects a file path".to_string())?;
                parsed.mode = Mode::Batch(PathBuf::from(value));
                idx += 2;
            }
            "--placeholder" => {
                let value = argv
                    .get(idx + 1)
                    .ok_or_else(|| "--placeholder expects a module name".to_string())?;
                parsed.placeholders.insert(value.clone());
                idx += 2;
            }
            "--placeholders" => {
                let value = argv
                    .get(idx + 1)
                    .ok_or_else(|| "--placeholders expects a comma-separated list".to_string())?;
                for name in value.split(',') {
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        parsed.placeholders.insert(trimmed.to_string());
                    }
                }
                idx += 2;
            }
            "--output" | "-o" => {
                let value = argv
                    .get(idx + 1)
                    .ok_or_else(|| "--output expects a file path".to_string())?;
                parsed.output = Some(PathBuf::from(value));
                idx += 2;
            }
            "--verbose" => {
                parsed.verbose = true;
                idx += 1;
            }
            "--help" | "-h" => {
                parsed.show_help = true;
                idx += 1;
            }
            "--version" | "-V" => {
                parsed.show_version = true;
                idx += 1;
            }
            other => {
                return Err(format!(
                    "unknown option '{other}' (invocation arguments go after '--')"
                ));
            }
        }
    }

    Ok(parsed)
}
