//! Command-line argument parsing.

use charsheet_core::Edition;
use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid build state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the build state comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(String),
}

/// Parsed options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: Input,
    /// Ask the content service about caster tiers before deriving.
    pub refine: bool,
    pub edition: Option<Edition>,
    pub compact: bool,
    pub help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: Input::Stdin,
            refine: false,
            edition: None,
            compact: false,
            help: false,
        }
    }
}

/// Parse `std::env::args()`-style arguments (program name first).
pub fn parse_args(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut input: Option<Input> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => options.help = true,
            "--refine" => options.refine = true,
            "--compact" => options.compact = true,
            "--edition" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--edition needs a value".to_string()))?;
                options.edition = Some(parse_edition(value)?);
                i += 1;
            }
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("Unknown option: {flag}")));
            }
            path => {
                if input.is_some() {
                    return Err(CliError::Usage(format!("Unexpected argument: {path}")));
                }
                input = Some(if path == "-" {
                    Input::Stdin
                } else {
                    Input::File(path.to_string())
                });
            }
        }
        i += 1;
    }

    options.input = input.unwrap_or(Input::Stdin);
    Ok(options)
}

fn parse_edition(value: &str) -> Result<Edition, CliError> {
    Edition::all()
        .iter()
        .copied()
        .find(|edition| edition.tag() == value.trim())
        .ok_or_else(|| CliError::Usage(format!("Unknown edition: {value} (expected 2014 or 2024)")))
}
