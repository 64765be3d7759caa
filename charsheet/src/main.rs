//! Character sheet calculator.
//!
//! Reads a build-state JSON document and prints the derived statistics as
//! JSON.
//!
//! ```bash
//! cargo run -p charsheet -- hero.json --refine
//! cat hero.json | cargo run -p charsheet -- --edition 2024
//! ```

mod args;

use args::{parse_args, CliError, Input, Options};
use charsheet_core::{derive_stats, BuildState, CasterClassifier, ContentConfig};
use std::io::Read;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if options.help {
        print_help();
        return Ok(());
    }

    let output = run(&options).await?;
    println!("{output}");
    Ok(())
}

async fn run(options: &Options) -> Result<String, CliError> {
    let mut state = read_build_state(&options.input)?;
    if let Some(edition) = options.edition {
        state.edition = edition;
    }

    if options.refine {
        refine(&mut state).await;
    }

    let stats = derive_stats(&state);
    let json = if options.compact {
        serde_json::to_string(&stats)?
    } else {
        serde_json::to_string_pretty(&stats)?
    };
    Ok(json)
}

fn read_build_state(input: &Input) -> Result<BuildState, CliError> {
    let raw = match input {
        Input::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            buf
        }
        Input::File(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?,
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Refine caster tiers through the content service, if it is enabled.
async fn refine(state: &mut BuildState) {
    let config = ContentConfig::from_env();
    let classifier = CasterClassifier::from_config(&config);
    let class_ids = state.class_ids();

    let refinements = classifier.refine_all(class_ids.iter().map(String::as_str)).await;
    let applied = refinements
        .iter()
        .filter(|refinement| state.apply_caster_refinement(refinement))
        .count();
    info!(applied, online = config.enabled, "refined caster tiers");
}

fn print_help() {
    println!("charsheet - D&D 5e character sheet calculator");
    println!();
    println!("USAGE:");
    println!("  charsheet [OPTIONS] [PATH]");
    println!();
    println!("Reads a build-state JSON document from PATH (or stdin when PATH is");
    println!("omitted or '-') and prints the derived stats as JSON.");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help              Show this help message");
    println!("  --refine                Look up caster tiers in the SRD content API");
    println!("  --edition <2014|2024>   Override the edition in the document");
    println!("  --compact               Print JSON on one line");
    println!();
    println!("ENVIRONMENT:");
    println!("  SRD_API_BASE_URL        Content API host (default: https://www.dnd5eapi.co)");
    println!("  SRD_API_TIMEOUT_SECS    Request timeout in seconds (default: 10)");
    println!("  SRD_CACHE_TTL_SECS      Lookup cache lifetime in seconds (default: 3600)");
    println!("  SRD_REFINE              Set to 0 to keep --refine offline");
    println!("  RUST_LOG                Log filter, written to stderr (default: warn)");
    println!();
    println!("EXAMPLES:");
    println!("  charsheet hero.json");
    println!("  charsheet --refine --edition 2024 hero.json");
}
