//! # Saorsa Stage CLI
//!
//! Command-line host for Saorsa Stage.
//!
//! Loads a deck document, starts a presentation against a recording
//! surface, replays a navigation script and reports the camera pose and
//! surface operations after every command.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p stage-cli -- deck.json --script "next,next,select:intro,key:37"
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `RunConfig` - Backend, initial hash and test mode for a run
//! - `Deck` - Settings overrides plus step sources, loaded from JSON
//! - `run` - Replays parsed `Command`s and returns a `Report`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod runner;
mod script;

pub use runner::{run, Deck, Frame, Outcome, Report};
pub use script::{parse_script, Command, ScriptError};

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stage_core::BackendType;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per command followed by its operations.
    #[default]
    Text,
    /// The whole report as JSON.
    Json,
}

/// Command-line arguments for stage.
#[derive(Debug, Clone, Parser)]
#[command(name = "stage")]
#[command(about = "Replay navigation scripts against a Saorsa Stage deck")]
#[command(version)]
pub struct CliArgs {
    /// Deck document (JSON with `settings` and `steps`)
    pub deck: PathBuf,

    /// Transform tier: full3d, planar or fallback
    #[arg(long, env = "STAGE_BACKEND", default_value = "full3d", value_parser = parse_backend)]
    pub backend: BackendType,

    /// Location hash present at startup (e.g. "#/intro")
    #[arg(long, default_value = "")]
    pub hash: String,

    /// Comma-separated commands: next, prev, select:<id>, goto:<id>,
    /// key:<code>, hash:<fragment>, op:<name>[:<arg>]
    #[arg(long, default_value = "")]
    pub script: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Allow internal operations such as `_loadSiblings`
    #[arg(long)]
    pub test_mode: bool,
}

fn parse_backend(value: &str) -> Result<BackendType, String> {
    value.parse().map_err(|e: stage_core::StageError| e.to_string())
}

/// Settings for one run that do not come from the deck.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Transform tier.
    pub backend: BackendType,
    /// Location hash present at startup.
    pub hash: String,
    /// Allow internal operations.
    pub test_mode: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Full3d,
            hash: String::new(),
            test_mode: false,
        }
    }
}

impl From<&CliArgs> for RunConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            backend: args.backend,
            hash: args.hash.clone(),
            test_mode: args.test_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["stage", "deck.json"]).expect("args");
        assert_eq!(args.deck, PathBuf::from("deck.json"));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.script.is_empty());
        assert!(!args.test_mode);
    }

    #[test]
    fn test_cli_options() {
        let args = CliArgs::try_parse_from([
            "stage",
            "deck.json",
            "--backend",
            "planar",
            "--hash",
            "#/intro",
            "--script",
            "next,prev",
            "--format",
            "json",
            "--test-mode",
        ])
        .expect("args");
        assert_eq!(args.backend, BackendType::Planar);
        assert_eq!(args.format, OutputFormat::Json);

        let config = RunConfig::from(&args);
        assert_eq!(config.hash, "#/intro");
        assert!(config.test_mode);
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        let result = CliArgs::try_parse_from(["stage", "deck.json", "--backend", "webgl"]);
        assert!(result.is_err());
    }
}
