//! CLI Argument Parsing
//!
//! Global flags (`--json`, `-v`) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_FILE;
use crate::domain::value_objects::TriggerEvent;

/// Stagecraft - render configuration per environment and promote it through stages
#[derive(Parser, Debug)]
#[command(name = "stagecraft")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI (NDJSON)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a template against a value set and dry-run it
    Validate {
        /// Template document
        #[arg(short, long)]
        template: PathBuf,

        /// Value set (.tfvars, .toml or .json)
        #[arg(long)]
        values: PathBuf,

        /// Pipeline config whose validate command should also run
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render a template against a value set and apply it
    Apply {
        /// Template document
        #[arg(short, long)]
        template: PathBuf,

        /// Value set (.tfvars, .toml or .json)
        #[arg(long)]
        values: PathBuf,

        /// Pipeline config providing the apply command and workdir
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print (or write) a rendered document
    Render {
        /// Template document
        #[arg(short, long)]
        template: PathBuf,

        /// Value set (.tfvars, .toml or .json)
        #[arg(long)]
        values: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the placeholders a template references
    Placeholders {
        /// Template document
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Show what promoting from one environment to another changes
    Diff {
        /// Template document
        #[arg(short, long)]
        template: PathBuf,

        /// Value set of the environment being promoted from
        #[arg(long)]
        from: PathBuf,

        /// Value set of the environment being promoted to
        #[arg(long)]
        to: PathBuf,
    },

    /// Run the full pipeline from a config file
    Run {
        /// Pipeline config
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Branch being built (default: STAGECRAFT_BRANCH, then TRAVIS_BRANCH)
        #[arg(long)]
        branch: Option<String>,

        /// Event that started the build (default: STAGECRAFT_EVENT, then Travis)
        #[arg(long, value_enum)]
        event: Option<TriggerEvent>,

        /// Validate every stage without applying any
        #[arg(long)]
        dry_run: bool,
    },
}
