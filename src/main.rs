//! Stagecraft CLI - render configuration per environment and promote it through stages
//!
//! Usage: stagecraft <COMMAND>
//!
//! Commands:
//!   validate      Render a template against a value set and dry-run it
//!   apply         Render a template against a value set and apply it
//!   render        Print a rendered document
//!   placeholders  List the placeholders a template references
//!   diff          Show what promotion between two environments changes
//!   run           Run the full pipeline from stagecraft.toml

mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stagecraft::config::EnvVars;
use stagecraft::presentation::output::{emit, error_event, exit_code, format_error};
use stagecraft::presentation::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // The only place the process environment is read; everything below gets the snapshot.
    let vars: EnvVars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();
    let json = cli.json;
    let name = command_name(&cli.command);

    let result = match cli.command {
        Commands::Validate {
            template,
            values,
            config,
        } => commands::validate::cmd_validate(&template, &values, config.as_deref(), &vars, json),
        Commands::Apply {
            template,
            values,
            config,
        } => commands::apply::cmd_apply(&template, &values, config.as_deref(), &vars, json),
        Commands::Render {
            template,
            values,
            out,
        } => commands::render::cmd_render(&template, &values, out.as_deref(), json),
        Commands::Placeholders { template } => {
            commands::placeholders::cmd_placeholders(&template, json)
        }
        Commands::Diff { template, from, to } => {
            commands::diff::cmd_diff(&template, &from, &to, json)
        }
        Commands::Run {
            config,
            branch,
            event,
            dry_run,
        } => commands::run::cmd_run(
            commands::run::RunArgs {
                config: &config,
                branch,
                event,
                dry_run,
            },
            &vars,
            json,
            cli.verbose,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                let _ = emit(error_event(name, &err));
            }
            eprint!("{}", format_error(&err));
            ExitCode::from(exit_code(&err))
        }
    }
}

/// `-v` = info, `-vv` = debug, `-vvv` = trace; `RUST_LOG` wins when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Validate { .. } => "validate",
        Commands::Apply { .. } => "apply",
        Commands::Render { .. } => "render",
        Commands::Placeholders { .. } => "placeholders",
        Commands::Diff { .. } => "diff",
        Commands::Run { .. } => "run",
    }
}
