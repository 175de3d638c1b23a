// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toolgate - a plugin host exposing LLM tools over HTTP.
//!
//! This is the binary entry point.

mod inspect;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use toolgate_config::{render_errors, ToolgateConfig};

/// Toolgate - a plugin host exposing LLM tools over HTTP.
#[derive(Parser, Debug)]
#[command(name = "toolgate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load plugins and serve the HTTP gateway (default).
    Serve {
        /// Use this config file instead of the standard lookup.
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Load plugins, print the tool catalogue as JSON, and exit.
    Tools {
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Check whether a plugin bundle would be admitted by this host.
    CheckManifest {
        /// Bundle directory, `.tar.gz` archive, or `plugin.json` file.
        path: PathBuf,
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Serve { config }
            | Commands::Tools { config }
            | Commands::CheckManifest { config, .. } => config.as_deref(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Option<ToolgateConfig> {
    let loaded = match path {
        Some(path) => toolgate_config::load_and_validate_path(path),
        None => toolgate_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            render_errors(&errors);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { config: None });

    let Some(config) = load_config(command.config_path()) else {
        return ExitCode::FAILURE;
    };
    serve::init_tracing(&config.logging);

    let result = match command {
        Commands::Serve { .. } => serve::run_serve(config).await.map(|()| true),
        Commands::Tools { .. } => inspect::run_tools(&config).await.map(|()| true),
        Commands::CheckManifest { path, .. } => inspect::check_manifest(&path, &config),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "toolgate exited with an error");
            eprintln!("toolgate: {e}");
            ExitCode::FAILURE
        }
    }
}
