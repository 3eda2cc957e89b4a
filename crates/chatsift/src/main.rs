// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! chatsift - group conversation ingestion and categorization service.
//!
//! This is the binary entry point.

mod ingest;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// chatsift - group conversation ingestion and categorization service.
#[derive(Parser, Debug)]
#[command(name = "chatsift", version, about, long_about = None)]
struct Cli {
    /// Path to a specific config file (bypasses the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the chatsift service (pipeline + HTTP gateway).
    Serve,
    /// Process a JSON file of raw messages through the pipeline.
    Ingest {
        /// Path to a JSON array of raw messages.
        #[arg(long)]
        file: PathBuf,
        /// Group id for messages that carry none.
        #[arg(long)]
        group: Option<String>,
    },
    /// Print the resolved, validated configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            chatsift_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Ingest { file, group } => ingest::run_ingest(config, &file, group).await,
        Commands::Config => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(chatsift_core::ChatsiftError::Internal(format!(
                    "cannot render config: {e}"
                ))),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<chatsift_config::ChatsiftConfig, Vec<chatsift_config::ConfigError>> {
    match path {
        None => chatsift_config::load_and_validate(),
        Some(path) => match chatsift_config::load_config_from_path(path) {
            Ok(config) => {
                chatsift_config::validation::validate_config(&config)?;
                Ok(config)
            }
            Err(err) => Err(chatsift_config::diagnostic::figment_to_config_errors(err)),
        },
    }
}
