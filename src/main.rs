//! Blikk CLI entry point.

use anyhow::Result;
use blikk::cli::{commands, Cli, Commands};
use blikk::config::Settings;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v overrides the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("blikk={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Analyze {
            source,
            source_type,
            mode,
            prompt,
            output,
        } => {
            commands::run_analyze(
                source,
                source_type,
                mode,
                prompt.clone(),
                output.clone(),
                settings,
            )
            .await?;
        }

        Commands::Read { path } => {
            commands::run_read(path, &settings)?;
        }

        Commands::Write {
            path,
            content,
            no_create_dirs,
        } => {
            commands::run_write(path, content, !no_create_dirs, &settings)?;
        }

        Commands::Delete { path } => {
            commands::run_delete(path, &settings)?;
        }

        Commands::Ls {
            path,
            all,
            recursive,
        } => {
            commands::run_ls(path, *all, *recursive, &settings)?;
        }

        Commands::Mkdir { path } => {
            commands::run_mkdir(path, &settings)?;
        }

        Commands::Info { path } => {
            commands::run_info(path, &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
