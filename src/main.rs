//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `mirror_status` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use mirror_status::initialization::init_logger_with;
use mirror_status::{run_service, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Current directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run_service(config).await {
        eprintln!("mirror_status error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
