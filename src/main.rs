//! graphdemo - Microsoft identity platform and Graph API walkthrough
//!
//! Signs in with the OAuth2 authorization-code flow (the code is pasted back from the
//! browser), then reads the user's profile and mail through Microsoft Graph.

#![deny(clippy::all)]

mod auth;
mod config;
mod error;
mod flow;
mod graph;
mod http;
mod presenter;
mod prompt;
mod secure;

#[cfg(test)]
mod test_support;

use std::io;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::ApiError;
use flow::Session;

fn main() -> ExitCode {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            eprintln!("\nPlease set the following environment variables:");
            eprintln!("  AZURE_CLIENT_ID=<your-azure-ad-client-id>");
            eprintln!("  AZURE_CLIENT_SECRET=<your-client-secret>");
            eprintln!("  AZURE_TENANT_ID=<tenant> (optional, defaults to consumers)");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging.level);

    info!(
        "Starting {} v{} in {:?} mode",
        config.app.name,
        env!("CARGO_PKG_VERSION"),
        config.flow.mode
    );

    // Everything runs in sequence on this thread
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result: anyhow::Result<()> = runtime.block_on(async {
        Session::new(&config, stdin.lock(), stdout.lock())?
            .run()
            .await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<ApiError>() {
                Some(api_err) => eprintln!("{}: {}", e, api_err.user_message()),
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing/logging on stderr so it stays out of the program's output.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
