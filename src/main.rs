//! # minihttp - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y arranca el servidor.

use minihttp::config::Config;
use minihttp::server::Server;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minihttp=info")),
        )
        .init();

    let config = Config::new();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    info!(
        address = %config.address(),
        directory = ?config.directory,
        max_request_bytes = config.max_request_bytes,
        "configuration loaded"
    );

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(address = %config.address(), error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run() {
        error!(error = %e, "server stopped");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
