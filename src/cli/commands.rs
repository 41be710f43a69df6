//! CLI command implementations

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::http_server::{HttpServer, HttpServerConfig};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, host, port } => {
            let config = resolve_config(config.as_deref(), host, port)?;
            serve(config)
        }
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` level. A second call is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the server config: file (if any), then flag overrides.
pub fn resolve_config(
    path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> CliResult<HttpServerConfig> {
    let mut config = match path {
        Some(path) => HttpServerConfig::load(path)?,
        None => HttpServerConfig::default(),
    };

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    config.validate()?;
    Ok(config)
}

/// Start the HTTP server on a fresh tokio runtime
pub fn serve(config: HttpServerConfig) -> CliResult<()> {
    init_logging();
    info!(addr = %config.socket_addr(), "starting users API");

    let server = HttpServer::with_config(config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(None, None, None).unwrap();
        assert_eq!(config, HttpServerConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host": "127.0.0.1", "port": 4000}}"#).unwrap();

        let config = resolve_config(Some(file.path()), None, Some(5000)).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = resolve_config(None, Some(" ".to_string()), None).unwrap_err();
        assert_eq!(err.code(), &crate::cli::CliErrorCode::ConfigError);
    }
}
