//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry driven by [`LoggingConfig`]:
//! a console layer on stderr, an optional file layer, plain or JSON output,
//! and an `EnvFilter` that honours `RUST_LOG` over the configured level.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
    }
}

fn file_layer(path: &str, json: bool) -> Result<BoxedLayer> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ProtocolError::ConfigError(format!("Failed to open log file {path}: {e}")))?;
    let writer = Mutex::new(file);

    Ok(if json {
        Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
    })
}

/// Install the global subscriber described by `config`.
///
/// Calling this more than once is harmless: if a global subscriber is already
/// installed the existing one is kept.
///
/// # Errors
/// Returns `ProtocolError::ConfigError` if the configuration is invalid or the
/// log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ProtocolError::ConfigError(errors.join("; ")));
    }

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.log_to_console {
        layers.push(console_layer(config.json_format));
    }
    if config.log_to_file {
        if let Some(path) = &config.log_file_path {
            layers.push(file_layer(path, config.json_format)?);
        }
    }

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    match Registry::default().with(layers).with(filter).try_init() {
        Ok(()) => {
            info!(app = %config.app_name, level = %config.log_level, "Logging initialised");
        }
        Err(_) => {
            debug!("Global subscriber already installed, keeping it");
        }
    }
    Ok(())
}
