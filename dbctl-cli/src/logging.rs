///! Logging configuration module
///! Diagnostics go to stderr so stdout stays clean for manifests

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,     // log level (trace, debug, info, warn, error)
    pub json_format: bool, // use JSON formatting
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// `verbose` raises the configured level to debug
    pub fn new(level: &str, json_format: bool, verbose: bool) -> Self {
        Self {
            level: if verbose { "debug".to_string() } else { level.to_string() },
            json_format,
        }
    }

    /// RUST_LOG wins over the configured level
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Initialize logging based on configuration
    pub fn init(&self) -> anyhow::Result<()> {
        let layer = if self.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(self.filter())
            .with(layer)
            .try_init()?;

        tracing::debug!("Logging initialized - level: {}", self.level);
        Ok(())
    }
}
