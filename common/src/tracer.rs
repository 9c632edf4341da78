use thiserror::Error;
use tracing::{level_filters::LevelFilter, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Tracer already initialised: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

pub struct TracerOptions {
    /// Used when `RUST_LOG` is absent or unparsable.
    pub default_level: LevelFilter,
    /// Send the formatted output to stderr rather than stdout,
    /// used when stdout carries a report.
    pub use_stderr: bool,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            default_level: LevelFilter::INFO,
            use_stderr: false,
        }
    }
}

/// This object initialises the global subscriber, given a TracerOptions struct.
pub struct TracerEngine;

impl TracerEngine {
    /// Initialises the formatted tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// #Returns
    /// An instance of TracerEngine, or an error if a global subscriber was already set.
    pub fn new(options: TracerOptions) -> Result<Self, TracerError> {
        // This filter is applied to the formatted tracer
        let log_filter = EnvFilter::builder()
            .with_default_directive(options.default_level.into())
            .from_env_lossy();

        let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if options.use_stderr {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .boxed()
        };

        let subscriber =
            Registry::default().with(fmt_layer.with_filter(log_filter));

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(Self)
    }
}
