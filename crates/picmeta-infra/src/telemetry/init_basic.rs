use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Options controlling log output
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryOptions {
    /// Emit debug-level logs for the picmeta crates
    pub verbose: bool,
    /// Emit one JSON object per log line instead of human-readable text
    pub json: bool,
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "picmeta_infra=debug,picmeta_worker=debug,picmeta_vision=debug,picmeta_storage=debug,picmeta_processing=debug,warn"
    } else {
        "picmeta_infra=info,picmeta_worker=info,picmeta_vision=info,picmeta_storage=info,picmeta_processing=info,warn"
    }
}

/// Initialize tracing
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn init_telemetry(options: TelemetryOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(options.verbose).into());

    let registry = tracing_subscriber::registry().with(filter);

    if options.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::debug!(
        verbose = options.verbose,
        json = options.json,
        "Telemetry initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
