//! Boot: logging init, config load, parser registry checks.

use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::ProcessorConfig;
use crate::parser::ParserRegistry;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout carries the event stream.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "processor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config and make sure the selected log type has a parser.
///
/// Returns `(registry, ProcessorConfig)` on success.
pub fn boot() -> Result<(&'static ParserRegistry, ProcessorConfig), Box<dyn std::error::Error>> {
    info!("Starting log processor v{}", env!("CARGO_PKG_VERSION"));

    let config = ProcessorConfig::load()?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    info!(
        "Loaded configuration: log_type={}, has_header={}, max_line_size={}, output={}",
        config.log_type, config.has_header, config.max_line_size, config.output
    );

    let registry = ParserRegistry::global();
    for (log_type, description) in registry.describe() {
        info!("Registered parser {}: {}", log_type, description);
    }

    registry.descriptor(&config.log_type).map_err(|e| {
        error!("Cannot start: {}", e);
        error!("Set PROCESSOR_LOG_TYPE to one of: {}", registry.log_types().join(", "));
        e
    })?;

    Ok((registry, config))
}
