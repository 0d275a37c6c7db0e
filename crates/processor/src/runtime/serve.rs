//! Serve: run the ingest loop over stdin/stdout until EOF or shutdown.

use tokio::io::{self, BufReader};
use tracing::info;

use crate::conf::ProcessorConfig;
use crate::ingest;
use crate::parser::metrics::IngestMetrics;
use crate::parser::ParserRegistry;
use crate::runtime::stop::shutdown_signal;

pub async fn serve(registry: &'static ParserRegistry, config: ProcessorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = IngestMetrics::new();
    let reader = BufReader::new(io::stdin());
    let writer = io::stdout();

    info!("Reading {} lines from stdin", config.log_type);

    tokio::select! {
        result = ingest::run(registry, &config, reader, writer, &metrics) => result?,
        _ = shutdown_signal() => {
            info!(metrics = ?metrics.snapshot(), "ingest interrupted");
        }
    }

    info!("Processor shutdown complete");
    Ok(())
}
