/// Log parsing and normalization module
/// 
/// Converts single lines of cloud-service log text into normalized,
/// validated events carrying security indicators.
/// 
/// # Architecture
/// 
/// - `traits.rs`: The per-format `LogParser` contract
/// - `registry.rs`: Log type → parser dispatch, built once at startup
/// - `formats/`: Individual format parser implementations
/// - `tokenize.rs` / `decode.rs`: Field splitting and lenient token decoding
/// - `enrich.rs` / `indicators.rs`: Envelope fields and indicator extraction
/// - `validate.rs`: Declarative, fail-closed field constraints
/// - `metrics.rs`: Ingestion counters
/// 
/// # Pipeline
/// 
/// raw line → tokenize → decode fields → core fields → indicators → validate
/// 
/// Every stage is a pure function of its input. A rejected record is logged
/// at debug level and surfaces to the caller as an empty result.

pub mod traits;
pub mod registry;
pub mod formats;
pub mod model;
pub mod metrics;
pub mod decode;
pub mod tokenize;
pub mod enrich;
pub mod indicators;
pub mod validate;

// Re-export commonly used types
pub use traits::LogParser;
pub use model::{RawRecord, StructuredEvent, CoreFields, EventFields, ParseError};
pub use registry::{ParserDescriptor, ParserRegistry, RegistryError};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
