//! Log-type → parser dispatch table.
//!
//! Built once from a static descriptor list and read-only afterwards, so it
//! can be shared across threads without locking.

use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;
use super::formats;
use super::traits::{LogParser, RawRecord, StructuredEvent};

pub type ParserConstructor = fn() -> Box<dyn LogParser>;

/// A log type and the constructor for its parser.
#[derive(Debug, Clone, Copy)]
pub struct ParserDescriptor {
    pub log_type: &'static str,
    pub description: &'static str,
    constructor: ParserConstructor,
}

impl ParserDescriptor {
    pub const fn new(log_type: &'static str, description: &'static str, constructor: ParserConstructor) -> Self {
        Self { log_type, description, constructor }
    }

    /// Build a fresh parser instance.
    pub fn new_parser(&self) -> Box<dyn LogParser> {
        (self.constructor)()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("log type {0} registered more than once")]
    DuplicateLogType(String),

    #[error("descriptor {descriptor} builds a parser for {parser}")]
    MismatchedLogType { descriptor: String, parser: String },

    #[error("no parser for log type {0}")]
    UnknownLogType(String),
}

struct Entry {
    descriptor: ParserDescriptor,
    parser: Box<dyn LogParser>,
}

/// Registered parsers keyed by log type.
///
/// Each entry keeps one shared parser instance built at registration.
pub struct ParserRegistry {
    entries: HashMap<&'static str, Entry>,
}

static GLOBAL: OnceLock<ParserRegistry> = OnceLock::new();

impl ParserRegistry {
    pub fn new(descriptors: &[ParserDescriptor]) -> Result<Self, RegistryError> {
        let mut entries = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let parser = descriptor.new_parser();
            if parser.log_type() != descriptor.log_type {
                return Err(RegistryError::MismatchedLogType {
                    descriptor: descriptor.log_type.to_string(),
                    parser: parser.log_type().to_string(),
                });
            }
            if entries.contains_key(descriptor.log_type) {
                return Err(RegistryError::DuplicateLogType(descriptor.log_type.to_string()));
            }
            entries.insert(descriptor.log_type, Entry { descriptor: *descriptor, parser });
        }

        Ok(Self { entries })
    }

    /// Process-wide registry of every built-in format.
    ///
    /// # Panics
    ///
    /// On first use, if the built-in descriptor list is inconsistent. That is
    /// a programming error and should surface at startup.
    pub fn global() -> &'static ParserRegistry {
        GLOBAL.get_or_init(|| match Self::new(formats::ALL) {
            Ok(registry) => registry,
            Err(e) => panic!("invalid built-in parser registry: {}", e),
        })
    }

    pub fn get(&self, log_type: &str) -> Result<&dyn LogParser, RegistryError> {
        self.entries
            .get(log_type)
            .map(|e| e.parser.as_ref())
            .ok_or_else(|| RegistryError::UnknownLogType(log_type.to_string()))
    }

    pub fn descriptor(&self, log_type: &str) -> Result<&ParserDescriptor, RegistryError> {
        self.entries
            .get(log_type)
            .map(|e| &e.descriptor)
            .ok_or_else(|| RegistryError::UnknownLogType(log_type.to_string()))
    }

    pub fn contains(&self, log_type: &str) -> bool {
        self.entries.contains_key(log_type)
    }

    pub fn parse(&self, record: &RawRecord<'_>) -> Result<Vec<StructuredEvent>, RegistryError> {
        Ok(self.get(record.log_type)?.parse(record.line))
    }

    pub fn parse_header(&self, record: &RawRecord<'_>) -> Result<Vec<StructuredEvent>, RegistryError> {
        Ok(self.get(record.log_type)?.parse_header(record.line))
    }

    /// Registered log types, sorted.
    pub fn log_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.entries.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// `(log_type, description)` pairs, sorted by log type.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.log_types()
            .into_iter()
            .filter_map(|t| self.entries.get(t).map(|e| (t, e.descriptor.description)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("log_types", &self.log_types())
            .finish()
    }
}
