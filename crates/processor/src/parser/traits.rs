pub use super::model::{
    CoreFields, EventFields, FieldSet, FieldValue, ParseError, RawRecord, StructuredEvent,
};

/// Per-format parsing contract.
///
/// Implementations hold no mutable state, so one instance may serve any
/// number of concurrent callers.
pub trait LogParser: Send + Sync {
    /// parse one raw line into zero or one events
    fn parse(&self, line: &str) -> Vec<StructuredEvent>;

    /// Parse a line that may be a column header. Headerless formats parse it
    /// as data; a real header row then fails validation and is dropped.
    fn parse_header(&self, line: &str) -> Vec<StructuredEvent> {
        self.parse(line)
    }

    fn log_type(&self) -> &'static str;
}

/// Turn a per-record outcome into the zero-or-one result callers see,
/// logging the reason for any drop.
pub fn emit(log_type: &str, result: Result<StructuredEvent, ParseError>) -> Vec<StructuredEvent> {
    match result {
        Ok(event) => vec![event],
        Err(e) => {
            tracing::debug!(log_type, error = %e, "dropping record");
            Vec::new()
        }
    }
}
