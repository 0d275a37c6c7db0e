//! Core-field enrichment and the shared tail of every format's parse.

use chrono::{DateTime, Utc};
use super::model::{CoreFields, EventFields, ParseError, StructuredEvent};
use super::validate::{validate, ValidationRule};

/// Attach the log type and event time to freshly populated format fields.
pub fn set_core_fields(fields: EventFields, log_type: &str, event_time: DateTime<Utc>) -> StructuredEvent {
    StructuredEvent {
        fields,
        core: CoreFields::new(log_type, event_time),
    }
}

/// Enrich, extract indicators, then validate. All-or-nothing: a violation
/// discards the whole event.
pub fn build_event(
    fields: EventFields,
    log_type: &str,
    event_time: DateTime<Utc>,
    rules: &[ValidationRule],
) -> Result<StructuredEvent, ParseError> {
    let mut event = set_core_fields(fields, log_type, event_time);
    event.extract_indicators();
    validate(&event, rules)?;
    Ok(event)
}
