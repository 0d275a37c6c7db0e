use std::collections::BTreeSet;
use thiserror::Error;
use serde::Serialize;
use chrono::{DateTime, Utc};
use super::formats::S3ServerAccess;
use super::validate::ValidationError;

/// One line of source-native text plus the log type selecting its parser.
///
/// Borrowed from the caller for the duration of a single parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub log_type: &'a str,
    pub line: &'a str,
}

impl<'a> RawRecord<'a> {
    pub fn new(log_type: &'a str, line: &'a str) -> Self {
        Self { log_type, line }
    }
}

/// Per-record failures. None of these are fatal to the process: the parser
/// logs them at debug level and the caller only sees an empty result.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    #[error("Invalid timestamp {value:?}: {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid UTC offset {0:?}, expected [+-]HHMM]")]
    InvalidOffset(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),
}

/// A single decoded field value, borrowed from the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Int(i64),
    Time(DateTime<Utc>),
}

impl FieldValue<'_> {
    /// Textual form used by length and charset constraints.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            FieldValue::Str(s) => std::borrow::Cow::Borrowed(*s),
            FieldValue::Int(v) => std::borrow::Cow::Owned(v.to_string()),
            FieldValue::Time(t) => std::borrow::Cow::Owned(t.to_rfc3339()),
        }
    }
}

/// Named access to the typed fields of one source format.
///
/// `field` returns `None` both for absent values and for names the format
/// does not define, so a rule on an unknown field fails closed.
pub trait FieldSet {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    /// Every field name `field` answers for, in schema order.
    fn field_names(&self) -> &'static [&'static str];

    /// Append the indicators this format carries to the envelope.
    fn extract_indicators(&self, core: &mut CoreFields);
}

/// Format-specific half of a [`StructuredEvent`], one variant per source format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventFields {
    S3ServerAccess(S3ServerAccess),
}

impl FieldSet for EventFields {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self {
            EventFields::S3ServerAccess(f) => f.field(name),
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        match self {
            EventFields::S3ServerAccess(f) => f.field_names(),
        }
    }

    fn extract_indicators(&self, core: &mut CoreFields) {
        match self {
            EventFields::S3ServerAccess(f) => f.extract_indicators(core),
        }
    }
}

pub const LOG_TYPE_FIELD: &str = "p_log_type";
pub const EVENT_TIME_FIELD: &str = "p_event_time";

/// Format-independent envelope attached to every emitted event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreFields {
    #[serde(rename = "p_log_type")]
    pub log_type: String,

    #[serde(rename = "p_event_time")]
    pub event_time: DateTime<Utc>,

    #[serde(rename = "p_any_ip_addresses", skip_serializing_if = "BTreeSet::is_empty")]
    pub ip_addresses: BTreeSet<String>,

    #[serde(rename = "p_any_aws_arns", skip_serializing_if = "BTreeSet::is_empty")]
    pub aws_arns: BTreeSet<String>,

    #[serde(rename = "p_any_aws_account_ids", skip_serializing_if = "BTreeSet::is_empty")]
    pub aws_account_ids: BTreeSet<String>,
}

impl CoreFields {
    pub fn new(log_type: &str, event_time: DateTime<Utc>) -> Self {
        Self {
            log_type: log_type.to_string(),
            event_time,
            ip_addresses: BTreeSet::new(),
            aws_arns: BTreeSet::new(),
            aws_account_ids: BTreeSet::new(),
        }
    }

    pub fn has_indicators(&self) -> bool {
        !(self.ip_addresses.is_empty() && self.aws_arns.is_empty() && self.aws_account_ids.is_empty())
    }
}

/// A normalized event: typed format fields plus the common envelope.
///
/// Serializes as one flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredEvent {
    #[serde(flatten)]
    pub fields: EventFields,

    #[serde(flatten)]
    pub core: CoreFields,
}

impl StructuredEvent {
    /// Look up a field by its serialized name, envelope first.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            LOG_TYPE_FIELD => Some(FieldValue::Str(&self.core.log_type)),
            EVENT_TIME_FIELD => Some(FieldValue::Time(self.core.event_time)),
            _ => self.fields.field(name),
        }
    }

    pub fn log_type(&self) -> &str {
        &self.core.log_type
    }

    pub fn event_time(&self) -> DateTime<Utc> {
        self.core.event_time
    }

    pub fn extract_indicators(&mut self) {
        self.fields.extract_indicators(&mut self.core);
    }
}
