use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::parser::decode::{FieldDecoder, DASH_DECODER};
use crate::parser::enrich::build_event;
use crate::parser::indicators::{append_aws_arn, append_ip_address};
use crate::parser::registry::ParserDescriptor;
use crate::parser::tokenize::split_fields;
use crate::parser::traits::{emit, CoreFields, EventFields, FieldSet, FieldValue, LogParser, ParseError, StructuredEvent};
use crate::parser::validate::{Charset, ValidationRule};

pub const LOG_TYPE: &str = "AWS.S3ServerAccess";

pub const DESCRIPTION: &str = "S3 server access log: one space-separated, \
quote-tolerant record per request made against a bucket.";

/// Fixed schema width. Lines with fewer columns are rejected, extra columns
/// land in `additional_fields`.
pub const MIN_COLUMNS: usize = 25;

/// Applied to the two bracketed timestamp tokens joined back together,
/// e.g. `[06/Feb/2019:00:00:38` + `+0000]`.
const TIMESTAMP_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S%z]";

const DECODER: FieldDecoder = DASH_DECODER;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::required("bucketowner"),
    ValidationRule::length("bucketowner", 64),
    ValidationRule::charset("bucketowner", Charset::Alphanumeric),
    ValidationRule::required("httpstatus"),
    ValidationRule::range("httpstatus", 100, 600),
];

pub const DESCRIPTOR: ParserDescriptor =
    ParserDescriptor::new(LOG_TYPE, DESCRIPTION, S3ServerAccessParser::boxed);

const FIELD_NAMES: &[&str] = &[
    "bucketowner",
    "bucket",
    "time",
    "remoteip",
    "requester",
    "requestid",
    "operation",
    "key",
    "requesturi",
    "httpstatus",
    "errorcode",
    "bytessent",
    "objectsize",
    "totaltime",
    "turnaroundtime",
    "referrer",
    "useragent",
    "versionid",
    "hostid",
    "signatureversion",
    "ciphersuite",
    "authenticationtype",
    "hostheader",
    "tlsVersion",
];

/// One S3 server access log record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct S3ServerAccess {
    /// Canonical user ID of the source bucket's owner.
    #[serde(rename = "bucketowner", skip_serializing_if = "Option::is_none")]
    pub bucket_owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Time the request was received (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Apparent address of the requester; proxies may hide the real one.
    #[serde(rename = "remoteip", skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,

    /// Canonical user ID or IAM ARN of the requester, absent when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,

    #[serde(rename = "requestid", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// e.g. `REST.GET.OBJECT`, `BATCH.DELETE.OBJECT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(rename = "requesturi", skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,

    #[serde(rename = "httpstatus", skip_serializing_if = "Option::is_none")]
    pub http_status: Option<i64>,

    #[serde(rename = "errorcode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(rename = "bytessent", skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<i64>,

    #[serde(rename = "objectsize", skip_serializing_if = "Option::is_none")]
    pub object_size: Option<i64>,

    /// Milliseconds in flight, server side.
    #[serde(rename = "totaltime", skip_serializing_if = "Option::is_none")]
    pub total_time: Option<i64>,

    /// Milliseconds S3 spent processing the request.
    #[serde(rename = "turnaroundtime", skip_serializing_if = "Option::is_none")]
    pub turn_around_time: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    #[serde(rename = "useragent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(rename = "versionid", skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// `x-amz-id-2` extended request ID.
    #[serde(rename = "hostid", skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,

    #[serde(rename = "signatureversion", skip_serializing_if = "Option::is_none")]
    pub signature_version: Option<String>,

    #[serde(rename = "ciphersuite", skip_serializing_if = "Option::is_none")]
    pub cipher_suite: Option<String>,

    #[serde(rename = "authenticationtype", skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,

    #[serde(rename = "hostheader", skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,

    #[serde(rename = "tlsVersion", skip_serializing_if = "Option::is_none")]
    pub tls_version: Option<String>,

    /// Columns past the fixed schema, verbatim and in order.
    #[serde(rename = "additionalFields", skip_serializing_if = "Vec::is_empty")]
    pub additional_fields: Vec<String>,
}

impl FieldSet for S3ServerAccess {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "bucketowner" => text(&self.bucket_owner),
            "bucket" => text(&self.bucket),
            "time" => self.time.map(FieldValue::Time),
            "remoteip" => text(&self.remote_ip),
            "requester" => text(&self.requester),
            "requestid" => text(&self.request_id),
            "operation" => text(&self.operation),
            "key" => text(&self.key),
            "requesturi" => text(&self.request_uri),
            "httpstatus" => self.http_status.map(FieldValue::Int),
            "errorcode" => text(&self.error_code),
            "bytessent" => self.bytes_sent.map(FieldValue::Int),
            "objectsize" => self.object_size.map(FieldValue::Int),
            "totaltime" => self.total_time.map(FieldValue::Int),
            "turnaroundtime" => self.turn_around_time.map(FieldValue::Int),
            "referrer" => text(&self.referrer),
            "useragent" => text(&self.user_agent),
            "versionid" => text(&self.version_id),
            "hostid" => text(&self.host_id),
            "signatureversion" => text(&self.signature_version),
            "ciphersuite" => text(&self.cipher_suite),
            "authenticationtype" => text(&self.authentication_type),
            "hostheader" => text(&self.host_header),
            "tlsVersion" => text(&self.tls_version),
            _ => None,
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    fn extract_indicators(&self, core: &mut CoreFields) {
        append_ip_address(core, self.remote_ip.as_deref());
        append_aws_arn(core, self.requester.as_deref());
    }
}

fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Str)
}

/// Parser for S3 server access logs. The format has no header line.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3ServerAccessParser;

impl S3ServerAccessParser {
    pub fn boxed() -> Box<dyn LogParser> {
        Box::new(Self)
    }

    pub fn parse_record(&self, line: &str) -> Result<StructuredEvent, ParseError> {
        let columns = split_fields(line, ' ');
        if columns.len() < MIN_COLUMNS {
            return Err(ParseError::MalformedStructure(format!(
                "expected at least {} columns, found {}",
                MIN_COLUMNS,
                columns.len()
            )));
        }

        let event_time = parse_timestamp(&columns[2], &columns[3])?;

        let c = |i: usize| DECODER.string(&columns[i]);
        let n = |i: usize| DECODER.int(&columns[i]);

        let record = S3ServerAccess {
            bucket_owner: c(0),
            bucket: c(1),
            time: Some(event_time),
            remote_ip: c(4),
            requester: c(5),
            request_id: c(6),
            operation: c(7),
            key: c(8),
            request_uri: c(9),
            http_status: n(10),
            error_code: c(11),
            bytes_sent: n(12),
            object_size: n(13),
            total_time: n(14),
            turn_around_time: n(15),
            referrer: c(16),
            user_agent: c(17),
            version_id: c(18),
            host_id: c(19),
            signature_version: c(20),
            cipher_suite: c(21),
            authentication_type: c(22),
            host_header: c(23),
            tls_version: c(24),
            additional_fields: columns[MIN_COLUMNS..].to_vec(),
        };

        build_event(EventFields::S3ServerAccess(record), LOG_TYPE, event_time, RULES)
    }
}

/// The tokenizer breaks "[06/Feb/2019:00:00:38 +0000]" in two. `%z` alone
/// would also take "+00:00", so the offset shape is checked first.
fn parse_timestamp(date: &str, offset: &str) -> Result<DateTime<Utc>, ParseError> {
    if !is_fixed_offset(offset) {
        return Err(ParseError::InvalidOffset(offset.to_string()));
    }
    let raw_time = format!("{}{}", date, offset);
    DateTime::parse_from_str(&raw_time, TIMESTAMP_FORMAT)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ParseError::TimestampParse { value: raw_time, source })
}

/// `+HHMM]` or `-HHMM]`
fn is_fixed_offset(token: &str) -> bool {
    match token.as_bytes() {
        [sign, digits @ .., b']'] => {
            matches!(*sign, b'+' | b'-') && digits.len() == 4 && digits.iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

impl LogParser for S3ServerAccessParser {
    fn parse(&self, line: &str) -> Vec<StructuredEvent> {
        emit(LOG_TYPE, self.parse_record(line))
    }

    fn log_type(&self) -> &'static str {
        LOG_TYPE
    }
}
