//! Lenient token decoding.
//!
//! A token equal to the format's absent-value sentinel decodes to `None`, and
//! so does a numeric token that fails to parse. Decoding never errors: only
//! structural problems (column count, timestamp, validation) reject a record.

use tracing::trace;

/// Token decoder bound to one format's "no value" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecoder {
    absent: &'static str,
}

/// Decoder for formats that write a single dash for missing values.
pub const DASH_DECODER: FieldDecoder = FieldDecoder::new("-");

impl FieldDecoder {
    pub const fn new(absent: &'static str) -> Self {
        Self { absent }
    }

    pub fn absent_marker(&self) -> &'static str {
        self.absent
    }

    pub fn is_absent(&self, token: &str) -> bool {
        token == self.absent
    }

    pub fn string(&self, token: &str) -> Option<String> {
        if self.is_absent(token) {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn int(&self, token: &str) -> Option<i64> {
        if self.is_absent(token) {
            return None;
        }
        match token.parse::<i64>() {
            Ok(v) => Some(v),
            Err(e) => {
                trace!(token, error = %e, "numeric field not decodable, treating as absent");
                None
            }
        }
    }

    /// Inverse of [`FieldDecoder::string`].
    pub fn encode_string<'a>(&self, value: Option<&'a str>) -> &'a str {
        value.unwrap_or(self.absent)
    }

    /// Inverse of [`FieldDecoder::int`] for canonically written integers.
    pub fn encode_int(&self, value: Option<i64>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => self.absent.to_string(),
        }
    }
}

impl Default for FieldDecoder {
    fn default() -> Self {
        DASH_DECODER
    }
}
