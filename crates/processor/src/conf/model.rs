//! Model: ProcessorConfig and related types.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::parser::formats::s3_server_access;
use crate::parser::MAX_LINE_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Log type used to select the parser for every input line.
    pub log_type: String,
    /// Route the first input line through `parse_header`.
    pub has_header: bool,
    /// Lines longer than this (in bytes) are dropped before parsing.
    pub max_line_size: usize,
    pub output: OutputFormat,
}

/// How emitted events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Indented JSON, for humans
    Pretty,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            log_type: s3_server_access::LOG_TYPE.to_string(),
            has_header: false,
            max_line_size: MAX_LINE_SIZE,
            output: OutputFormat::Json,
        }
    }
}
