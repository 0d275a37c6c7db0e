/// Individual log format parsers

pub mod s3_server_access;

use super::registry::ParserDescriptor;

// Re-export parser implementations
pub use s3_server_access::{S3ServerAccess, S3ServerAccessParser};

/// Every built-in format, in registration order.
pub const ALL: &[ParserDescriptor] = &[
    s3_server_access::DESCRIPTOR,
];
