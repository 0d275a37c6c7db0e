//! Indicator extraction.
//!
//! IPs must be literals. Any value carrying the `arn:` prefix is kept
//! verbatim; only its account id is gated on a strict parse.

use std::net::IpAddr;
use super::model::CoreFields;

pub const ARN_PREFIX: &str = "arn:";

const ACCOUNT_ID_LEN: usize = 12;

/// Components of an `arn:partition:service:region:account:resource` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    /// Strictly parse an ARN. Returns `None` for anything that only looks like one.
    pub fn parse(value: &'a str) -> Option<Self> {
        if !value.starts_with(ARN_PREFIX) || value.chars().any(char::is_whitespace) {
            return None;
        }

        let mut parts = value.splitn(6, ':');
        let _ = parts.next()?;
        let partition = parts.next()?;
        let service = parts.next()?;
        let region = parts.next()?;
        let account_id = parts.next()?;
        let resource = parts.next()?;

        if !partition.starts_with("aws") || !is_token(partition) {
            return None;
        }
        if service.is_empty() || !is_token(service) {
            return None;
        }
        if !region.is_empty() && !is_token(region) {
            return None;
        }
        if !account_id.is_empty() && !is_account_id(account_id) {
            return None;
        }
        if resource.is_empty() {
            return None;
        }

        Some(Self { partition, service, region, account_id, resource })
    }
}

fn is_token(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn is_account_id(s: &str) -> bool {
    s.len() == ACCOUNT_ID_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_ip_literal(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

/// Add `value` to the IP indicator set if it is an IPv4 or IPv6 literal.
pub fn append_ip_address(core: &mut CoreFields, value: Option<&str>) -> bool {
    match value {
        Some(v) if is_ip_literal(v) => core.ip_addresses.insert(v.to_string()),
        _ => false,
    }
}

/// Add `value` to the ARN set if it starts with `arn:`. The account segment
/// goes to the account-id set only when the whole value parses as an ARN.
pub fn append_aws_arn(core: &mut CoreFields, value: Option<&str>) -> bool {
    let Some(raw) = value.filter(|v| v.starts_with(ARN_PREFIX)) else {
        return false;
    };
    if let Some(arn) = Arn::parse(raw).filter(|arn| !arn.account_id.is_empty()) {
        core.aws_account_ids.insert(arn.account_id.to_string());
    }
    core.aws_arns.insert(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn core() -> CoreFields {
        CoreFields::new("Test.Type", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_ipv4_and_ipv6_literals() {
        let mut c = core();
        assert!(append_ip_address(&mut c, Some("192.0.2.3")));
        assert!(append_ip_address(&mut c, Some("2001:db8::1")));
        assert_eq!(c.ip_addresses.len(), 2);
    }

    #[test]
    fn test_non_ip_values_are_skipped() {
        let mut c = core();
        for v in ["-", "", "example.com", "192.0.2", "192.0.2.256", "10.0.0.1:80", "[::1]"] {
            assert!(!append_ip_address(&mut c, Some(v)), "accepted {v:?}");
        }
        assert!(!append_ip_address(&mut c, None));
        assert!(c.ip_addresses.is_empty());
    }

    #[test]
    fn test_ip_set_deduplicates() {
        let mut c = core();
        append_ip_address(&mut c, Some("10.0.0.1"));
        append_ip_address(&mut c, Some("10.0.0.1"));
        assert_eq!(c.ip_addresses.len(), 1);
    }

    #[test]
    fn test_iam_user_arn() {
        let mut c = core();
        let arn = "arn:aws:iam::123456789012:user/alice";
        assert!(append_aws_arn(&mut c, Some(arn)));
        assert!(c.aws_arns.contains(arn));
        assert!(c.aws_account_ids.contains("123456789012"));
    }

    #[test]
    fn test_arn_without_account() {
        let mut c = core();
        let arn = "arn:aws:s3:::my-bucket/key";
        assert!(append_aws_arn(&mut c, Some(arn)));
        assert!(c.aws_arns.contains(arn));
        assert!(c.aws_account_ids.is_empty());
    }

    #[test]
    fn test_loose_arn_kept_without_account() {
        let mut c = core();
        for v in ["arn:aws:iam::aws:policy/ReadOnly", "arn:aws:IAM::123456789012:user/bob"] {
            assert!(append_aws_arn(&mut c, Some(v)), "skipped {v:?}");
            assert!(c.aws_arns.contains(v));
        }
        assert!(c.aws_account_ids.is_empty());
    }

    #[test]
    fn test_non_arn_requester_skipped() {
        let mut c = core();
        assert!(!append_aws_arn(&mut c, Some("79a59df900b949e55d96a1e698fbacedfd6e09d98eacf8f8d5218e7cd47ef2be")));
        assert!(!append_aws_arn(&mut c, Some("ARN:aws:iam::123456789012:user/bob")));
        assert!(!append_aws_arn(&mut c, None));
        assert!(c.aws_arns.is_empty());
    }

    #[test]
    fn test_resource_keeps_colons() {
        let arn = Arn::parse("arn:aws:sts::123456789012:assumed-role/role:session").unwrap();
        assert_eq!(arn.service, "sts");
        assert_eq!(arn.resource, "assumed-role/role:session");
    }

    #[test]
    fn test_malformed_arns_rejected() {
        for v in [
            "79a59df900b949e55d96a1e698fbacedfd6e09d98eacf8f8d5218e7cd47ef2be",
            "arn:",
            "arn:aws",
            "arn:aws:iam::123456789012",
            "arn:aws:iam::123456789012:",
            "arn:aws:iam::12345:user/bob",
            "arn:gcp:iam::123456789012:user/bob",
            "arn:aws:IAM::123456789012:user/bob",
            "arn:aws:iam::123456789012:user/bob smith",
        ] {
            assert!(Arn::parse(v).is_none(), "accepted {v:?}");
        }
    }
}
