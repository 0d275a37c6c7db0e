//! Ingest: drives input lines through the parser registry and writes events.
//!
//! One line in, zero or more events out. Per-line failures never stop the
//! loop; only I/O errors and an unknown log type end a run early.

use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::conf::{OutputFormat, ProcessorConfig};
use crate::parser::metrics::{DropReason, IngestMetrics};
use crate::parser::{ParseError, ParserRegistry, RawRecord, RegistryError, StructuredEvent};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read lines until EOF, parse each with the configured log type and write
/// every emitted event to `writer`.
pub async fn run<R, W>(
    registry: &ParserRegistry,
    config: &ProcessorConfig,
    mut reader: R,
    mut writer: W,
    metrics: &IngestMetrics,
) -> Result<(), IngestError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let log_type = config.log_type.as_str();
    if let Err(e) = registry.get(log_type) {
        metrics.record_unknown_log_type();
        return Err(e.into());
    }

    // Room for a full line plus "\r\n"; anything longer is never buffered
    let limit = config.max_line_size as u64 + 2;
    let mut buf = Vec::new();
    let mut first_line = true;

    loop {
        buf.clear();
        if (&mut reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        metrics.record_line();
        let is_header = std::mem::take(&mut first_line) && config.has_header;

        let mut size = line_content(&buf).len();
        if !buf.ends_with(b"\n") && buf.len() as u64 >= limit {
            size += discard_rest_of_line(&mut reader).await?;
        }
        if size > config.max_line_size {
            let err = ParseError::LineTooLarge(size, config.max_line_size);
            warn!(log_type, error = %err, "dropping line");
            metrics.record_drop(DropReason::TooLarge);
            continue;
        }

        // Non-UTF8 bytes are replaced rather than failing the line
        let line = String::from_utf8_lossy(line_content(&buf));
        let record = RawRecord::new(log_type, &line);

        let started = Instant::now();
        let events = if is_header {
            debug!(log_type, "parsing first line as header");
            registry.parse_header(&record)?
        } else {
            registry.parse(&record)?
        };
        metrics.record_parse(events.len(), started.elapsed().as_nanos() as u64);

        for event in &events {
            write_event(&mut writer, event, config.output).await?;
        }
    }

    writer.flush().await?;
    info!(log_type, metrics = ?metrics.snapshot(), "ingest finished");
    Ok(())
}

/// Strip the line terminator, `\n` or `\r\n`.
fn line_content(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Consume input up to and including the next newline, returning how many
/// bytes were skipped before it.
async fn discard_rest_of_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(skipped);
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(skipped + i);
            }
            None => {
                let n = chunk.len();
                reader.consume(n);
                skipped += n;
            }
        }
    }
}

async fn write_event<W>(writer: &mut W, event: &StructuredEvent, output: OutputFormat) -> Result<(), IngestError>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = match output {
        OutputFormat::Json => serde_json::to_vec(event)?,
        OutputFormat::Pretty => serde_json::to_vec_pretty(event)?,
    };
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "79a59df900b949e55d96a1e698fbacedfd6e09d98eacf8f8d5218e7cd47ef2be mybucket \
[06/Feb/2019:00:00:38 +0000] 192.0.2.3 arn:aws:iam::123456789012:user/alice 3E57427F3EXAMPLE \
REST.GET.OBJECT photos/a.jpg \"GET /mybucket/photos/a.jpg HTTP/1.1\" 200 - 2662992 3462992 70 10 \
\"-\" \"curl/7.68.0\" - hostid== SigV4 ECDHE-RSA-AES128-GCM-SHA256 AuthHeader \
mybucket.s3.us-west-1.amazonaws.com TLSv1.2";

    async fn ingest(input: &str, config: &ProcessorConfig) -> (Result<(), IngestError>, String, IngestMetrics) {
        let metrics = IngestMetrics::new();
        let mut out = Vec::new();
        let result = run(ParserRegistry::global(), config, input.as_bytes(), &mut out, &metrics).await;
        (result, String::from_utf8(out).unwrap(), metrics)
    }

    #[tokio::test]
    async fn test_valid_lines_emit_events() {
        let input = format!("{LINE}\n{LINE}\n");
        let (result, out, metrics) = ingest(&input, &ProcessorConfig::default()).await;
        assert!(result.is_ok());

        let events: Vec<serde_json::Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["bucket"], "mybucket");
        assert_eq!(events[0]["p_any_aws_account_ids"], serde_json::json!(["123456789012"]));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_read, 2);
        assert_eq!(snapshot.events_emitted, 2);
    }

    #[tokio::test]
    async fn test_bad_lines_are_skipped() {
        let input = format!("garbage\n{LINE}\n\n{}\n", LINE.replace(" 200 ", " 700 "));
        let (result, out, metrics) = ingest(&input, &ProcessorConfig::default()).await;
        assert!(result.is_ok());
        assert_eq!(out.lines().count(), 1);
        assert_eq!(metrics.snapshot().records_rejected, 3);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let (_, out, _) = ingest(LINE, &ProcessorConfig::default()).await;
        assert_eq!(out.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_log_type_ends_run() {
        let config = ProcessorConfig { log_type: "Nope.Nothing".to_string(), ..ProcessorConfig::default() };
        let (result, out, metrics) = ingest(LINE, &config).await;
        assert!(matches!(
            result,
            Err(IngestError::Registry(RegistryError::UnknownLogType(_)))
        ));
        assert!(out.is_empty());
        assert_eq!(metrics.snapshot().unknown_log_type, 1);
    }

    #[tokio::test]
    async fn test_oversized_line_dropped() {
        let config = ProcessorConfig { max_line_size: 64, ..ProcessorConfig::default() };
        let (result, out, metrics) = ingest(&format!("{LINE}\n"), &config).await;
        assert!(result.is_ok());
        assert!(out.is_empty());
        assert_eq!(metrics.snapshot().lines_too_large, 1);
    }

    #[tokio::test]
    async fn test_oversized_line_skipped_up_to_newline() {
        let config = ProcessorConfig { max_line_size: LINE.len(), ..ProcessorConfig::default() };
        let input = format!("{}\n{LINE}\n", "x".repeat(10_000));
        let metrics = IngestMetrics::new();
        let mut out = Vec::new();
        let reader = tokio::io::BufReader::with_capacity(16, input.as_bytes());
        let result = run(ParserRegistry::global(), &config, reader, &mut out, &metrics).await;

        assert!(result.is_ok());
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_read, 2);
        assert_eq!(snapshot.lines_too_large, 1);
        assert_eq!(snapshot.events_emitted, 1);
    }

    #[tokio::test]
    async fn test_line_at_size_limit_is_parsed() {
        let config = ProcessorConfig { max_line_size: LINE.len(), ..ProcessorConfig::default() };
        let (_, out, metrics) = ingest(&format!("{LINE}\r\n{LINE}"), &config).await;
        assert_eq!(out.lines().count(), 2);
        assert_eq!(metrics.snapshot().lines_too_large, 0);
    }

    #[tokio::test]
    async fn test_crlf_terminator_stripped() {
        let (_, out, _) = ingest(&format!("{LINE}\r\n"), &ProcessorConfig::default()).await;
        let event: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(event["tlsVersion"], "TLSv1.2");
    }

    #[test]
    fn test_line_content() {
        assert_eq!(line_content(b"a b\r\n"), b"a b");
        assert_eq!(line_content(b"a b\n"), b"a b");
        assert_eq!(line_content(b"a b"), b"a b");
        assert_eq!(line_content(b"\r"), b"");
    }

    #[tokio::test]
    async fn test_header_line_goes_through_parse_header() {
        let config = ProcessorConfig { has_header: true, ..ProcessorConfig::default() };
        let input = format!("bucketowner bucket time remoteip\n{LINE}\n");
        let (result, out, metrics) = ingest(&input, &config).await;
        assert!(result.is_ok());
        assert_eq!(out.lines().count(), 1);
        assert_eq!(metrics.snapshot().records_rejected, 1);
    }

    #[tokio::test]
    async fn test_pretty_output() {
        let config = ProcessorConfig { output: OutputFormat::Pretty, ..ProcessorConfig::default() };
        let (_, out, _) = ingest(LINE, &config).await;
        let event: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(event["p_log_type"], "AWS.S3ServerAccess");
        assert!(out.lines().count() > 1);
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_not_fatal() {
        let mut input = b"\xff\xfe broken\n".to_vec();
        input.extend_from_slice(LINE.as_bytes());
        let metrics = IngestMetrics::new();
        let mut out = Vec::new();
        let result = run(ParserRegistry::global(), &ProcessorConfig::default(), &input[..], &mut out, &metrics).await;
        assert!(result.is_ok());
        assert_eq!(metrics.snapshot().events_emitted, 1);
    }
}
