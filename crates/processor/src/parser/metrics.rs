use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Why a line produced no event, as seen from the ingestion side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Parser returned nothing (structure, timestamp or validation failure)
    Rejected,
    /// Line exceeded the configured maximum size
    TooLarge,
}

/// Forces the wrapped counters onto their own cache line so concurrent
/// ingest tasks updating different groups don't contend.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Hot per-line counters
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub read: AtomicU64,
    pub events: AtomicU64,
    pub parse_time_nanos: AtomicU64,
}

#[derive(Debug, Default)]
pub struct DropMetrics {
    pub rejected: AtomicU64,
    pub too_large: AtomicU64,
}

#[derive(Debug, Default)]
pub struct DispatchMetrics {
    pub unknown_log_type: AtomicU64,
}

/// Counters for one ingestion run.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` is not transactional
/// across fields, which is fine for observability.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    pub lines: CacheAligned<LineMetrics>,
    pub drops: CacheAligned<DropMetrics>,
    pub dispatch: CacheAligned<DispatchMetrics>,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines.0.read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one parse call.
    #[inline]
    pub fn record_parse(&self, events: usize, time_nanos: u64) {
        self.lines.0.parse_time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
        if events == 0 {
            self.record_drop(DropReason::Rejected);
        } else {
            self.lines.0.events.fetch_add(events as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_drop(&self, reason: DropReason) {
        match reason {
            DropReason::Rejected => self.drops.0.rejected.fetch_add(1, Ordering::Relaxed),
            DropReason::TooLarge => self.drops.0.too_large.fetch_add(1, Ordering::Relaxed),
        };
    }

    #[inline]
    pub fn record_unknown_log_type(&self) {
        self.dispatch.0.unknown_log_type.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let lines_read = self.lines.0.read.load(Ordering::Relaxed);
        let events_emitted = self.lines.0.events.load(Ordering::Relaxed);
        let rejected = self.drops.0.rejected.load(Ordering::Relaxed);
        let too_large = self.drops.0.too_large.load(Ordering::Relaxed);
        let time_ns = self.lines.0.parse_time_nanos.load(Ordering::Relaxed);
        let parsed = lines_read.saturating_sub(too_large);

        MetricsSnapshot {
            lines_read,
            events_emitted,
            records_rejected: rejected,
            lines_too_large: too_large,
            unknown_log_type: self.dispatch.0.unknown_log_type.load(Ordering::Relaxed),
            avg_parse_time_us: if parsed > 0 {
                (time_ns as f64 / parsed as f64) / 1000.0
            } else {
                0.0
            },
            acceptance_rate: if lines_read > 0 {
                lines_read.saturating_sub(rejected + too_large) as f64 / lines_read as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only snapshot of ingestion metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub events_emitted: u64,
    pub records_rejected: u64,
    pub lines_too_large: u64,
    pub unknown_log_type: u64,
    pub avg_parse_time_us: f64,
    pub acceptance_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_basic_recording() {
        let metrics = IngestMetrics::new();

        metrics.record_line();
        metrics.record_parse(1, 1_000);
        metrics.record_line();
        metrics.record_parse(0, 3_000);
        metrics.record_line();
        metrics.record_drop(DropReason::TooLarge);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_read, 3);
        assert_eq!(snapshot.events_emitted, 1);
        assert_eq!(snapshot.records_rejected, 1);
        assert_eq!(snapshot.lines_too_large, 1);
        assert!((snapshot.avg_parse_time_us - 2.0).abs() < f64::EPSILON);
        assert!((snapshot.acceptance_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = IngestMetrics::new().snapshot();
        assert_eq!(snapshot.lines_read, 0);
        assert_eq!(snapshot.avg_parse_time_us, 0.0);
        assert_eq!(snapshot.acceptance_rate, 1.0);
    }

    #[test]
    fn test_cache_alignment() {
        let metrics = IngestMetrics::new();
        let lines = &metrics.lines as *const _ as usize;
        let drops = &metrics.drops as *const _ as usize;
        assert_eq!(lines % 64, 0);
        assert_eq!(drops % 64, 0);
        assert!(lines.abs_diff(drops) >= 64);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(IngestMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_line();
                        m.record_parse(1, 10);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_read, 4000);
        assert_eq!(snapshot.events_emitted, 4000);
        assert_eq!(snapshot.unknown_log_type, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = IngestMetrics::new();
        metrics.record_unknown_log_type();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["unknown_log_type"], 1);
    }
}
