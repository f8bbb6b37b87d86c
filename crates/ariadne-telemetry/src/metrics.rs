//! Logging metrics.
//!
//! Counters are emitted through the `metrics` facade; whichever recorder the
//! process installs (Prometheus, statsd, none) receives them.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ariadne_log_records_total` | Counter | `level` | Records written to the sink |
//! | `ariadne_log_write_failures_total` | Counter | - | Records lost to serialization or I/O errors |

use metrics::{counter, describe_counter};

use crate::level::LogLevel;

/// Name of the emitted-records counter.
pub const LOG_RECORDS_TOTAL: &str = "ariadne_log_records_total";

/// Name of the write-failure counter.
pub const LOG_WRITE_FAILURES_TOTAL: &str = "ariadne_log_write_failures_total";

/// Registers descriptions for the logging metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(LOG_RECORDS_TOTAL, "Structured log records written, by level");
    describe_counter!(
        LOG_WRITE_FAILURES_TOTAL,
        "Structured log records dropped because serialization or the sink failed"
    );
}

/// Records one emitted log record.
pub fn record_emitted(level: LogLevel) {
    counter!(LOG_RECORDS_TOTAL, "level" => level.as_str()).increment(1);
}

/// Records one dropped log record.
pub fn record_write_failure() {
    counter!(LOG_WRITE_FAILURES_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(LOG_RECORDS_TOTAL, "ariadne_log_records_total");
        assert_eq!(LOG_WRITE_FAILURES_TOTAL, "ariadne_log_write_failures_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_emitted(LogLevel::Info);
        record_write_failure();
    }
}
