//! Context-enriched structured logger.
//!
//! [`StructuredLogger`] writes one JSON object per line. Every record merges
//! three sources:
//!
//! - the static [`AppIdentity`] of the service,
//! - the [`ContextRecord`](ariadne_core::ContextRecord) bound to the calling
//!   chain, read at emission time,
//! - the caller-supplied [`LogEntry`].
//!
//! ```text
//! {"app_name":"orders","app_version":"2.3.0","level":"INFO","message":"order placed",
//!  "iso_timestamp":"2024-05-01T08:30:00.125Z","context":{"requestId":"r1",...},
//!  "details":{...},"indexed_details_s":{...},"indexed_details_n":{...}}
//! ```
//!
//! Logging is safe to call from anywhere. Outside a chain the `context`
//! field is `{}`, and serialization or sink failures are reported on the
//! `tracing` diagnostics channel instead of reaching the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use ariadne_core::{AppIdentity, ContextSource, ContextStore};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::level::LogLevel;
use crate::metrics;

/// Byte stream that receives serialized records.
pub type LogSink = Box<dyn Write + Send>;

/// Source of emission timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// One log call: a message plus optional structured details.
///
/// # Example
///
/// ```
/// use ariadne_telemetry::LogEntry;
///
/// let entry = LogEntry::new("order placed")
///     .detail("items", vec!["a", "b"])
///     .indexed_s("order_id", "o-17")
///     .indexed_n("amount_cents", 1299);
///
/// assert_eq!(entry.message(), "order placed");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEntry {
    message: String,
    details: Option<Map<String, Value>>,
    indexed_details_s: Option<BTreeMap<String, String>>,
    indexed_details_n: Option<BTreeMap<String, Number>>,
}

impl LogEntry {
    /// Creates an entry with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Adds one free-form detail.
    ///
    /// Values that cannot be represented as JSON are recorded as `null`.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Replaces all free-form details.
    #[must_use]
    pub fn details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds one indexed string detail.
    #[must_use]
    pub fn indexed_s(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.indexed_details_s
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds one indexed integer detail.
    #[must_use]
    pub fn indexed_n(mut self, key: impl Into<String>, value: impl Into<Number>) -> Self {
        self.indexed_details_n
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds one indexed floating point detail.
    ///
    /// NaN and infinities have no JSON representation and are skipped.
    #[must_use]
    pub fn indexed_f(mut self, key: impl Into<String>, value: f64) -> Self {
        if let Some(number) = Number::from_f64(value) {
            self.indexed_details_n
                .get_or_insert_with(BTreeMap::new)
                .insert(key.into(), number);
        }
        self
    }

    /// Attaches an error as `details.error`.
    ///
    /// Records the error's message and the messages of its source chain, so
    /// wrapped I/O or downstream failures stay readable in one record.
    #[must_use]
    pub fn with_error(self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let mut described = Map::new();
        described.insert("message".to_string(), Value::String(error.to_string()));
        if !causes.is_empty() {
            described.insert(
                "causes".to_string(),
                Value::Array(causes.into_iter().map(Value::String).collect()),
            );
        }
        self.detail("error", Value::Object(described))
    }
}

impl From<&str> for LogEntry {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for LogEntry {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Serialized shape of one record.
#[derive(Serialize)]
struct LogRecord<'a> {
    app_name: &'a str,
    app_version: &'a str,
    level: LogLevel,
    message: &'a str,
    iso_timestamp: String,
    context: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indexed_details_s: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indexed_details_n: Option<&'a BTreeMap<String, Number>>,
}

/// Structured logger that enriches every record with the active context.
///
/// Constructed explicitly by whichever component assembles the process and
/// shared behind an `Arc`.
///
/// # Example
///
/// ```
/// use ariadne_core::{AppIdentity, ContextRecord, ContextStore};
/// use ariadne_telemetry::{LogEntry, LogLevel, StructuredLogger};
///
/// # tokio_test::block_on(async {
/// let store = ContextStore::new();
/// let logger = StructuredLogger::builder(AppIdentity::new("orders", "2.3.0"))
///     .minimum_level(LogLevel::Info)
///     .sink(Box::new(std::io::sink()))
///     .context_source(store)
///     .build();
///
/// store
///     .scope(ContextRecord::new("r1", "c1"), async {
///         logger.info(LogEntry::new("order placed").indexed_s("order_id", "o-17"));
///     })
///     .await;
///
/// // Outside a chain the record is still written, with an empty context.
/// logger.warn("cache warmup slow");
/// # });
/// ```
pub struct StructuredLogger {
    identity: AppIdentity,
    minimum_level: LogLevel,
    sink: Option<Mutex<LogSink>>,
    source: Arc<dyn ContextSource>,
    clock: Clock,
    redact_access_token: bool,
}

impl StructuredLogger {
    /// Creates a logger.
    ///
    /// A `None` sink discards every record without error.
    #[must_use]
    pub fn new(
        identity: AppIdentity,
        minimum_level: LogLevel,
        sink: Option<LogSink>,
        source: Arc<dyn ContextSource>,
    ) -> Self {
        Self {
            identity,
            minimum_level,
            sink: sink.map(Mutex::new),
            source,
            clock: Arc::new(Utc::now),
            redact_access_token: false,
        }
    }

    /// Creates a logger builder.
    #[must_use]
    pub fn builder(identity: AppIdentity) -> StructuredLoggerBuilder {
        StructuredLoggerBuilder::new(identity)
    }

    /// Creates a logger that discards everything.
    #[must_use]
    pub fn disabled(identity: AppIdentity) -> Self {
        Self::new(identity, LogLevel::Error, None, Arc::new(ContextStore::new()))
    }

    /// Returns the service identity stamped on every record.
    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// Returns the minimum level that is written.
    #[must_use]
    pub fn minimum_level(&self) -> LogLevel {
        self.minimum_level
    }

    /// Returns `true` when records of `level` are written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.minimum_level
    }

    /// Logs at debug level.
    pub fn debug(&self, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Debug, entry);
    }

    /// Logs at info level.
    pub fn info(&self, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Info, entry);
    }

    /// Logs at warn level.
    pub fn warn(&self, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Warn, entry);
    }

    /// Logs at error level.
    pub fn error(&self, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Error, entry);
    }

    /// Logs `entry` at `level`.
    ///
    /// Below the minimum level this returns before building anything.
    pub fn log(&self, level: LogLevel, entry: impl Into<LogEntry>) {
        if !self.enabled(level) {
            return;
        }
        let entry = entry.into();

        match self.render(level, &entry) {
            Ok(line) => self.write_line(level, &line),
            Err(e) => {
                metrics::record_write_failure();
                tracing::warn!(error = %e, level = %level, "failed to serialize log record");
            }
        }
    }

    /// Renders one record as a newline-terminated JSON line.
    ///
    /// Exposed for transports that ship records somewhere other than the
    /// configured sink.
    pub fn render(&self, level: LogLevel, entry: &LogEntry) -> serde_json::Result<String> {
        let record = LogRecord {
            app_name: &self.identity.name,
            app_version: &self.identity.version,
            level,
            message: &entry.message,
            iso_timestamp: (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true),
            context: self.context(),
            details: entry.details.as_ref(),
            indexed_details_s: entry.indexed_details_s.as_ref(),
            indexed_details_n: entry.indexed_details_n.as_ref(),
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        Ok(line)
    }

    fn context(&self) -> Map<String, Value> {
        match self.source.current() {
            Ok(record) => {
                let mut context = record.to_json_object();
                if self.redact_access_token {
                    context.remove("accessToken");
                }
                context
            }
            Err(_) => Map::new(),
        }
    }

    fn write_line(&self, level: LogLevel, line: &str) {
        let Some(sink) = &self.sink else {
            return;
        };

        let mut sink = sink.lock();
        match sink.write_all(line.as_bytes()).and_then(|()| sink.flush()) {
            Ok(()) => metrics::record_emitted(level),
            Err(e) => {
                metrics::record_write_failure();
                tracing::warn!(error = %e, level = %level, "failed to write log record");
            }
        }
    }
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("identity", &self.identity)
            .field("minimum_level", &self.minimum_level)
            .field("has_sink", &self.sink.is_some())
            .field("redact_access_token", &self.redact_access_token)
            .finish_non_exhaustive()
    }
}

/// Builder for [`StructuredLogger`].
pub struct StructuredLoggerBuilder {
    identity: AppIdentity,
    minimum_level: LogLevel,
    sink: Option<LogSink>,
    source: Option<Arc<dyn ContextSource>>,
    clock: Option<Clock>,
    redact_access_token: bool,
}

impl StructuredLoggerBuilder {
    /// Creates a builder with level `Info`, no sink and the default store.
    #[must_use]
    pub fn new(identity: AppIdentity) -> Self {
        Self {
            identity,
            minimum_level: LogLevel::Info,
            sink: None,
            source: None,
            clock: None,
            redact_access_token: false,
        }
    }

    /// Sets the minimum level.
    #[must_use]
    pub fn minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Sets the sink.
    #[must_use]
    pub fn sink(mut self, sink: LogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets an optional sink; `None` discards records.
    #[must_use]
    pub fn sink_opt(mut self, sink: Option<LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the context source.
    #[must_use]
    pub fn context_source(mut self, source: impl ContextSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets the timestamp source.
    #[must_use]
    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Drops `access_token` from the emitted `context`.
    #[must_use]
    pub fn redact_access_token(mut self, redact: bool) -> Self {
        self.redact_access_token = redact;
        self
    }

    /// Builds the logger.
    #[must_use]
    pub fn build(self) -> StructuredLogger {
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(ContextStore::new()));
        let mut logger = StructuredLogger::new(self.identity, self.minimum_level, self.sink, source);
        if let Some(clock) = self.clock {
            logger.clock = clock;
        }
        logger.redact_access_token = self.redact_access_token;
        logger
    }
}
