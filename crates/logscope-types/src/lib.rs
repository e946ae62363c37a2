//! Shared types for logscope
//!
//! This crate contains data structures used across multiple logscope crates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Partition Types
// ============================================================================

/// A top-level log partition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    pub name: String,
}

impl Schema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A sub-partition belonging to exactly one schema
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    #[serde(alias = "schemaId", alias = "SchemaID", alias = "schemaID")]
    pub schema_id: String,
}

impl Module {
    pub fn new(id: impl Into<String>, name: impl Into<String>, schema_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema_id: schema_id.into(),
        }
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Canonical log severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [Self::Debug, Self::Info, Self::Warning, Self::Error];

    /// Map a backend level string onto the canonical set.
    ///
    /// Unknown values resolve to `Info`, so this never fails.
    pub fn from_raw(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warning" | "warn" => Self::Warning,
            "error" | "fatal" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Short display string (3 chars)
    pub fn short(&self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse, used for user input where a typo should be reported
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown level '{}' (expected debug, info, warning or error)",
                other
            )),
        }
    }
}

/// Who performed the logged operation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub id: String,
    pub ip: String,
    pub equipment: String,
    pub company: String,
    pub project: String,
}

impl OperatorInfo {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.ip.is_empty()
            && self.equipment.is_empty()
            && self.company.is_empty()
            && self.project.is_empty()
    }
}

/// A single normalized log entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    /// Synthesized ID, unique within a fetch batch
    pub id: String,

    /// ISO-8601 timestamp
    pub timestamp: String,

    pub level: LogLevel,

    pub service: String,

    pub message: String,

    /// Client address the record came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_info: Option<OperatorInfo>,

    /// Structured details; never an empty object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl LogEntry {
    /// Create an entry with fallback-free required fields and nothing else
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        level: LogLevel,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            level,
            service: service.into(),
            message: message.into(),
            source: None,
            module: None,
            operator: None,
            operator_info: None,
            details: None,
        }
    }

    /// The timestamp as a point in time, if it is in a recognised format
    pub fn time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Entries are shared between the full, filtered and displayed views
pub type ArcLogEntry = Arc<LogEntry>;

/// Parse the timestamp formats seen from the backend and from user input.
///
/// Zone-less values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Query Types
// ============================================================================

/// Inclusive time window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Optional constraints narrowing the displayed log set.
///
/// A `None` field places no constraint on that dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    pub level: Option<LogLevel>,
    pub service: Option<String>,
    pub source: Option<String>,
    pub time_range: Option<TimeWindow>,
    pub search_text: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.service.is_none()
            && self.source.is_none()
            && self.time_range.is_none()
            && self.search_text.is_none()
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pagination cursor over the filtered set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub current: usize,
    pub page_size: usize,
    /// Size of the filtered set
    pub total: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size,
            total: 0,
        }
    }

    /// Back to page 1 over a new filtered set
    pub fn reset(&mut self, total: usize) {
        self.current = 1;
        self.total = total;
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Relative time range for log filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RelativeRange {
    /// No time constraint
    #[default]
    All,
    Last5m,
    Last15m,
    Last30m,
    Last1h,
    Last6h,
    Last24h,
}

impl RelativeRange {
    /// Get the number of seconds for this time range
    pub fn as_seconds(&self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Last5m => Some(5 * 60),
            Self::Last15m => Some(15 * 60),
            Self::Last30m => Some(30 * 60),
            Self::Last1h => Some(60 * 60),
            Self::Last6h => Some(6 * 60 * 60),
            Self::Last24h => Some(24 * 60 * 60),
        }
    }

    /// Concrete window ending at `now`
    pub fn window(&self, now: DateTime<Utc>) -> Option<TimeWindow> {
        self.as_seconds()
            .map(|secs| TimeWindow::new(now - chrono::Duration::seconds(secs), now))
    }
}

impl FromStr for RelativeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "5m" => Ok(Self::Last5m),
            "15m" => Ok(Self::Last15m),
            "30m" => Ok(Self::Last30m),
            "1h" => Ok(Self::Last1h),
            "6h" => Ok(Self::Last6h),
            "24h" => Ok(Self::Last24h),
            other => Err(format!(
                "unknown range '{}' (expected all, 5m, 15m, 30m, 1h, 6h or 24h)",
                other
            )),
        }
    }
}

// ============================================================================
// Write Types
// ============================================================================

/// Body of a create-log request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateLogRequest {
    pub schema: String,
    pub module: String,
    pub output: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_project: Option<String>,
}

impl CreateLogRequest {
    /// Name of the first required field that is blank, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("schema", &self.schema),
            ("module", &self.module),
            ("output", &self.output),
            ("service", &self.service),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}
