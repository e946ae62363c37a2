use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use logscope_types::{LogEntry, LogLevel, OperatorInfo, parse_timestamp};

// Key lists are in lookup priority order: upper-camel first, then snake_case.
const LEVEL_KEYS: &[&str] = &["LogLevel", "log_level"];
const DETAIL_KEYS: &[&str] = &["Detail", "detail"];
const ERROR_INFO_KEYS: &[&str] = &["ErrorInfo", "error_info"];
const TIME_KEYS: &[&str] = &["OperationTime", "operation_time"];
const SERVICE_KEYS: &[&str] = &["Service", "service"];
const MESSAGE_KEYS: &[&str] = &["Output", "output", "Message", "message"];
const SOURCE_KEYS: &[&str] = &["ClientAddr", "client_addr", "ClientIP", "client_ip"];
const MODULE_KEYS: &[&str] = &["Module", "module"];
const OPERATOR_KEYS: &[&str] = &["Operator", "operator"];
const OPERATOR_ID_KEYS: &[&str] = &["OperatorID", "operator_id"];
const OPERATOR_IP_KEYS: &[&str] = &["OperatorIP", "operator_ip"];
const OPERATOR_EQUIPMENT_KEYS: &[&str] = &["OperatorEquipment", "operator_equipment"];
const OPERATOR_COMPANY_KEYS: &[&str] = &["OperatorCompany", "operator_company"];
const OPERATOR_PROJECT_KEYS: &[&str] = &["OperatorProject", "operator_project"];

const UNKNOWN_SERVICE: &str = "unknown service";
const NO_MESSAGE: &str = "no message";
const UNKNOWN_SOURCE: &str = "unknown source";
const UNKNOWN_MODULE: &str = "unknown module";

/// Distinguishes batches fetched within the same nanosecond
static BATCH_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Normalizer for one fetched batch of raw log records.
///
/// Every entry it produces shares the batch stamp, so ids built from the
/// record index are unique within the batch and across batches.
pub struct LogNormalizer {
    batch: String,
    fetched_at: String,
}

impl LogNormalizer {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        let sequence = BATCH_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let nanos = fetched_at.timestamp_nanos_opt().unwrap_or_default();
        Self {
            batch: format!("{}-{}", nanos, sequence),
            fetched_at: fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Normalizer stamped with the current time
    pub fn for_batch() -> Self {
        Self::new(Utc::now())
    }

    /// Map one raw record into the canonical shape. Never fails: every
    /// field has a fallback, and a non-object record yields all fallbacks.
    pub fn normalize(&self, raw: &Value, index: usize) -> LogEntry {
        let obj = raw.as_object();

        let level = first_text(obj, LEVEL_KEYS)
            .map(|s| LogLevel::from_raw(&s))
            .unwrap_or_default();

        let timestamp = first_text(obj, TIME_KEYS)
            .map(|s| canonical_timestamp(&s))
            .unwrap_or_else(|| self.fetched_at.clone());

        let operator_info = OperatorInfo {
            id: first_text(obj, OPERATOR_ID_KEYS).unwrap_or_default(),
            ip: first_text(obj, OPERATOR_IP_KEYS).unwrap_or_default(),
            equipment: first_text(obj, OPERATOR_EQUIPMENT_KEYS).unwrap_or_default(),
            company: first_text(obj, OPERATOR_COMPANY_KEYS).unwrap_or_default(),
            project: first_text(obj, OPERATOR_PROJECT_KEYS).unwrap_or_default(),
        };

        LogEntry {
            id: format!("log-{}-{}", index, self.batch),
            timestamp,
            level,
            service: first_text(obj, SERVICE_KEYS).unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
            message: first_text(obj, MESSAGE_KEYS).unwrap_or_else(|| NO_MESSAGE.to_string()),
            source: Some(first_text(obj, SOURCE_KEYS).unwrap_or_else(|| UNKNOWN_SOURCE.to_string())),
            module: Some(first_text(obj, MODULE_KEYS).unwrap_or_else(|| UNKNOWN_MODULE.to_string())),
            operator: first_text(obj, OPERATOR_KEYS),
            operator_info: (!operator_info.is_empty()).then_some(operator_info),
            details: resolve_details(obj),
        }
    }
}

/// Normalize a raw log-list response. Anything but an array is empty.
pub fn normalize_logs(raw: &Value) -> Vec<LogEntry> {
    let Some(records) = raw.as_array() else {
        return Vec::new();
    };

    let normalizer = LogNormalizer::for_batch();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalizer.normalize(record, index))
        .collect()
}

/// Build the details object from the detail and error-info fields
fn resolve_details(obj: Option<&Map<String, Value>>) -> Option<Map<String, Value>> {
    let mut details = match first_present(obj, DETAIL_KEYS) {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            _ => wrap_text(text.clone()),
        },
        Some(other) => wrap_text(other.to_string()),
        None => Map::new(),
    };

    if let Some(error_info) = first_present(obj, ERROR_INFO_KEYS) {
        details.insert("errorInfo".to_string(), error_info.clone());
    }

    (!details.is_empty()).then_some(details)
}

fn wrap_text(text: String) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("text".to_string(), Value::String(text));
    map
}

/// Re-emit recognised timestamps as RFC 3339 UTC; keep anything else verbatim
fn canonical_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        None => raw.to_string(),
    }
}

/// First value under `keys` that is neither null nor an empty string
pub(crate) fn first_present<'a>(
    obj: Option<&'a Map<String, Value>>,
    keys: &[&str],
) -> Option<&'a Value> {
    let obj = obj?;
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
}

/// First scalar under `keys`, rendered as text. Empty strings count as absent.
pub(crate) fn first_text(obj: Option<&Map<String, Value>>, keys: &[&str]) -> Option<String> {
    let obj = obj?;
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
}
