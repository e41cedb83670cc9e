//! JSON encoding of exported spans.
//!
//! Each exported batch becomes one JSON document:
//!
//! ```json
//! {
//!   "service": "brainbox",
//!   "exportedAt": "2026-01-01T12:00:00.000Z",
//!   "spans": [
//!     {
//!       "name": "remote_request",
//!       "traceId": "…", "spanId": "…", "parentSpanId": null,
//!       "start": "2026-01-01T11:59:59.870Z",
//!       "durationMicros": 130412,
//!       "attributes": { "request": "search", "seq": 3 },
//!       "events": [{ "name": "…", "time": "…", "attributes": {} }],
//!       "status": "ok"
//!     }
//!   ]
//! }
//! ```
//!
//! Timestamps are RFC 3339 in UTC. Attributes are flattened into a JSON object
//! keyed by attribute name.

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use serde_json::{json, Map, Value as JsonValue};
use std::time::SystemTime;

/// Encodes span batches for a single service.
#[derive(Debug, Clone)]
pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Encodes `batch` into one JSON document.
    #[must_use]
    pub fn format_batch(&self, batch: &[SpanData]) -> JsonValue {
        json!({
            "service": self.service,
            "exportedAt": timestamp(SystemTime::now()),
            "spans": batch.iter().map(format_span).collect::<Vec<_>>(),
        })
    }
}

fn format_span(span: &SpanData) -> JsonValue {
    let duration = span
        .end_time
        .duration_since(span.start_time)
        .unwrap_or_default();
    let parent = (span.parent_span_id != SpanId::INVALID)
        .then(|| format!("{:016x}", span.parent_span_id));

    let events: Vec<JsonValue> = span
        .events
        .iter()
        .map(|event| {
            json!({
                "name": event.name,
                "time": timestamp(event.timestamp),
                "attributes": attribute_map(&event.attributes),
            })
        })
        .collect();

    json!({
        "name": span.name,
        "traceId": format!("{:032x}", span.span_context.trace_id()),
        "spanId": format!("{:016x}", span.span_context.span_id()),
        "parentSpanId": parent,
        "start": timestamp(span.start_time),
        "durationMicros": u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
        "attributes": attribute_map(&span.attributes),
        "events": events,
        "status": status_label(&span.status),
    })
}

/// RFC 3339 timestamp with millisecond precision.
pub(crate) fn timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn attribute_map(attributes: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

pub(crate) fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        // Arrays are rare in our spans; keep them readable.
        Value::Array(_) => json!(value.to_string()),
    }
}

fn status_label(status: &Status) -> JsonValue {
    match status {
        Status::Unset => json!("unset"),
        Status::Ok => json!("ok"),
        Status::Error { description } => json!({ "error": description.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn attributes_flatten_into_object() {
        let attrs = vec![
            KeyValue::new("request", "search"),
            KeyValue::new("seq", 3_i64),
            KeyValue::new("ok", true),
        ];
        assert_eq!(
            attribute_map(&attrs),
            json!({ "request": "search", "seq": 3, "ok": true })
        );
    }

    #[test]
    fn timestamps_are_utc_millis() {
        let time = UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(timestamp(time), "1970-01-01T00:00:01.500Z");
    }

    #[test]
    fn empty_batch_still_names_service() {
        let doc = SpanFormatter::new("brainbox").format_batch(&[]);
        assert_eq!(doc["service"], "brainbox");
        assert_eq!(doc["spans"], json!([]));
    }
}
