use std::fmt::{Display, Formatter};

use kimp_core::{RateOrigin, UtcDateTime};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Request identifier (UUID v4) attached to every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Envelope metadata. Field order is fixed for stable JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub request_id: RequestId,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate_origin: Option<RateOrigin>,
    pub warnings: Vec<String>,
}

/// JSON document written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub meta: Meta,
    pub data: Value,
}

impl Envelope {
    pub fn new(data: Value, latency_ms: u64) -> Self {
        Self {
            meta: Meta {
                request_id: RequestId::new_v4(),
                generated_at: UtcDateTime::now(),
                latency_ms,
                exchange_rate_origin: None,
                warnings: Vec::new(),
            },
            data,
        }
    }

    pub fn with_rate_origin(mut self, origin: Option<RateOrigin>) -> Self {
        self.meta.exchange_rate_origin = origin;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.meta.warnings.extend(warnings);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn rate_origin_is_omitted_when_unknown() {
        let envelope = Envelope::new(json!({}), 12);
        let rendered = serde_json::to_value(&envelope).expect("serializes");
        assert!(rendered["meta"].get("exchange_rate_origin").is_none());
        assert_eq!(rendered["meta"]["latency_ms"], 12);

        let envelope = envelope.with_rate_origin(Some(RateOrigin::Fallback));
        let rendered = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(rendered["meta"]["exchange_rate_origin"], "fallback");
    }
}
