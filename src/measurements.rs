use std::time::Duration;

use serde::Serialize;

use crate::source_sink::IoType;

pub trait ToJson {
    fn to_json(&self) -> JsonValue;
}

#[derive(Serialize)]
pub struct JsonValue {
    pub name: String,
    pub storage: String,
    pub unit: String,
    pub value: u128,
    pub commit_id: String,
}

/// A single timed benchmark run against one backing store.
#[derive(Clone, Debug)]
pub struct IoMeasurement {
    pub name: String,
    pub io_type: IoType,
    /// Payload bytes moved through the sink or source.
    pub bytes: u64,
    pub time: Duration,
}

impl ToJson for IoMeasurement {
    fn to_json(&self) -> JsonValue {
        JsonValue {
            name: format!("{name}/{io_type}", name = self.name, io_type = self.io_type),
            storage: self.io_type.name().to_string(),
            unit: "ns".to_string(),
            value: self.time.as_nanos(),
            commit_id: crate::GIT_COMMIT_ID.to_string(),
        }
    }
}
