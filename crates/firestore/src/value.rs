//! Typed field values as the Firestore REST API expects them.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use geopush_core::UserRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// 64-bit integers travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    /// RFC 3339, UTC.
    TimestampValue(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Document {
    pub fn with_fields(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }
}

/// Fixed schema: `first`, `last`, `born`, `createdAt`, `lat`, `lon`.
/// A record without a location is written with sentinel coordinates.
pub fn encode_record(record: &UserRecord) -> BTreeMap<String, Value> {
    let coords = record.stored_coordinates();
    let mut fields = BTreeMap::new();
    fields.insert(
        "first".to_string(),
        Value::StringValue(record.identity.first.clone()),
    );
    fields.insert(
        "last".to_string(),
        Value::StringValue(record.identity.last.clone()),
    );
    fields.insert(
        "born".to_string(),
        Value::IntegerValue(record.identity.born.to_string()),
    );
    fields.insert(
        "createdAt".to_string(),
        Value::TimestampValue(
            record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
    );
    fields.insert("lat".to_string(), Value::DoubleValue(coords.latitude));
    fields.insert("lon".to_string(), Value::DoubleValue(coords.longitude));
    fields
}
