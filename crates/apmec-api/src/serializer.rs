//! Converts between structured request/response data and the wire
//! formats (JSON or XML), given plural/namespace metadata.

use crate::errors::{ApiError, Result};
use crate::xml;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// XML namespace of the v1.0 API.
pub const XML_NS_V10: &str = "http://apmec.org/api/v1.0";

/// Wire format of a client session. Changing it changes both the
/// content-type sent and the `.json`/`.xml` path suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Xml,
}

impl WireFormat {
    pub fn suffix(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Xml => "xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            WireFormat::Json => "application/json",
            WireFormat::Xml => "application/xml",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for WireFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(WireFormat::Json),
            "xml" => Ok(WireFormat::Xml),
            other => Err(ApiError::InvalidInput(format!(
                "Unknown request format: {}",
                other
            ))),
        }
    }
}

/// Pluralization and namespace tables required by the XML format.
/// Empty for JSON sessions.
#[derive(Debug, Clone, Default)]
pub struct AttrMetadata {
    /// Plural collection key to singular member name.
    pub plurals: HashMap<String, String>,
    /// Default document namespace.
    pub xmlns: String,
    /// Extension alias to namespace, from the extensions endpoint.
    pub extension_ns: HashMap<String, String>,
}

/// Format-aware serializer for request and response envelopes.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    metadata: AttrMetadata,
}

impl Serializer {
    pub fn new(metadata: AttrMetadata) -> Self {
        Self { metadata }
    }

    /// Serialize a mapping with arbitrary nested structure.
    pub fn serialize(&self, data: &Value, format: WireFormat) -> Result<String> {
        if !data.is_object() {
            return Err(ApiError::Serialization(format!(
                "Unable to serialize object of type = '{}'",
                type_name(data)
            )));
        }
        match format {
            WireFormat::Json => serde_json::to_string(data)
                .map_err(|e| ApiError::Serialization(e.to_string())),
            WireFormat::Xml => xml::encode(data, &self.metadata),
        }
    }

    /// Deserialize a raw body into its structured payload.
    ///
    /// Status 204 never reaches this point - the request client passes
    /// the raw body through unchanged for that status.
    pub fn deserialize(&self, raw: &str, format: WireFormat) -> Result<Value> {
        match format {
            WireFormat::Json => serde_json::from_str(raw)
                .map_err(|e| ApiError::Serialization(e.to_string())),
            WireFormat::Xml => xml::decode(raw, &self.metadata),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn xml_serializer() -> Serializer {
        Serializer::new(AttrMetadata {
            plurals: apmec_core::plural_table(),
            xmlns: XML_NS_V10.to_string(),
            extension_ns: HashMap::new(),
        })
    }

    #[test]
    fn json_round_trip_reproduces_input() {
        let body = json!({
            "mea": {
                "name": "probe",
                "attributes": {"depth": 3, "tags": ["a", "b"]},
                "placement": null
            }
        });
        let serializer = Serializer::default();
        let wire = serializer.serialize(&body, WireFormat::Json).unwrap();
        let back = serializer.deserialize(&wire, WireFormat::Json).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn serialize_rejects_non_mapping() {
        let serializer = Serializer::default();
        let err = serializer
            .serialize(&json!([1, 2, 3]), WireFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn xml_lists_use_singular_member_names() {
        let body = json!({"meas": [{"name": "m1"}, {"name": "m2"}]});
        let wire = xml_serializer().serialize(&body, WireFormat::Xml).unwrap();
        assert!(wire.contains("<meas"), "wire: {}", wire);
        assert_eq!(wire.matches("<mea>").count(), 2, "wire: {}", wire);
        assert!(wire.contains("<name>m1</name>"), "wire: {}", wire);
    }

    #[test]
    fn xml_decode_builds_nested_mapping() {
        let wire = "<mea><name>probe</name><status>ACTIVE</status></mea>";
        let value = xml_serializer().deserialize(wire, WireFormat::Xml).unwrap();
        assert_eq!(value["mea"]["name"], "probe");
        assert_eq!(value["mea"]["status"], "ACTIVE");
    }

    #[test]
    fn xml_decode_collects_registered_plurals_as_arrays() {
        let wire = "<meas><mea><name>m1</name></mea><mea><name>m2</name></mea></meas>";
        let value = xml_serializer().deserialize(wire, WireFormat::Xml).unwrap();
        let items = value["meas"].as_array().expect("array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["name"], "m2");
    }

    #[test]
    fn xml_nil_round_trips_to_null() {
        let body = json!({"mea": {"placement": null}});
        let serializer = xml_serializer();
        let wire = serializer.serialize(&body, WireFormat::Xml).unwrap();
        let back = serializer.deserialize(&wire, WireFormat::Xml).unwrap();
        assert_eq!(back["mea"]["placement"], Value::Null);
    }

    #[test]
    fn wire_format_parses_known_names() {
        assert_eq!("json".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert_eq!("xml".parse::<WireFormat>().unwrap(), WireFormat::Xml);
        assert!("yaml".parse::<WireFormat>().is_err());
    }
}
