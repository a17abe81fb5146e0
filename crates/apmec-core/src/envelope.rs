use crate::errors::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Maximum description length shown in list output before truncation.
pub const DEFAULT_DESC_LENGTH: usize = 25;

/// Maximum error_reason length shown in list output before truncation.
pub const DEFAULT_ERROR_REASON_LENGTH: usize = 100;

// The API has no way to report plurals, so they are hard coded here.
// Entries are (plural, singular); anything absent follows the "+s" rule.
const PLURALS: &[(&str, &str)] = &[
    ("meads", "mead"),
    ("meas", "mea"),
    ("vims", "vim"),
    ("mesds", "mesd"),
    ("mess", "mes"),
    ("mecads", "mecad"),
    ("mecas", "meca"),
    ("events", "event"),
    ("extensions", "extension"),
    ("resources", "resource"),
    ("service_types", "service_type"),
];

/// Plural form of a resource name, consulting the irregular table first.
pub fn plural_of(singular: &str) -> String {
    for (plural, known) in PLURALS {
        if *known == singular {
            return (*plural).to_string();
        }
    }
    format!("{}s", singular)
}

/// Plural-to-singular lookup table used by the XML serializer metadata.
pub fn plural_table() -> HashMap<String, String> {
    PLURALS
        .iter()
        .map(|(p, s)| ((*p).to_string(), (*s).to_string()))
        .collect()
}

/// Key under which a collection response carries its pagination links.
pub fn links_key(collection: &str) -> String {
    format!("{}_links", collection)
}

/// A pagination link found under `"<collection>_links"`.
///
/// `rel` is `"next"` or `"previous"`; absence of a matching link ends
/// the pagination stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub rel: String,
    pub href: String,
}

/// Wrap a payload in a single-key resource envelope.
pub fn wrap_resource(name: &str, payload: Value) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), payload);
    Value::Object(map)
}

/// Unwrap a single-key resource envelope, checking the key matches.
pub fn unwrap_resource<'a>(name: &str, envelope: &'a Value) -> Result<&'a Value> {
    let map = envelope
        .as_object()
        .ok_or_else(|| CoreError::MalformedEnvelope("envelope is not a mapping".to_string()))?;
    map.get(name).ok_or_else(|| {
        CoreError::MalformedEnvelope(format!("envelope is missing the '{}' key", name))
    })
}

/// Truncate a string to `max` characters, appending `...` when cut.
pub fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
