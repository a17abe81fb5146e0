//! XML wire codec.
//!
//! Documents are single-key envelopes: the root element is the envelope
//! key, list-valued fields render one child element per item named by
//! the singular form from the plural table, and null values carry
//! `xsi:nil="true"`. Leaf text is untyped - scalars decode as strings.

use crate::errors::{ApiError, Result};
use crate::serializer::AttrMetadata;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const NIL_ATTR: &str = "xsi:nil";

pub fn encode(data: &Value, metadata: &AttrMetadata) -> Result<String> {
    let map = data
        .as_object()
        .ok_or_else(|| ApiError::Serialization("XML body must be a mapping".to_string()))?;
    let (root, payload) = match map.iter().next() {
        Some(entry) if map.len() == 1 => entry,
        _ => {
            return Err(ApiError::Serialization(
                "XML body must be a single-key envelope".to_string(),
            ))
        }
    };

    let mut writer = Writer::new(Vec::new());
    let mut root_elem = BytesStart::new(root.as_str());
    if !metadata.xmlns.is_empty() {
        root_elem.push_attribute(("xmlns", metadata.xmlns.as_str()));
    }
    root_elem.push_attribute(("xmlns:xsi", XSI_NS));
    for (alias, ns) in &metadata.extension_ns {
        root_elem.push_attribute((format!("xmlns:{}", alias).as_str(), ns.as_str()));
    }
    write_event(&mut writer, Event::Start(root_elem))?;
    write_body(&mut writer, root, payload, metadata)?;
    write_event(&mut writer, Event::End(BytesEnd::new(root.as_str())))?;

    String::from_utf8(writer.into_inner()).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub fn decode(raw: &str, metadata: &AttrMetadata) -> Result<Value> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);
    loop {
        match reader
            .read_event()
            .map_err(|e| ApiError::Serialization(e.to_string()))?
        {
            Event::Start(e) => {
                let name = local_name(&e);
                let nil = is_nil(&e)?;
                let value = read_element(&mut reader, &name, metadata)?;
                let mut map = Map::new();
                map.insert(name, if nil { Value::Null } else { value });
                return Ok(Value::Object(map));
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                let value = if is_nil(&e)? {
                    Value::Null
                } else {
                    Value::String(String::new())
                };
                let mut map = Map::new();
                map.insert(name, value);
                return Ok(Value::Object(map));
            }
            Event::Eof => {
                return Err(ApiError::Serialization(
                    "XML document has no root element".to_string(),
                ))
            }
            _ => {}
        }
    }
}

fn write_body<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
    metadata: &AttrMetadata,
) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_value(writer, key, child, metadata)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            let member = singular_of(name, metadata);
            for item in items {
                write_value(writer, &member, item, metadata)?;
            }
            Ok(())
        }
        Value::Null => Ok(()),
        scalar => write_event(writer, Event::Text(BytesText::new(&scalar_text(scalar)))),
    }
}

fn write_value<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
    metadata: &AttrMetadata,
) -> Result<()> {
    if value.is_null() {
        let mut elem = BytesStart::new(name);
        elem.push_attribute((NIL_ATTR, "true"));
        return write_event(writer, Event::Empty(elem));
    }
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_body(writer, name, value, metadata)?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn read_element(
    reader: &mut Reader<&[u8]>,
    name: &str,
    metadata: &AttrMetadata,
) -> Result<Value> {
    let mut children: Vec<(String, Value)> = Vec::new();
    let mut text: Option<String> = None;
    loop {
        match reader
            .read_event()
            .map_err(|e| ApiError::Serialization(e.to_string()))?
        {
            Event::Start(e) => {
                let child_name = local_name(&e);
                let nil = is_nil(&e)?;
                let value = read_element(reader, &child_name, metadata)?;
                children.push((child_name, if nil { Value::Null } else { value }));
            }
            Event::Empty(e) => {
                let child_name = local_name(&e);
                let value = if is_nil(&e)? {
                    Value::Null
                } else {
                    Value::String(String::new())
                };
                children.push((child_name, value));
            }
            Event::Text(t) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                text = Some(unescaped.into_owned());
            }
            Event::End(e) if String::from_utf8_lossy(e.local_name().as_ref()) == name => break,
            Event::Eof => {
                return Err(ApiError::Serialization(format!(
                    "Unexpected end of XML inside <{}>",
                    name
                )))
            }
            _ => {}
        }
    }

    if children.is_empty() {
        return Ok(Value::String(text.unwrap_or_default()));
    }
    if metadata.plurals.contains_key(name) {
        return Ok(Value::Array(children.into_iter().map(|(_, v)| v).collect()));
    }
    let mut map = Map::new();
    for (key, value) in children {
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn singular_of(plural: &str, metadata: &AttrMetadata) -> String {
    metadata
        .plurals
        .get(plural)
        .cloned()
        .unwrap_or_else(|| plural.strip_suffix('s').unwrap_or(plural).to_string())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn local_name(elem: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(elem.local_name().as_ref()).into_owned()
}

fn is_nil(elem: &BytesStart<'_>) -> Result<bool> {
    for attr in elem.attributes() {
        let attr = attr.map_err(|e| ApiError::Serialization(e.to_string()))?;
        if attr.key.as_ref() == NIL_ATTR.as_bytes() && attr.value.as_ref() == b"true" {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> AttrMetadata {
        AttrMetadata {
            plurals: apmec_core::plural_table(),
            xmlns: String::new(),
            extension_ns: std::collections::HashMap::new(),
        }
    }

    #[test]
    fn encode_rejects_multi_key_envelope() {
        let err = encode(&json!({"a": 1, "b": 2}), &metadata()).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn nested_objects_round_trip() {
        let body = json!({"vim": {"auth": {"username": "u", "password": "p"}}});
        let wire = encode(&body, &metadata()).unwrap();
        let back = decode(&wire, &metadata()).unwrap();
        assert_eq!(back["vim"]["auth"]["username"], "u");
    }

    #[test]
    fn unregistered_list_names_fall_back_to_s_stripping() {
        let body = json!({"mea": {"zones": ["z1", "z2"]}});
        let wire = encode(&body, &metadata()).unwrap();
        assert_eq!(wire.matches("<zone>").count(), 2, "wire: {}", wire);
    }

    #[test]
    fn escaped_text_round_trips() {
        let body = json!({"mea": {"description": "a <b> & c"}});
        let wire = encode(&body, &metadata()).unwrap();
        let back = decode(&wire, &metadata()).unwrap();
        assert_eq!(back["mea"]["description"], "a <b> & c");
    }
}
