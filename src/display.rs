use colored::Colorize;
use serde_json::{Map, Value};

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn print_success(message: &str) {
    println!("{}", message.green());
}

/// Pretty-print a response, optionally narrowed to selected fields.
pub fn print_output(value: &Value, fields: &[String]) {
    let shaped = select_fields(value, fields);
    match serde_json::to_string_pretty(&shaped) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", shaped),
    }
}

/// Narrow a resource or collection envelope to the requested fields.
///
/// With no fields requested the value passes through unchanged. The
/// single envelope key is preserved; filtering applies to the payload
/// mapping, or to every item of a collection payload.
pub fn select_fields(value: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return value.clone();
    }
    let Some(envelope) = value.as_object() else {
        return value.clone();
    };
    let mut shaped = Map::new();
    for (key, payload) in envelope {
        let narrowed = match payload {
            Value::Object(item) => Value::Object(pick(item, fields)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(pick(map, fields)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        shaped.insert(key.clone(), narrowed);
    }
    Value::Object(shaped)
}

fn pick(item: &Map<String, Value>, fields: &[String]) -> Map<String, Value> {
    let mut picked = Map::new();
    for field in fields {
        if let Some(value) = item.get(field) {
            picked.insert(field.clone(), value.clone());
        }
    }
    picked
}
