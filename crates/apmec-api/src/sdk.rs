//! High-level SDK facade over the request client.
//!
//! Resource operations are driven by the descriptor catalog in
//! `apmec-core`: one generic executor per verb, with the handful of
//! resource-specific behaviors (list truncation, the MEAD service-type
//! injection, MEA actions) expressed as descriptor flags or thin named
//! wrappers.

use crate::client::{ApmecClient, ClientOptions, Pager};
use crate::errors::{ApiError, Result};
use crate::transport::HttpTransport;
use apmec_core::resources::ResourceDescriptor;
use apmec_core::{
    truncated, DEFAULT_DESC_LENGTH, DEFAULT_ERROR_REASON_LENGTH, EVENT, EXTENSION, MEA, MEAD,
};
use serde_json::{json, Value};

/// SDK entry point for the Apmec orchestration service.
pub struct Apmec {
    client: ApmecClient,
}

impl Apmec {
    pub fn new(transport: Box<dyn HttpTransport>, options: ClientOptions) -> Self {
        Self {
            client: ApmecClient::new(transport, options),
        }
    }

    pub fn for_version(
        version: &str,
        transport: Box<dyn HttpTransport>,
        options: ClientOptions,
    ) -> Result<Self> {
        Ok(Self {
            client: ApmecClient::for_version(version, transport, options)?,
        })
    }

    /// Access to the underlying request client.
    pub fn client(&self) -> &ApmecClient {
        &self.client
    }

    /// List a collection, paginating to completion.
    pub fn list(
        &self,
        desc: &ResourceDescriptor,
        params: &[(String, String)],
    ) -> Result<Value> {
        let mut result = self.client.list(desc.plural, desc.collection_path, params)?;
        tidy_listing(&mut result, desc);
        Ok(result)
    }

    /// Lazy page stream over a collection.
    pub fn pages(&self, desc: &ResourceDescriptor, params: &[(String, String)]) -> Pager<'_> {
        self.client.pager(desc.plural, desc.collection_path, params)
    }

    pub fn show(
        &self,
        desc: &ResourceDescriptor,
        id: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        self.client
            .get(&desc.instance_path(id), params)?
            .expect_data()
    }

    pub fn create(&self, desc: &ResourceDescriptor, body: Value) -> Result<Value> {
        ensure_mutable(desc)?;
        ensure_envelope(desc, &body)?;
        self.client
            .post(desc.collection_path, Some(&body))?
            .expect_data()
    }

    pub fn update(&self, desc: &ResourceDescriptor, id: &str, body: Value) -> Result<Value> {
        ensure_mutable(desc)?;
        ensure_envelope(desc, &body)?;
        self.client
            .put(&desc.instance_path(id), Some(&body))?
            .expect_data()
    }

    pub fn delete(&self, desc: &ResourceDescriptor, id: &str) -> Result<()> {
        ensure_mutable(desc)?;
        self.client.delete(&desc.instance_path(id))?;
        Ok(())
    }

    /// Create a MEAD; the service catalog entry is injected client-side.
    pub fn create_mead(&self, mut body: Value) -> Result<Value> {
        ensure_envelope(&MEAD, &body)?;
        body["mead"]["service_types"] = json!([{"service_type": "mead"}]);
        self.client.post(MEAD.collection_path, Some(&body))?.expect_data()
    }

    /// Post a scale action for a MEA.
    pub fn scale_mea(&self, mea_id: &str, body: Value) -> Result<Value> {
        let action = format!("{}/actions", MEA.instance_path(mea_id));
        Ok(self.client.post(&action, Some(&body))?.into_value())
    }

    /// Infrastructure resources backing a MEA.
    pub fn list_mea_resources(
        &self,
        mea_id: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        let path = format!("{}/resources", MEA.instance_path(mea_id));
        self.client.list("resources", &path, params)
    }

    pub fn list_events(&self, params: &[(String, String)]) -> Result<Value> {
        self.list(&EVENT, params)
    }

    /// Lifecycle events filtered to one resource type, re-keyed as
    /// `"<type>_events"`.
    pub fn list_resource_events(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        let mut params = params.to_vec();
        params.push(("resource_type".to_string(), resource_type.to_string()));
        let events = self.list(&EVENT, &params)?;
        let mut result = serde_json::Map::new();
        result.insert(
            format!("{}_events", resource_type),
            events["events"].clone(),
        );
        Ok(Value::Object(result))
    }

    pub fn show_event(&self, event_id: &str, params: &[(String, String)]) -> Result<Value> {
        self.show(&EVENT, event_id, params)
    }

    pub fn list_extensions(&self, params: &[(String, String)]) -> Result<Value> {
        self.client
            .get(EXTENSION.collection_path, params)?
            .expect_data()
    }

    pub fn show_extension(&self, alias: &str, params: &[(String, String)]) -> Result<Value> {
        self.show(&EXTENSION, alias, params)
    }
}

fn ensure_mutable(desc: &ResourceDescriptor) -> Result<()> {
    if !desc.mutable {
        return Err(ApiError::InvalidInput(format!(
            "Resource '{}' is read-only",
            desc.name
        )));
    }
    Ok(())
}

/// The request body must be a single-key envelope matching the resource.
fn ensure_envelope(desc: &ResourceDescriptor, body: &Value) -> Result<()> {
    let map = body.as_object().ok_or_else(|| {
        ApiError::InvalidInput("Request body must be a mapping".to_string())
    })?;
    if map.len() != 1 || !map.contains_key(desc.name) {
        return Err(ApiError::InvalidInput(format!(
            "Request body must be a single-key '{}' envelope",
            desc.name
        )));
    }
    Ok(())
}

/// Shorten noisy fields for list output, per the descriptor's flags.
fn tidy_listing(result: &mut Value, desc: &ResourceDescriptor) {
    if !desc.truncate_description && !desc.truncate_error_reason {
        return;
    }
    let Some(items) = result.get_mut(desc.plural).and_then(Value::as_array_mut) else {
        return;
    };
    for item in items {
        if desc.truncate_description {
            let short = item
                .get("description")
                .and_then(Value::as_str)
                .map(|d| truncated(d, DEFAULT_DESC_LENGTH));
            if let Some(short) = short {
                item["description"] = Value::String(short);
            }
        }
        if desc.truncate_error_reason {
            let short = item
                .get("error_reason")
                .and_then(Value::as_str)
                .map(|r| truncated(r, DEFAULT_ERROR_REASON_LENGTH));
            if let Some(short) = short {
                item["error_reason"] = Value::String(short);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;
    use crate::test_support::ScriptedTransport;
    use crate::transport::HttpMethod;
    use apmec_core::{MESD, VIM};
    use serde_json::json;

    fn sdk(transport: &ScriptedTransport) -> Apmec {
        Apmec::new(Box::new(transport.clone()), ClientOptions::default())
    }

    #[test]
    fn show_unwraps_structured_body() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, r#"{"vim": {"id": "v1", "name": "site-a"}}"#);
        let result = sdk(&transport).show(&VIM, "v1", &[]).unwrap();
        assert_eq!(result["vim"]["name"], "site-a");
        assert_eq!(transport.requests()[0].action, "/v1.0/vims/v1.json");
    }

    #[test]
    fn create_posts_envelope_to_collection_path() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, r#"{"vim": {"id": "v1"}}"#);
        let body = json!({"vim": {"name": "site-a"}});
        sdk(&transport).create(&VIM, body).unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.action, "/v1.0/vims.json");
    }

    #[test]
    fn create_rejects_mismatched_envelope() {
        let transport = ScriptedTransport::new();
        let err = sdk(&transport)
            .create(&VIM, json!({"mea": {}}))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn read_only_resources_reject_mutation() {
        let transport = ScriptedTransport::new();
        let err = sdk(&transport).delete(&EVENT, "e1").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn create_mead_injects_service_types() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, r#"{"mead": {"id": "d1"}}"#);
        sdk(&transport)
            .create_mead(json!({"mead": {"name": "d"}}))
            .unwrap();
        let sent: Value =
            serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["mead"]["service_types"][0]["service_type"], "mead");
    }

    #[test]
    fn list_truncates_long_descriptions() {
        let transport = ScriptedTransport::new();
        let long = "d".repeat(40);
        transport.push_json(
            200,
            &format!(r#"{{"mesds": [{{"id": "1", "description": "{}"}}]}}"#, long),
        );
        let result = sdk(&transport).list(&MESD, &[]).unwrap();
        let description = result["mesds"][0]["description"].as_str().unwrap();
        assert_eq!(description.len(), DEFAULT_DESC_LENGTH + 3);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn list_truncates_long_error_reasons() {
        let transport = ScriptedTransport::new();
        let long = "e".repeat(150);
        transport.push_json(
            200,
            &format!(r#"{{"meas": [{{"id": "1", "error_reason": "{}"}}]}}"#, long),
        );
        let result = sdk(&transport).list(&MEA, &[]).unwrap();
        let reason = result["meas"][0]["error_reason"].as_str().unwrap();
        assert_eq!(reason.len(), DEFAULT_ERROR_REASON_LENGTH + 3);
    }

    #[test]
    fn scale_mea_posts_to_actions_path() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, r#"{"scale": {"type": "out"}}"#);
        sdk(&transport)
            .scale_mea("m1", json!({"scale": {"type": "out"}}))
            .unwrap();
        assert_eq!(transport.requests()[0].action, "/v1.0/meas/m1/actions.json");
    }

    #[test]
    fn resource_events_are_rekeyed() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, r#"{"events": [{"id": "e1", "resource_type": "mea"}]}"#);
        let result = sdk(&transport).list_resource_events("mea", &[]).unwrap();
        assert_eq!(result["mea_events"][0]["id"], "e1");
        assert!(transport.requests()[0]
            .action
            .contains("resource_type=mea"));
    }

    #[test]
    fn delete_targets_instance_path() {
        let transport = ScriptedTransport::new();
        transport.push_json(204, "");
        sdk(&transport).delete(&VIM, "v1").unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.action, "/v1.0/vims/v1.json");
    }
}
