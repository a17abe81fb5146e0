//! The request client runtime: path building, format negotiation,
//! retry policy, pagination and error classification.

use crate::classify::classify_fault;
use crate::errors::{ApiError, Result};
use crate::serializer::{AttrMetadata, Serializer, WireFormat, XML_NS_V10};
use crate::transport::{HttpMethod, HttpTransport};
use apmec_core::{links_key, plural_table};
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use url::form_urlencoded;

/// The only API generation with a registered client implementation.
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Status codes treated as success; everything else is classified.
const SUCCESS_CODES: &[u16] = &[200, 201, 202, 204];

/// URL query parameters. Repeated keys encode list-valued parameters.
pub type Params = [(String, String)];

/// Tunables of one client session.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub format: WireFormat,
    /// How many times idempotent requests are retried on connection
    /// failure. POST is never retried.
    pub retries: u32,
    pub retry_interval: Duration,
    /// Propagate the last connection failure instead of a summary.
    pub raise_errors: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            format: WireFormat::Json,
            retries: 0,
            retry_interval: Duration::from_secs(1),
            raise_errors: true,
        }
    }
}

/// Outcome of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Deserialized payload of a 200/201/202 response.
    Data(Value),
    /// Untouched body of a 204 response - no deserialization attempted.
    Raw(String),
}

impl ResponseBody {
    /// Structured payload, or an error if the response carried none.
    pub fn expect_data(self) -> Result<Value> {
        match self {
            ResponseBody::Data(value) => Ok(value),
            ResponseBody::Raw(raw) => Err(ApiError::Serialization(format!(
                "Expected a structured body, got raw content: {}",
                raw
            ))),
        }
    }

    /// Structured payload if present, raw content as a string otherwise.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Data(value) => value,
            ResponseBody::Raw(raw) => Value::String(raw),
        }
    }
}

/// Client for the Apmec orchestration v1.0 API.
///
/// Owns the per-session state: wire format, retry configuration and the
/// version-qualified path prefix. The format lives in a `Cell` so
/// transient overrides (metadata bootstrap) work through `&self`;
/// concurrent use from multiple threads needs external synchronization.
pub struct ApmecClient {
    transport: Box<dyn HttpTransport>,
    format: Cell<WireFormat>,
    retries: u32,
    retry_interval: Duration,
    raise_errors: bool,
    action_prefix: String,
    extended_plurals: HashMap<String, String>,
}

impl std::fmt::Debug for ApmecClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApmecClient")
            .field("format", &self.format)
            .field("retries", &self.retries)
            .field("retry_interval", &self.retry_interval)
            .field("raise_errors", &self.raise_errors)
            .field("action_prefix", &self.action_prefix)
            .field("extended_plurals", &self.extended_plurals)
            .finish_non_exhaustive()
    }
}

impl ApmecClient {
    /// Create a v1.0 client over the given transport.
    pub fn new(transport: Box<dyn HttpTransport>, options: ClientOptions) -> Self {
        debug!("Creating ApmecClient");
        debug!("  Format: {}", options.format);
        debug!("  Retries: {}", options.retries);

        Self {
            transport,
            format: Cell::new(options.format),
            retries: options.retries,
            retry_interval: options.retry_interval,
            raise_errors: options.raise_errors,
            action_prefix: format!("/v{}", DEFAULT_API_VERSION),
            extended_plurals: HashMap::new(),
        }
    }

    /// Create a client for a named API version. Only "1.0" is
    /// registered; anything else fails at construction time.
    pub fn for_version(
        version: &str,
        transport: Box<dyn HttpTransport>,
        options: ClientOptions,
    ) -> Result<Self> {
        match version {
            DEFAULT_API_VERSION => Ok(Self::new(transport, options)),
            other => Err(ApiError::UnsupportedVersion(other.to_string())),
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format.get()
    }

    pub fn set_format(&self, format: WireFormat) {
        self.format.set(format);
    }

    /// Register an extension-provided irregular plural, merged into the
    /// XML serializer metadata.
    pub fn register_extended_plural(&mut self, plural: &str, singular: &str) {
        self.extended_plurals
            .insert(plural.to_string(), singular.to_string());
    }

    /// Run `op` with the wire format transiently overridden, restoring
    /// the previous format on every exit path.
    pub fn with_request_format<T>(
        &self,
        format: WireFormat,
        op: impl FnOnce(&Self) -> Result<T>,
    ) -> Result<T> {
        let previous = self.format.replace(format);
        let result = op(self);
        self.format.set(previous);
        result
    }

    /// Serializer metadata for the current format.
    ///
    /// JSON needs none. XML needs the plural table plus the extension
    /// alias-to-namespace map, fetched from the extensions endpoint
    /// with the format transiently forced to JSON.
    pub fn attr_metadata(&self) -> Result<AttrMetadata> {
        if self.format.get() == WireFormat::Json {
            return Ok(AttrMetadata::default());
        }
        let extensions = self.with_request_format(WireFormat::Json, |client| {
            client.get("/extensions", &[])?.expect_data()
        })?;
        let mut extension_ns = HashMap::new();
        if let Some(list) = extensions.get("extensions").and_then(Value::as_array) {
            for ext in list {
                if let (Some(alias), Some(ns)) = (
                    ext.get("alias").and_then(Value::as_str),
                    ext.get("namespace").and_then(Value::as_str),
                ) {
                    extension_ns.insert(alias.to_string(), ns.to_string());
                }
            }
        }
        let mut plurals = plural_table();
        plurals.extend(self.extended_plurals.clone());
        Ok(AttrMetadata {
            plurals,
            xmlns: XML_NS_V10.to_string(),
            extension_ns,
        })
    }

    fn serializer(&self) -> Result<Serializer> {
        Ok(Serializer::new(self.attr_metadata()?))
    }

    /// Perform exactly one HTTP round trip.
    ///
    /// The path gets the version prefix, the format suffix and the
    /// URL-encoded query appended; the body, if any, is serialized in
    /// the current format. Success statuses return the deserialized
    /// payload (204 returns the raw body unchanged); every other status
    /// classifies the error body and returns the classified error.
    pub fn do_request(
        &self,
        method: HttpMethod,
        action: &str,
        body: Option<&Value>,
        params: &Params,
    ) -> Result<ResponseBody> {
        let format = self.format.get();
        let mut action = format!("{}{}.{}", self.action_prefix, action, format.suffix());
        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            action.push('?');
            action.push_str(&query);
        }

        let payload = match body {
            Some(data) => Some(self.serializer()?.serialize(data, format)?),
            None => None,
        };

        let response =
            self.transport
                .do_request(&action, method, payload.as_deref(), format.content_type())?;
        let status = response.status;

        if SUCCESS_CODES.contains(&status) {
            if status == 204 {
                return Ok(ResponseBody::Raw(response.body));
            }
            let value = self.serializer()?.deserialize(&response.body, format)?;
            return Ok(ResponseBody::Data(value));
        }

        // Fall back to the transport reason phrase when the body is empty.
        let raw = if response.body.is_empty() {
            response.reason.unwrap_or_default()
        } else {
            response.body
        };
        debug!("Error message: {}", raw);
        let parsed = match self
            .serializer()
            .and_then(|s| s.deserialize(&raw, format))
        {
            Ok(value) => value,
            // Not a structured error body.
            Err(_) => json!({ "message": raw }),
        };
        Err(classify_fault(status, &parsed))
    }

    /// Retry wrapper around [`do_request`](Self::do_request).
    ///
    /// Only connection failures are retried; classified API errors
    /// propagate on first occurrence. Used by the idempotent verb
    /// helpers - POST goes straight to `do_request`.
    pub fn retry_request(
        &self,
        method: HttpMethod,
        action: &str,
        body: Option<&Value>,
        params: &Params,
    ) -> Result<ResponseBody> {
        let max_attempts = self.retries + 1;
        for attempt in 0..max_attempts {
            match self.do_request(method, action, body, params) {
                Err(error @ ApiError::ConnectionFailed { .. }) => {
                    if attempt < self.retries {
                        debug!("Retrying connection to Apmec service");
                        std::thread::sleep(self.retry_interval);
                    } else if self.raise_errors {
                        return Err(error);
                    }
                }
                other => return other,
            }
        }

        let reason = if self.retries > 0 {
            format!(
                "Failed to connect to Apmec server after {} attempts",
                max_attempts
            )
        } else {
            "Failed to connect to Apmec server".to_string()
        };
        Err(ApiError::ConnectionFailed { reason })
    }

    pub fn get(&self, action: &str, params: &Params) -> Result<ResponseBody> {
        self.retry_request(HttpMethod::Get, action, None, params)
    }

    pub fn put(&self, action: &str, body: Option<&Value>) -> Result<ResponseBody> {
        self.retry_request(HttpMethod::Put, action, body, &[])
    }

    pub fn delete(&self, action: &str) -> Result<ResponseBody> {
        self.retry_request(HttpMethod::Delete, action, None, &[])
    }

    /// POST is not retried to avoid creating orphan objects.
    pub fn post(&self, action: &str, body: Option<&Value>) -> Result<ResponseBody> {
        self.do_request(HttpMethod::Post, action, body, &[])
    }

    /// Drive pagination to completion and return every page's items
    /// concatenated under the collection key.
    pub fn list(&self, collection: &str, path: &str, params: &Params) -> Result<Value> {
        let mut items = Vec::new();
        for page in self.pager(collection, path, params) {
            let page = page?;
            let chunk = page
                .get(collection)
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ApiError::Serialization(format!("Response is missing the '{}' key", collection))
                })?;
            items.extend(chunk.iter().cloned());
        }
        let mut result = Map::new();
        result.insert(collection.to_string(), Value::Array(items));
        Ok(Value::Object(result))
    }

    /// Lazy page stream: finite, forward-only, single-consumer. Each
    /// page is fetched only when the caller advances the iterator;
    /// restart by calling again.
    pub fn pager(&self, collection: &str, path: &str, params: &Params) -> Pager<'_> {
        let page_reverse = params
            .iter()
            .any(|(k, v)| k == "page_reverse" && (v == "true" || v == "True"));
        Pager {
            client: self,
            collection: collection.to_string(),
            path: path.to_string(),
            params: params.to_vec(),
            direction: if page_reverse { "previous" } else { "next" },
            seen_links: HashSet::new(),
            done: false,
        }
    }
}

/// Iterator over raw collection pages.
///
/// Follows the `"<collection>_links"` entry matching the active
/// direction, replacing the query parameters with those parsed from the
/// link's href. Stops when the links key is absent, no link matches, or
/// a link repeats (a misbehaving server echoing the same href would
/// otherwise loop forever).
pub struct Pager<'a> {
    client: &'a ApmecClient,
    collection: String,
    path: String,
    params: Vec<(String, String)>,
    direction: &'static str,
    seen_links: HashSet<String>,
    done: bool,
}

impl Iterator for Pager<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = match self
            .client
            .get(&self.path, &self.params)
            .and_then(ResponseBody::expect_data)
        {
            Ok(page) => page,
            Err(error) => {
                self.done = true;
                return Some(Err(error));
            }
        };

        self.done = true;
        if let Some(links) = page.get(links_key(&self.collection)).and_then(Value::as_array) {
            for link in links {
                if link.get("rel").and_then(Value::as_str) != Some(self.direction) {
                    continue;
                }
                if let Some(href) = link.get("href").and_then(Value::as_str) {
                    if !self.seen_links.insert(href.to_string()) {
                        warn!("Server echoed an already-followed page link, stopping: {}", href);
                        break;
                    }
                    let query = href.split_once('?').map(|(_, q)| q).unwrap_or("");
                    self.params = form_urlencoded::parse(query.as_bytes())
                        .into_owned()
                        .collect();
                    self.done = false;
                }
                break;
            }
        }
        Some(Ok(page))
    }
}
