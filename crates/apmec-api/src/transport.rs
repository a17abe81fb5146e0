//! Authenticated HTTP transport.
//!
//! The request client only depends on the [`HttpTransport`] trait; the
//! reqwest-backed implementation below owns the auth token and the TLS
//! session options. Auth/session construction itself happens outside
//! this crate - the transport is handed a ready [`SessionConfig`].

use crate::errors::{ApiError, Result};
use log::{debug, error, trace};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Safe to retry without side effects beyond the first success.
    /// POST is excluded to avoid duplicate-creation problems.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, HttpMethod::Post)
    }
}

/// Raw result of one HTTP round trip.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Transport-level reason phrase, used when the body is empty.
    pub reason: Option<String>,
    pub body: String,
}

/// One authenticated HTTP call. Implementations map network-level
/// failures to [`ApiError::ConnectionFailed`]; status handling belongs
/// to the request client.
pub trait HttpTransport {
    fn do_request(
        &self,
        action: &str,
        method: HttpMethod,
        body: Option<&str>,
        content_type: &str,
    ) -> Result<HttpResponse>;
}

/// Externally supplied session parameters, consumed opaquely here.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Endpoint URL of the orchestration service.
    pub endpoint_url: String,
    /// Pre-acquired auth token, sent as X-Auth-Token.
    pub token: Option<String>,
    /// Socket timeout; there is no in-core cancellation beyond this.
    pub timeout: Option<Duration>,
    /// Skip server certificate validation.
    pub insecure: bool,
    /// SSL CA bundle file to use.
    pub ca_cert: Option<PathBuf>,
}

/// reqwest-backed transport for the Apmec service.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    endpoint_url: String,
    token: Option<String>,
}

impl ReqwestTransport {
    pub fn new(config: SessionConfig) -> Result<Self> {
        debug!("Creating ReqwestTransport");
        debug!("  Endpoint URL: {}", config.endpoint_url);

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(ca_cert) = &config.ca_cert {
            let pem = std::fs::read(ca_cert).map_err(|e| {
                ApiError::InvalidInput(format!("Unable to read CA cert {:?}: {}", ca_cert, e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ApiError::InvalidInput(format!("Invalid CA cert {:?}: {}", ca_cert, e))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder.build().map_err(|e| ApiError::ConnectionFailed {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    /// Create a transport from environment variables.
    pub fn from_env() -> Result<Self> {
        let endpoint_url = std::env::var("APMEC_ENDPOINT_URL").map_err(|_| {
            error!("APMEC_ENDPOINT_URL environment variable not set");
            ApiError::InvalidInput("APMEC_ENDPOINT_URL environment variable not set".to_string())
        })?;
        let token = std::env::var("APMEC_TOKEN").ok();
        Self::new(SessionConfig {
            endpoint_url,
            token,
            ..SessionConfig::default()
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn do_request(
        &self,
        action: &str,
        method: HttpMethod,
        body: Option<&str>,
        content_type: &str,
    ) -> Result<HttpResponse> {
        let url = format!("{}{}", self.endpoint_url, action);

        debug!("HTTP {} request to: {}", method.as_str(), url);
        trace!("  Content-Type: {}", content_type);

        let reqwest_method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .client
            .request(reqwest_method, &url)
            .header("Content-Type", content_type)
            .header("Accept", content_type);

        if let Some(token) = &self.token {
            request = request.header("X-Auth-Token", token);
        }
        if let Some(body) = body {
            trace!("Request body: {}", body);
            request = request.body(body.to_string());
        }

        let response = request.send().map_err(|e| {
            error!("{} request failed: {:?}", method.as_str(), e);
            ApiError::ConnectionFailed {
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        debug!("Response status: {}", status);

        let reason = status.canonical_reason().map(|r| r.to_string());
        let body = response.text().map_err(|e| ApiError::ConnectionFailed {
            reason: e.to_string(),
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
