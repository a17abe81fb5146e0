//! # Apmec API
//!
//! HTTP client runtime for the Apmec MEC orchestration service.
//! This crate provides the authenticated call layer every resource
//! operation depends on: retry policy, pagination, serialization
//! format negotiation and error classification.

pub mod classify;
pub mod client;
pub mod errors;
pub mod sdk;
pub mod serializer;
pub mod transport;
mod xml;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export common types for convenience
pub use classify::classify_fault;
pub use client::{ApmecClient, ClientOptions, Pager, ResponseBody, DEFAULT_API_VERSION};
pub use errors::{ApiError, ErrorKind, Result};
pub use sdk::Apmec;
pub use serializer::{AttrMetadata, Serializer, WireFormat, XML_NS_V10};
pub use transport::{
    HttpMethod, HttpResponse, HttpTransport, ReqwestTransport, SessionConfig,
};
