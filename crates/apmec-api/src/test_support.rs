//! In-memory scripted transport shared by the client and sdk tests.

use crate::errors::{ApiError, Result};
use crate::transport::{HttpMethod, HttpResponse, HttpTransport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Step {
    Respond(HttpResponse),
    FailConnection(String),
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub action: String,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct Inner {
    steps: RefCell<VecDeque<Step>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

/// Transport that replays a scripted sequence of responses and records
/// every request it sees. Clones share the same script and log.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    inner: Rc<Inner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &str) {
        self.push_response(HttpResponse {
            status,
            reason: None,
            body: body.to_string(),
        });
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.inner
            .steps
            .borrow_mut()
            .push_back(Step::Respond(response));
    }

    pub fn push_connection_failure(&self) {
        self.inner
            .steps
            .borrow_mut()
            .push_back(Step::FailConnection("connection refused".to_string()));
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.borrow().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn do_request(
        &self,
        action: &str,
        method: HttpMethod,
        body: Option<&str>,
        content_type: &str,
    ) -> Result<HttpResponse> {
        self.inner.requests.borrow_mut().push(RecordedRequest {
            action: action.to_string(),
            method,
            body: body.map(|b| b.to_string()),
            content_type: content_type.to_string(),
        });
        match self.inner.steps.borrow_mut().pop_front() {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::FailConnection(reason)) => Err(ApiError::ConnectionFailed { reason }),
            None => panic!("no scripted response left for {} {}", method.as_str(), action),
        }
    }
}
