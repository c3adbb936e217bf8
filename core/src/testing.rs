//! In-process transport used by the unit tests.

use std::sync::Mutex;

use crate::context::CallContext;
use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Debug)]
enum Reply {
    Respond { status: u16, body: String },
    Fail(String),
}

/// Answers every request with the same canned reply and records what it
/// was asked to send.
#[derive(Debug)]
pub(crate) struct StubTransport {
    reply: Reply,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub(crate) fn respond(status: u16, body: &str) -> Self {
        Self::new(Reply::Respond {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn fail(message: &str) -> Self {
        Self::new(Reply::Fail(message.to_string()))
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn execute(
        &self,
        ctx: &CallContext,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        ctx.check()?;
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Respond { status, body } => Ok(HttpResponse {
                status: *status,
                headers: Vec::new(),
                body: body.clone(),
            }),
            Reply::Fail(message) => Err(TransportError::Other(message.clone())),
        }
    }
}
