//! In-memory `ModelBackend` for tests. Records every call it receives.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::flow::template::RenderedPrompt;
use crate::llm_client::{ModelBackend, ModelError, ModelOptions, ModelRequest};

#[derive(Debug, Clone)]
pub enum StubReply {
    Json(Value),
    Unavailable,
    Refused,
    Timeout,
}

pub struct StubBackend {
    credential: bool,
    reply: StubReply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<RenderedPrompt>>,
    last_options: Mutex<Option<ModelOptions>>,
    last_schema: Mutex<Option<Value>>,
}

impl StubBackend {
    pub fn replying(value: Value) -> Self {
        Self::new(true, StubReply::Json(value))
    }

    pub fn failing(reply: StubReply) -> Self {
        Self::new(true, reply)
    }

    /// A backend with no configured credential.
    pub fn without_credential(value: Value) -> Self {
        Self::new(false, StubReply::Json(value))
    }

    fn new(credential: bool, reply: StubReply) -> Self {
        Self {
            credential,
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_options: Mutex::new(None),
            last_schema: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<RenderedPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<ModelOptions> {
        self.last_options.lock().unwrap().clone()
    }

    pub fn last_schema(&self) -> Option<Value> {
        self.last_schema.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        *self.last_options.lock().unwrap() = Some(request.options.clone());
        *self.last_schema.lock().unwrap() = Some(request.response_schema.clone());

        match &self.reply {
            StubReply::Json(value) => Ok(value.clone()),
            StubReply::Unavailable => Err(ModelError::Unavailable("stub offline".to_string())),
            StubReply::Refused => Err(ModelError::Refused("finish reason SAFETY".to_string())),
            StubReply::Timeout => Err(ModelError::Timeout(Duration::from_secs(30))),
        }
    }
}
