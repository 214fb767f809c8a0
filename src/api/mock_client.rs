use crate::api::client::{ByteStream, MockStreamProducer};
use crate::api::mock_stream::{chunked_body, failing_body};
use crate::types::{ApiMessage, ModelInfo};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};

pub enum MockResponse {
    Body(Vec<String>),
    /// The transport fails after delivering `chunks`.
    Interrupted {
        chunks: Vec<String>,
        error: String,
    },
    /// The request itself is refused before any body arrives.
    Rejected(String),
}

/// Scripted stand-in for the completion API, one response per request.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    requests: Arc<Mutex<Vec<Vec<ApiMessage>>>>,
    models: Vec<String>,
}

impl MockApiClient {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
            models: Vec::new(),
        }
    }

    pub fn with_models(mut self, ids: &[&str]) -> Self {
        self.models = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Message histories received so far, one entry per request.
    pub fn requests(&self) -> Vec<Vec<ApiMessage>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn next_body(&self, messages: &[ApiMessage]) -> Result<ByteStream> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("MockApiClient: request log poisoned"))?
            .push(messages.to_vec());

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| anyhow!("MockApiClient: responses poisoned"))?;
        if responses.is_empty() {
            return Err(anyhow!("MockApiClient: No more responses configured"));
        }

        match responses.remove(0) {
            MockResponse::Body(chunks) => Ok(chunked_body(chunks)),
            MockResponse::Interrupted { chunks, error } => Ok(failing_body(chunks, &error)),
            MockResponse::Rejected(error) => Err(anyhow!(error)),
        }
    }

    pub fn models(&self) -> Vec<ModelInfo> {
        self.models
            .iter()
            .map(|id| ModelInfo {
                id: id.clone(),
                created: None,
                extra: serde_json::Map::new(),
            })
            .collect()
    }
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, messages: &[ApiMessage]) -> Result<ByteStream> {
        self.next_body(messages)
    }

    fn mock_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(self.models())
    }
}
