use super::logging::{debug_payload_enabled, emit_debug_payload, emit_stream_failure};
use crate::config::Config;
use crate::types::{ApiMessage, ModelInfo, ModelList};
use crate::util::{is_local_endpoint_url, join_endpoint};
use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const CHAT_COMPLETIONS_ENDPOINT: &str = "chat/completions";
const MODELS_ENDPOINT: &str = "models";
const REFERER: &str = "https://github.com/Alpha1337k/openrouter-cli";
const TITLE: &str = "openrouter-cli";

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: Option<f32>,
}

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, messages: &[ApiMessage]) -> Result<ByteStream>;
    fn mock_models(&self) -> Result<Vec<ModelInfo>>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .build()
                .context("failed to build HTTP client")?,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            #[cfg(test)]
            mock_stream_producer: None,
        })
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: None,
            api_url: "http://localhost:8000/api/v1".to_string(),
            mock_stream_producer: Some(mock_producer),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn create_stream(
        &self,
        messages: &[ApiMessage],
        options: &ChatOptions,
    ) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(messages);
            }
        }

        let request_url = join_endpoint(&self.api_url, CHAT_COMPLETIONS_ENDPOINT);
        let payload = chat_payload(messages, options);

        if debug_payload_enabled() {
            emit_debug_payload(&request_url, &payload);
        }

        let request = self
            .http
            .post(&request_url)
            .header("content-type", "application/json")
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&payload);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?;
        let response = ensure_success(response, &request_url).await?;

        let request_url_for_stream = request_url.clone();
        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|error| {
                let error = map_api_request_error(error, &request_url_for_stream);
                emit_stream_failure(&request_url_for_stream, &error);
                error
            })
        });
        Ok(Box::pin(stream))
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.mock_models();
            }
        }

        let request_url = join_endpoint(&self.api_url, MODELS_ENDPOINT);
        let response = self
            .authorize(self.http.get(&request_url))
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?;
        let response = ensure_success(response, &request_url).await?;

        let models: ModelList = response
            .json()
            .await
            .with_context(|| format!("unexpected model list from '{request_url}'"))?;
        Ok(models.data)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.header("authorization", format!("Bearer {api_key}")),
            None => request,
        }
    }
}

fn chat_payload(messages: &[ApiMessage], options: &ChatOptions) -> Value {
    let mut payload = json!({
        "model": options.model,
        "messages": messages,
        "provider": { "sort": "price" },
        "stream": true,
    });
    if let (Some(temperature), Some(object)) = (options.temperature, payload.as_object_mut()) {
        object.insert("temperature".to_string(), json!(temperature));
    }
    payload
}

async fn ensure_success(
    response: reqwest::Response,
    request_url: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!(
        "API request to '{}' failed with status code {}: {}",
        request_url,
        status.as_u16(),
        body.trim()
    )
}

fn map_api_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local API endpoint '{}': {}. Start your local server or update OPENROUTER_API_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach API endpoint '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("API request to '{}' timed out: {}", request_url, error);
    }
    if let Some(status) = error.status() {
        return anyhow!(
            "API endpoint '{}' returned HTTP {}: {}",
            request_url,
            status,
            error
        );
    }
    anyhow!("API request to '{}' failed: {}", request_url, error)
}
