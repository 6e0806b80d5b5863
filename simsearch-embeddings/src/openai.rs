use std::fmt;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use simsearch_core::{Embedding, EmbeddingError};
use tracing::Instrument;

use crate::EmbeddingProviderError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BATCH_SIZE: usize = 512;

#[derive(Clone)]
pub struct OpenAiEmbedding {
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    batch_size: usize,
    http: Client,
}

impl fmt::Debug for OpenAiEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<none>"
        } else {
            "<redacted>"
        };

        f.debug_struct("OpenAiEmbedding")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl OpenAiEmbedding {
    /// The key is not checked here; a bad or missing key surfaces as
    /// `EmbeddingError::Authentication` on the first request.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
            batch_size: DEFAULT_BATCH_SIZE,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Values below 1 are clamped to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimension,
            encoding_format: "float",
        };

        let response = self
            .http
            .post(self.embeddings_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_seconds = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<OpenAiErrorResponse>(&body) {
                Ok(parsed) => (parsed.error.code_or_type(), parsed.error.message),
                Err(_) => (None, format!("HTTP {}: {}", status, body)),
            };
            return Err(EmbeddingProviderError::Api {
                status: status.as_u16(),
                code,
                message,
                retry_after_seconds,
            }
            .into());
        }

        let response = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|err| EmbeddingProviderError::InvalidResponse(err.to_string()))?;

        if response.data.len() != inputs.len() {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.data.len()
            ))
            .into());
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        if let Some((position, item)) = data
            .iter()
            .enumerate()
            .find(|(position, item)| item.index != *position)
        {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "embedding index {} does not match input position {position}",
                item.index
            ))
            .into());
        }

        let mut out = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimension {
                return Err(EmbeddingProviderError::InvalidResponse(format!(
                    "expected embedding dimension {}, got {}",
                    self.dimension,
                    item.embedding.len()
                ))
                .into());
            }
            out.push(item.embedding);
        }

        Ok(out)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

impl OpenAiErrorDetail {
    fn code_or_type(&self) -> Option<String> {
        self.code
            .as_ref()
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .or_else(|| self.kind.clone())
    }
}

#[async_trait]
impl Embedding for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut out = self.request_embeddings(&[text.to_string()]).await?;
        out.pop().ok_or_else(|| {
            EmbeddingProviderError::InvalidResponse("missing embedding".to_string()).into()
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let total_batches = texts.len().div_ceil(self.batch_size);
        let span = tracing::info_span!(
            "openai_embed_batch",
            model = %self.model,
            inputs = texts.len(),
            total_batches = total_batches
        );

        async move {
            let mut out = Vec::with_capacity(texts.len());
            for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
                tracing::debug!(
                    batch_index = batch_index + 1,
                    batch_size = batch.len(),
                    "requesting embeddings"
                );
                out.extend(self.request_embeddings(batch).await?);
            }
            Ok::<_, EmbeddingError>(out)
        }
        .instrument(span)
        .await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
