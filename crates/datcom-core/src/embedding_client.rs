//! Embedding Client (C1).
//!
//! Batch-encodes text via an OpenAI-compatible `/embeddings` endpoint
//! (spec section 6). Grounded on `memory/embedding.rs`'s `reqwest` client
//! construction, but diverges deliberately: on exhaustion this surfaces a
//! hard `EmbedError` rather than falling back to a zero vector, per spec
//! sections 4.1/7.

use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::EmbedError;
use crate::retry::{retry_with_backoff, RetryPolicy};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponseItem {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedResponseItem>,
}

#[derive(Clone)]
pub struct EmbedClient {
    api_base: String,
    api_key: String,
    model: String,
    batch_size: usize,
    client: reqwest::Client,
    dim: std::sync::Arc<OnceLock<usize>>,
}

impl EmbedClient {
    pub fn new(api_base: &str, api_key: &str, model: &str, batch_size: usize) -> Self {
        Self::with_tls_verification(api_base, api_key, model, batch_size, true)
    }

    pub fn with_tls_verification(
        api_base: &str,
        api_key: &str,
        model: &str,
        batch_size: usize,
        verify_ssl: bool,
    ) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            batch_size: batch_size.max(1),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .danger_accept_invalid_certs(!verify_ssl)
                .build()
                .expect("reqwest client builds"),
            dim: std::sync::Arc::new(OnceLock::new()),
        }
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        Ok(vectors.remove(0))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk).await?);
        }
        Ok(out)
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let policy = RetryPolicy::default();
        let url = format!("{}/embeddings", self.api_base);

        let vectors = retry_with_backoff(
            policy,
            |e: &EmbedError| !matches!(e, EmbedError::CountMismatch { .. } | EmbedError::DimensionMismatch { .. }),
            || async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&EmbedRequest {
                        input: chunk,
                        model: &self.model,
                    })
                    .send()
                    .await
                    .map_err(|e| EmbedError::Request(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(EmbedError::NonSuccessStatus(response.status().as_u16()));
                }

                let parsed: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| EmbedError::Request(e.to_string()))?;

                if parsed.data.len() != chunk.len() {
                    return Err(EmbedError::CountMismatch {
                        requested: chunk.len(),
                        returned: parsed.data.len(),
                    });
                }

                Ok(parsed.data.into_iter().map(|d| d.embedding).collect::<Vec<_>>())
            },
        )
        .await?;

        for v in &vectors {
            let expected = *self.dim.get_or_init(|| v.len());
            if v.len() != expected {
                return Err(EmbedError::DimensionMismatch {
                    expected,
                    got: v.len(),
                });
            }
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_is_never_zero() {
        let client = EmbedClient::new("http://localhost", "key", "model", 0);
        assert_eq!(client.batch_size, 1);
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let client = EmbedClient::new("http://localhost", "key", "model", 8);
        let result = client.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }
}
