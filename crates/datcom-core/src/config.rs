//! Environment-variable configuration, per spec section 6.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub vector_db_url: String,

    pub embed_api_base: String,
    pub embed_api_key: String,
    pub embed_model: String,
    pub embed_batch_size: usize,

    pub chat_api_base: String,
    pub chat_api_key: String,
    pub chat_model: String,

    pub default_top_k: usize,
    pub content_max_length: usize,
    pub temperature: f32,
    pub verify_ssl: bool,

    /// Reasoning-agent iteration cap; see spec section 9's Open Questions
    /// resolution (M=10 default, configurable).
    pub agent_max_steps: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            vector_db_url: std::env::var("VECTOR_DB_URL")
                .context("VECTOR_DB_URL must be set")?,

            embed_api_base: std::env::var("EMBED_API_BASE")
                .context("EMBED_API_BASE must be set")?,
            embed_api_key: std::env::var("EMBED_API_KEY")
                .context("EMBED_API_KEY must be set")?,
            embed_model: std::env::var("EMBED_MODEL").context("EMBED_MODEL must be set")?,
            embed_batch_size: std::env::var("EMBED_BATCH_SIZE")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .context("EMBED_BATCH_SIZE must be a positive integer")?,

            chat_api_base: std::env::var("CHAT_API_BASE")
                .context("CHAT_API_BASE must be set")?,
            chat_api_key: std::env::var("CHAT_API_KEY").context("CHAT_API_KEY must be set")?,
            chat_model: std::env::var("CHAT_MODEL").context("CHAT_MODEL must be set")?,

            default_top_k: std::env::var("DEFAULT_TOP_K")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DEFAULT_TOP_K must be a positive integer")?,
            content_max_length: std::env::var("CONTENT_MAX_LENGTH")
                .unwrap_or_else(|_| "800".to_string())
                .parse()
                .context("CONTENT_MAX_LENGTH must be a positive integer")?,
            temperature: std::env::var("TEMPERATURE")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("TEMPERATURE must be a number")?,
            verify_ssl: std::env::var("VERIFY_SSL")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            agent_max_steps: std::env::var("AGENT_MAX_STEPS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("AGENT_MAX_STEPS must be a positive integer")?,
        })
    }
}
