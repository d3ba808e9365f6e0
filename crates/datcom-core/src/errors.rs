//! Error taxonomy for the orchestration engine.
//!
//! Each kind maps to one of the abstract categories the engine's callers
//! reason about: user-facing CLI errors, configuration errors, and the
//! per-component remote/tool failure kinds that the retry policy in
//! [`crate::retry`] wraps uniformly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("query text must not be empty")]
    EmptyQuery,
    #[error("invalid --top-k value: {0}")]
    InvalidTopK(String),
    #[error("unknown flag or malformed argument: {0}")]
    BadArgument(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("database connectivity error: {0}")]
    Connection(String),
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding service returned status {0}")]
    NonSuccessStatus(u16),
    #[error("embedding service returned {returned} vectors for {requested} inputs")]
    CountMismatch { requested: usize, returned: usize },
    #[error("embedding dimension {got} disagrees with first-seen dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("embedding request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat service returned status {0}")]
    NonSuccessStatus(u16),
    #[error("chat service returned an unparseable response: {0}")]
    MalformedResponse(String),
    #[error("chat request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for tool {tool}: {reason}")]
    BadArguments { tool: String, reason: String },
    #[error("tool {tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },
    #[error("tool {tool} rejected its input: {reason}")]
    Rejected { tool: String, reason: String },
}

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("reasoning agent reached its iteration cap ({0}) without converging")]
    IterationCapReached(usize),
    #[error("query exceeded its {0}s deadline")]
    DeadlineExceeded(u64),
    #[error("query was cancelled")]
    Cancelled,
}
