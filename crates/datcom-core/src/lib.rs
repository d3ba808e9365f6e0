//! DATCOM query-time orchestration engine.
//!
//! Routes a user query through the Intent Router (C5) to either the
//! fixed-sequence DATCOM Pipeline (C6) or the tool-using Reasoning Agent
//! (C7), both sharing the Vector Store Adapter (C3) and Tool Registry (C4).

pub mod agent;
pub mod chat_client;
pub mod config;
pub mod datcom;
pub mod embedding_client;
pub mod errors;
pub mod retrieval_tools;
pub mod retry;
pub mod router;
pub mod schema;
pub mod tool_registry;
pub mod vector_store;
pub mod workflow;

pub use config::Config;
pub use workflow::{Intent, Workflow, WorkflowState};
