//! Vector Store Adapter (C3).
//!
//! Queries the `collection`/`embedding` tables (spec section 6) over a
//! pooled Postgres connection. The similarity query is raw SQL using
//! pgvector's `<=>` cosine-distance operator, the same idiom the teacher
//! uses in `memory/db.rs::search_passages_by_embedding` — Diesel's query
//! builder has no native operator for it.

use std::collections::HashMap;
use std::sync::Arc;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Float8, Jsonb, Nullable, Text, Uuid as SqlUuid};
use diesel::{PgConnection, QueryableByName, RunQueryDsl};

use crate::errors::StoreError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStat {
    pub name: String,
    pub document_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDoc {
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub similarity: f32,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    pub equals: Vec<(String, String)>,
}

impl MetadataFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            equals: vec![(field.into(), value.into())],
        }
    }
}

#[derive(QueryableByName)]
struct EmbeddingRow {
    #[diesel(sql_type = SqlUuid)]
    #[diesel(column_name = "id")]
    _id: uuid::Uuid,
    #[diesel(sql_type = Text)]
    document_text: String,
    #[diesel(sql_type = Jsonb)]
    metadata: serde_json::Value,
    #[diesel(sql_type = Nullable<Float8>)]
    distance: Option<f64>,
}

fn row_to_doc(row: EmbeddingRow) -> RetrievedDoc {
    let metadata: HashMap<String, String> = row
        .metadata
        .as_object()
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let source = metadata
        .get("file_name")
        .map(|file_name| {
            if let Some(section) = metadata.get("section") {
                format!("{}§{}", file_name, section)
            } else if let Some(chunk_id) = metadata.get("chunk_id") {
                format!("{}#{}", file_name, chunk_id)
            } else {
                file_name.clone()
            }
        })
        .unwrap_or_else(|| "unknown".to_string());

    let similarity = row.distance.map(|d| (1.0 - d).max(0.0) as f32).unwrap_or(0.0);

    RetrievedDoc {
        content: row.document_text,
        metadata,
        similarity,
        source,
    }
}

fn escape_sql_literal(s: &str) -> String {
    s.replace('\'', "''")
}

fn vector_literal(v: &[f32]) -> String {
    let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
    format!("[{}]", parts.join(","))
}

pub struct VectorStoreAdapter {
    pool: Arc<PgPool>,
}

impl VectorStoreAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn connect(database_url: &str, pool_size: u32) -> anyhow::Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        Ok(Self::new(pool))
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionStat>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = Text)]
                name: String,
                #[diesel(sql_type = diesel::sql_types::BigInt)]
                document_count: i64,
            }

            let rows: Vec<Row> = diesel::sql_query(
                "SELECT c.name AS name, COUNT(e.id) AS document_count \
                 FROM collection c LEFT JOIN embedding e ON e.collection_id = c.id \
                 GROUP BY c.name ORDER BY c.name",
            )
            .load(&mut conn)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|r| CollectionStat {
                    name: r.name,
                    document_count: r.document_count,
                })
                .collect())
        })
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?
    }

    async fn collection_id(&self, collection: &str) -> Result<Option<uuid::Uuid>, StoreError> {
        let pool = self.pool.clone();
        let collection = collection.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = SqlUuid)]
                id: uuid::Uuid,
            }

            let query = format!(
                "SELECT id FROM collection WHERE name = '{}'",
                escape_sql_literal(&collection)
            );
            let rows: Vec<Row> = diesel::sql_query(query)
                .load(&mut conn)
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            Ok(rows.into_iter().next().map(|r| r.id))
        })
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?
    }

    pub async fn similarity_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<RetrievedDoc>, StoreError> {
        let collection_id = self
            .collection_id(collection)
            .await?
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let pool = self.pool.clone();
        let vector_lit = vector_literal(query_vector);
        let filter_sql = render_filter_sql(filter);
        let k = k.max(1);

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let query = format!(
                "SELECT id, document_text, metadata, (embedding <=> '{}') AS distance \
                 FROM embedding WHERE collection_id = '{}'{} \
                 ORDER BY distance ASC LIMIT {}",
                vector_lit, collection_id, filter_sql, k
            );

            let rows: Vec<EmbeddingRow> = diesel::sql_query(query)
                .load(&mut conn)
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            Ok(rows.into_iter().map(row_to_doc).collect())
        })
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?
    }

    pub async fn metadata_lookup(
        &self,
        collection: &str,
        filter: &MetadataFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedDoc>, StoreError> {
        let collection_id = self
            .collection_id(collection)
            .await?
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let pool = self.pool.clone();
        let filter_sql = render_filter_sql(filter);
        let limit = limit.max(1);

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let query = format!(
                "SELECT id, document_text, metadata, NULL::float8 AS distance \
                 FROM embedding WHERE collection_id = '{}'{} LIMIT {}",
                collection_id, filter_sql, limit
            );

            let rows: Vec<EmbeddingRow> = diesel::sql_query(query)
                .load(&mut conn)
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            Ok(rows.into_iter().map(row_to_doc).collect())
        })
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?
    }
}

fn render_filter_sql(filter: &MetadataFilter) -> String {
    filter
        .equals
        .iter()
        .map(|(field, value)| {
            format!(
                " AND metadata->>'{}' = '{}'",
                escape_sql_literal(field),
                escape_sql_literal(value)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_empty_filter_as_no_clause() {
        assert_eq!(render_filter_sql(&MetadataFilter::default()), "");
    }

    #[test]
    fn renders_equality_filter_and_escapes_quotes() {
        let filter = MetadataFilter::eq("section", "article '24");
        assert_eq!(
            render_filter_sql(&filter),
            " AND metadata->>'section' = 'article ''24'"
        );
    }

    #[test]
    fn vector_literal_formats_as_bracketed_csv() {
        assert_eq!(vector_literal(&[1.0, -2.5, 0.0]), "[1,-2.5,0]");
    }

    #[test]
    fn derives_source_from_file_name_and_section() {
        let mut metadata = HashMap::new();
        metadata.insert("file_name".to_string(), "datcom_manual.pdf".to_string());
        metadata.insert("section".to_string(), "article_24".to_string());
        let row = EmbeddingRow {
            _id: uuid::Uuid::nil(),
            document_text: "text".to_string(),
            metadata: serde_json::json!({"file_name": "datcom_manual.pdf", "section": "article_24"}),
            distance: Some(0.1),
        };
        let doc = row_to_doc(row);
        assert_eq!(doc.source, "datcom_manual.pdf§article_24");
        assert!((doc.similarity - 0.9).abs() < 1e-6);
    }
}
