// Diesel schema for the reference vector store wire contract (spec section 6).
// `embedding`'s vector column is queried via raw SQL (see vector_store.rs)
// since Diesel's query builder has no native pgvector distance operator.

use diesel::sql_types::*;
use pgvector::sql_types::Vector;

diesel::table! {
    use diesel::sql_types::*;

    collection (id) {
        id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::Vector;

    embedding (id) {
        id -> Uuid,
        collection_id -> Uuid,
        document_text -> Text,
        metadata -> Jsonb,
        embedding -> Nullable<Vector>,
    }
}

diesel::joinable!(embedding -> collection (collection_id));
diesel::allow_tables_to_appear_in_same_query!(collection, embedding);
