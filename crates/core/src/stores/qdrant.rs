use crate::traits::ChunkIndex;
use crate::{ChunkMetadata, ChunkQuery, LegalChunk, SearchCandidate, SearchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use url::Url;

pub struct QdrantStore {
    endpoint: Url,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: &str,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        })
    }

    fn url(&self, path: &str) -> Result<Url, SearchError> {
        Ok(self
            .endpoint
            .join(&format!("collections/{}{}", self.collection, path))?)
    }

    /// Creates the collection and the `pasal_num` payload index when missing.
    pub async fn ensure_collection(&self) -> Result<(), SearchError> {
        let existing = self.client.get(self.url("")?).send().await?;
        if existing.status().is_success() {
            return Ok(());
        }
        if existing.status() != StatusCode::NOT_FOUND {
            return Err(backend_error(existing.status()));
        }

        let created = self
            .client
            .put(self.url("")?)
            .json(&json!({
                "vectors": { "size": self.vector_size, "distance": "Cosine" }
            }))
            .send()
            .await?;
        if !created.status().is_success() {
            return Err(backend_error(created.status()));
        }

        let indexed = self
            .client
            .put(self.url("/index?wait=true")?)
            .json(&json!({ "field_name": "pasal_num", "field_schema": "integer" }))
            .send()
            .await?;
        if !indexed.status().is_success() {
            return Err(backend_error(indexed.status()));
        }

        Ok(())
    }

    fn point(&self, chunk: &LegalChunk, embedding: &[f32]) -> Result<Value, SearchError> {
        if embedding.len() != self.vector_size {
            return Err(SearchError::Request(format!(
                "embedding dimension {} != {}",
                embedding.len(),
                self.vector_size
            )));
        }

        let mut payload = serde_json::to_value(chunk.metadata())?;
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("text".to_string(), json!(chunk.text));
            fields.insert("chunk_id".to_string(), json!(chunk.chunk_id));
            fields.insert("document_id".to_string(), json!(chunk.document_id));
        }

        Ok(json!({
            "id": point_id(&chunk.chunk_id),
            "vector": embedding,
            "payload": payload,
        }))
    }
}

/// Qdrant point ids must be integers or UUIDs; the chunk's SHA-256 hex id is
/// folded into UUID form so re-ingesting the same chunk overwrites it.
fn point_id(chunk_id: &str) -> String {
    let mut hex: String = chunk_id
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(32)
        .collect();
    while hex.len() < 32 {
        hex.push('0');
    }
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Deletes every point belonging to the given documents.
fn delete_documents_body(document_ids: &[&str]) -> Value {
    json!({
        "filter": {
            "should": document_ids
                .iter()
                .map(|id| json!({ "key": "document_id", "match": { "value": id } }))
                .collect::<Vec<_>>()
        }
    })
}

fn backend_error(status: StatusCode) -> SearchError {
    SearchError::BackendResponse {
        backend: "qdrant".to_string(),
        details: status.to_string(),
    }
}

fn search_body(query_vector: &[f32], query: &ChunkQuery) -> Value {
    let mut body = json!({
        "vector": query_vector,
        "limit": query.top_k,
        "with_payload": true,
    });

    if let Some(article_number) = query.article_number {
        body["filter"] = json!({
            "must": [{ "key": "pasal_num", "match": { "value": article_number } }]
        });
    }

    body
}

fn parse_hits(parsed: &Value) -> Vec<SearchCandidate> {
    let hits = parsed
        .pointer("/result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    hits.into_iter()
        .map(|hit| {
            let payload = hit.pointer("/payload").cloned().unwrap_or(Value::Null);
            let chunk_id = payload
                .pointer("/chunk_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| hit.pointer("/id").map(|id| id.to_string()))
                .unwrap_or_default();
            let text = payload
                .pointer("/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            SearchCandidate {
                chunk_id,
                score: hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0),
                source: "qdrant".to_string(),
                text,
                metadata: serde_json::from_value::<ChunkMetadata>(payload).ok(),
            }
        })
        .collect()
}

#[async_trait]
impl ChunkIndex for QdrantStore {
    async fn index_chunks(
        &self,
        chunks: &[LegalChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError> {
        if chunks.len() != embeddings.len() {
            return Err(SearchError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(embeddings.iter())
            .map(|(chunk, embedding)| self.point(chunk, embedding))
            .collect::<Result<Vec<_>, SearchError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        // Drop the previous run's points for these documents; a shorter
        // re-ingest would otherwise leave stale articles behind.
        let mut document_ids: Vec<&str> = chunks
            .iter()
            .map(|chunk| chunk.document_id.as_str())
            .collect();
        document_ids.sort_unstable();
        document_ids.dedup();

        let deleted = self
            .client
            .post(self.url("/points/delete?wait=true")?)
            .json(&delete_documents_body(&document_ids))
            .send()
            .await?;
        if !deleted.status().is_success() {
            return Err(backend_error(deleted.status()));
        }

        let response = self
            .client
            .put(self.url("/points?wait=true")?)
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response.status()));
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        query: &ChunkQuery,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        if query_vector.len() != self.vector_size {
            return Err(SearchError::Request(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.vector_size
            )));
        }

        let response = self
            .client
            .post(self.url("/points/search")?)
            .json(&search_body(query_vector, query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response.status()));
        }

        let parsed: Value = response.json().await?;
        Ok(parse_hits(&parsed))
    }
}
