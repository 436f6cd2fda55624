use crate::embeddings::cosine_similarity;
use crate::traits::ChunkIndex;
use crate::{ChunkMetadata, ChunkQuery, LegalChunk, SearchCandidate, SearchError};
use async_trait::async_trait;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredChunk {
    chunk_id: String,
    document_id: String,
    text: String,
    metadata: ChunkMetadata,
    vector: Vec<f32>,
}

/// In-process index with the same filter semantics as [`super::QdrantStore`].
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: RwLock<Vec<StoredChunk>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SearchError {
    SearchError::Request("memory index lock poisoned".to_string())
}

#[async_trait]
impl ChunkIndex for MemoryIndex {
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

        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        // Re-indexing a document replaces all of its previous chunks.
        entries.retain(|entry| {
            !chunks
                .iter()
                .any(|chunk| chunk.document_id == entry.document_id)
        });
        for (chunk, vector) in chunks.iter().zip(embeddings) {
            entries.push(StoredChunk {
                chunk_id: chunk.chunk_id.clone(),
                document_id: chunk.document_id.clone(),
                text: chunk.text.clone(),
                metadata: chunk.metadata(),
                vector: vector.clone(),
            });
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        query: &ChunkQuery,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;

        let mut scored: Vec<(f32, &StoredChunk)> = entries
            .iter()
            .filter(|entry| match query.article_number {
                Some(number) => entry.metadata.pasal_num == Some(number),
                None => true,
            })
            .map(|entry| (cosine_similarity(query_vector, &entry.vector), entry))
            .collect();

        scored.sort_by(|left, right| right.0.total_cmp(&left.0));

        Ok(scored
            .into_iter()
            .take(query.top_k)
            .map(|(score, entry)| SearchCandidate {
                chunk_id: entry.chunk_id.clone(),
                score: f64::from(score),
                source: "memory".to_string(),
                text: entry.text.clone(),
                metadata: Some(entry.metadata.clone()),
            })
            .collect())
    }
}
