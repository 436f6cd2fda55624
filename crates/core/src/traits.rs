use crate::{ChunkQuery, LegalChunk, SearchCandidate, SearchError};
use async_trait::async_trait;

/// Persists chunk vectors and answers nearest-neighbour queries, optionally
/// restricted to an exact `pasal_num`.
#[async_trait]
pub trait ChunkIndex {
    async fn index_chunks(
        &self,
        chunks: &[LegalChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SearchError>;

    async fn search(
        &self,
        query_vector: &[f32],
        query: &ChunkQuery,
    ) -> Result<Vec<SearchCandidate>, SearchError>;
}
