use crate::embeddings::{CharacterNgramEmbedder, Embedder};
use crate::traits::ChunkIndex;
use crate::{ChunkQuery, SearchCandidate, SearchError};

pub const CLAUSE_TOP_K: usize = 3;
pub const CONCEPT_TOP_K: usize = 4;
pub const CLAUSE_NOT_FOUND: &str = "Pasal tidak ditemukan.";

/// The two lookups offered to the chat agent: by article number, or by
/// free-text concept.
pub struct LegalRetriever<I, E = CharacterNgramEmbedder>
where
    I: ChunkIndex,
    E: Embedder,
{
    index: I,
    embedder: E,
}

impl<I> LegalRetriever<I>
where
    I: ChunkIndex + Send + Sync,
{
    pub fn new(index: I) -> Self {
        Self::with_embedder(index, CharacterNgramEmbedder::default())
    }
}

impl<I, E> LegalRetriever<I, E>
where
    I: ChunkIndex + Send + Sync,
    E: Embedder,
{
    pub fn with_embedder(index: I, embedder: E) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub async fn clause_hits(&self, article_number: u32) -> Result<Vec<SearchCandidate>, SearchError> {
        let query = ChunkQuery::article(article_number, CLAUSE_TOP_K);
        self.run(&query).await
    }

    pub async fn concept_hits(&self, text: &str) -> Result<Vec<SearchCandidate>, SearchError> {
        if text.trim().is_empty() {
            return Err(SearchError::Request("query is empty".to_string()));
        }
        let query = ChunkQuery::semantic(text, CONCEPT_TOP_K);
        self.run(&query).await
    }

    /// Texts of the chunks filed under `Pasal <article_number>`.
    pub async fn search_specific_clause(&self, article_number: u32) -> Result<String, SearchError> {
        let hits = self.clause_hits(article_number).await?;
        if hits.is_empty() {
            return Ok(CLAUSE_NOT_FOUND.to_string());
        }
        Ok(join_texts(&hits))
    }

    pub async fn search_legal_concept(&self, text: &str) -> Result<String, SearchError> {
        let hits = self.concept_hits(text).await?;
        Ok(join_texts(&hits))
    }

    async fn run(&self, query: &ChunkQuery) -> Result<Vec<SearchCandidate>, SearchError> {
        let vector = self.embedder.embed(&query.text);
        self.index.search(&vector, query).await
    }
}

fn join_texts(hits: &[SearchCandidate]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LegalChunk;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIndex {
        hits: Vec<SearchCandidate>,
        seen: Mutex<Vec<ChunkQuery>>,
    }

    #[async_trait]
    impl ChunkIndex for FakeIndex {
        async fn index_chunks(
            &self,
            _chunks: &[LegalChunk],
            _embeddings: &[Vec<f32>],
        ) -> Result<(), SearchError> {
            Ok(())
        }

        async fn search(
            &self,
            _query_vector: &[f32],
            query: &ChunkQuery,
        ) -> Result<Vec<SearchCandidate>, SearchError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(query.clone());
            }
            Ok(self.hits.iter().take(query.top_k).cloned().collect())
        }
    }

    fn hit(text: &str) -> SearchCandidate {
        SearchCandidate {
            chunk_id: text.to_string(),
            score: 1.0,
            source: "fake".to_string(),
            text: text.to_string(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn clause_lookup_filters_by_article_with_three_results() {
        let index = FakeIndex {
            hits: vec![hit("a"), hit("b"), hit("c"), hit("d")],
            ..Default::default()
        };
        let retriever = LegalRetriever::new(index);

        let text = retriever.search_specific_clause(27).await.unwrap();
        assert_eq!(text, "a\n\nb\n\nc");

        let seen = retriever.index().seen.lock().unwrap();
        assert_eq!(seen[0].article_number, Some(27));
        assert_eq!(seen[0].text, "Isi pasal 27");
        assert_eq!(seen[0].top_k, CLAUSE_TOP_K);
    }

    #[tokio::test]
    async fn missing_clause_reports_not_found() {
        let retriever = LegalRetriever::new(FakeIndex::default());
        let text = retriever.search_specific_clause(5).await.unwrap();
        assert_eq!(text, CLAUSE_NOT_FOUND);
    }

    #[tokio::test]
    async fn concept_lookup_is_unfiltered_with_four_results() {
        let index = FakeIndex {
            hits: vec![hit("a"), hit("b"), hit("c"), hit("d"), hit("e")],
            ..Default::default()
        };
        let retriever = LegalRetriever::new(index);

        let text = retriever.search_legal_concept("sanksi").await.unwrap();
        assert_eq!(text, "a\n\nb\n\nc\n\nd");

        let seen = retriever.index().seen.lock().unwrap();
        assert_eq!(seen[0].article_number, None);
        assert_eq!(seen[0].top_k, CONCEPT_TOP_K);
    }

    #[tokio::test]
    async fn empty_concept_query_is_rejected() {
        let retriever = LegalRetriever::new(FakeIndex::default());
        assert!(retriever.search_legal_concept("   ").await.is_err());
    }

    #[tokio::test]
    async fn offline_folder_lookup_through_memory_index() -> Result<(), Box<dyn std::error::Error>> {
        use crate::{ingest_folder_chunks, LawConfig, LawEntry, MemoryIndex, SplitterOptions};

        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("uu.txt"),
            "Mengingat Pasal 5 UUD\nPasal 1\nYang dimaksud dengan data pribadi adalah data tentang orang.\nPasal 2\nSetiap pengendali data wajib menjaga kerahasiaan.\nPasal 3\nSanksi administratif.",
        )?;
        let mut laws = LawConfig::default();
        laws.insert(
            "uu.txt",
            LawEntry {
                name: "UU Contoh".to_string(),
                tentang: "Contoh".to_string(),
            },
        );

        let chunks = ingest_folder_chunks(dir.path(), &laws, SplitterOptions::default())?;
        let retriever = LegalRetriever::new(MemoryIndex::new());
        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let vectors = retriever.embedder().embed_batch(&texts);
        retriever.index().index_chunks(&chunks, &vectors).await?;

        let clause = retriever.search_specific_clause(2).await?;
        assert!(clause.starts_with("UU Contoh (Contoh)\nPembukaan > Pasal 2:\n"));
        assert!(clause.contains("menjaga kerahasiaan"));

        assert_eq!(retriever.search_specific_clause(5).await?, CLAUSE_NOT_FOUND);

        let concept = retriever.search_legal_concept("sanksi administratif").await?;
        assert_eq!(concept.split("\n\n").count(), chunks.len().min(CONCEPT_TOP_K));
        Ok(())
    }
}
