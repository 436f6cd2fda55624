pub mod chunking;
pub mod cleaning;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod models;
pub mod retrieval;
pub mod stores;
pub mod traits;

pub use chunking::{segment, title_case, LegalSplitter, LineClassifier, LineKind};
pub use cleaning::NoiseFilter;
pub use config::{LawConfig, LawEntry};
pub use embeddings::{
    cosine_similarity, CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{IngestError, SearchError};
pub use ingest::{
    chunk_text, discover_text_files, ingest_folder_chunks, ingest_folder_chunks_best_effort,
    FailedDocument, IngestionReport, ProcessedDocument, SkippedDocument,
};
pub use models::{
    ChunkBoundary, ChunkMetadata, ChunkQuery, DocumentFingerprint, LegalChunk, SearchCandidate,
    SplitterOptions,
};
pub use retrieval::{LegalRetriever, CLAUSE_NOT_FOUND, CLAUSE_TOP_K, CONCEPT_TOP_K};
pub use stores::{MemoryIndex, QdrantStore};
pub use traits::ChunkIndex;
