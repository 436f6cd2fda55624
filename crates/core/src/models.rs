use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub document_id: String,
    pub file_name: String,
    pub source_path: String,
    pub checksum: String,
    pub ingested_at: DateTime<Utc>,
}

/// Which finalize path produced a chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChunkBoundary {
    /// Flushed because the next sequential `Pasal` opened.
    Article,
    /// Flushed after the last line of the document.
    EndOfInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub chunk_index: u64,
    pub text: String,
    pub source_name: String,
    pub source_subject: String,
    pub chapter_label: String,
    pub article_label: String,
    pub article_number: Option<u32>,
    pub boundary: ChunkBoundary,
}

impl LegalChunk {
    /// Payload stored next to the vector.
    ///
    /// End-of-input chunks never carry `pasal_num`, so an article filter
    /// cannot reach a document's trailing segment.
    pub fn metadata(&self) -> ChunkMetadata {
        let pasal_num = match self.boundary {
            ChunkBoundary::Article => self.article_number,
            ChunkBoundary::EndOfInput => None,
        };

        ChunkMetadata {
            source: self.source_name.clone(),
            tentang: self.source_subject.clone(),
            bab: self.chapter_label.clone(),
            pasal: self.article_label.clone(),
            pasal_num,
        }
    }

    /// Body lines without the two synthesized header lines.
    pub fn body(&self) -> &str {
        self.text.splitn(3, '\n').nth(2).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub source: String,
    pub tentang: String,
    pub bab: String,
    pub pasal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pasal_num: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChunkQuery {
    pub text: String,
    pub top_k: usize,
    pub article_number: Option<u32>,
}

impl ChunkQuery {
    pub fn semantic(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
            article_number: None,
        }
    }

    pub fn article(article_number: u32, top_k: usize) -> Self {
        Self {
            text: format!("Isi pasal {article_number}"),
            top_k,
            article_number: Some(article_number),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub chunk_id: String,
    pub score: f64,
    pub source: String,
    pub text: String,
    pub metadata: Option<ChunkMetadata>,
}

#[derive(Debug, Clone)]
pub struct SplitterOptions {
    pub min_chunk_chars: usize,
    pub default_chapter: &'static str,
    pub default_article: &'static str,
    pub chapter_regex: &'static str,
    pub article_regex: &'static str,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self {
            min_chunk_chars: 20,
            default_chapter: "Pembukaan",
            default_article: "Umum",
            chapter_regex: r"(?i)^\s*(BAB\s+[IVXLCDM]+)",
            article_regex: r"(?i)^\s*(Pasal\s+([0-9]+))",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(boundary: ChunkBoundary, article_number: Option<u32>) -> LegalChunk {
        LegalChunk {
            chunk_id: "id".to_string(),
            document_id: "doc".to_string(),
            chunk_index: 0,
            text: "UU Contoh (Contoh)\nBAB I > Pasal 4:\nPasal 4\nIsi.".to_string(),
            source_name: "UU Contoh".to_string(),
            source_subject: "Contoh".to_string(),
            chapter_label: "BAB I".to_string(),
            article_label: "Pasal 4".to_string(),
            article_number,
            boundary,
        }
    }

    #[test]
    fn metadata_keeps_article_number_for_article_boundaries() {
        let metadata = chunk(ChunkBoundary::Article, Some(4)).metadata();
        assert_eq!(metadata.pasal_num, Some(4));
        assert_eq!(metadata.bab, "BAB I");

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["pasal_num"], 4);
        assert_eq!(json["tentang"], "Contoh");
    }

    #[test]
    fn end_of_input_metadata_has_no_article_number() {
        let metadata = chunk(ChunkBoundary::EndOfInput, Some(4)).metadata();
        assert_eq!(metadata.pasal_num, None);

        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("pasal_num").is_none());
    }

    #[test]
    fn body_strips_header_lines() {
        assert_eq!(chunk(ChunkBoundary::Article, Some(4)).body(), "Pasal 4\nIsi.");
    }

    #[test]
    fn article_query_uses_lookup_phrase() {
        let query = ChunkQuery::article(27, 3);
        assert_eq!(query.text, "Isi pasal 27");
        assert_eq!(query.article_number, Some(27));
    }
}
