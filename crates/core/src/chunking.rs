use crate::error::IngestError;
use crate::models::{ChunkBoundary, LegalChunk, SplitterOptions};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Structural role of a single trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Chapter(&'a str),
    Article { marker: &'a str, number: u32 },
    Body,
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    chapter_re: Regex,
    article_re: Regex,
}

impl LineClassifier {
    pub fn new(options: &SplitterOptions) -> Result<Self, IngestError> {
        Ok(Self {
            chapter_re: Regex::new(options.chapter_regex)?,
            article_re: Regex::new(options.article_regex)?,
        })
    }

    /// Chapter markers win over article markers. An article number that does
    /// not fit in `u32` is treated as body text.
    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        if let Some(marker) = self
            .chapter_re
            .captures(line)
            .and_then(|capture| capture.get(1))
        {
            return LineKind::Chapter(marker.as_str());
        }

        let Some(capture) = self.article_re.captures(line) else {
            return LineKind::Body;
        };

        match (capture.get(1), capture.get(2)) {
            (Some(marker), Some(digits)) => match digits.as_str().parse::<u32>() {
                Ok(number) => LineKind::Article {
                    marker: marker.as_str(),
                    number,
                },
                Err(_) => LineKind::Body,
            },
            _ => LineKind::Body,
        }
    }
}

/// Splits one cleaned statute into article-level chunks.
#[derive(Debug, Clone)]
pub struct LegalSplitter {
    document_id: String,
    source_name: String,
    source_subject: String,
    options: SplitterOptions,
    classifier: LineClassifier,
}

struct SegmenterState {
    chapter: String,
    article_label: String,
    article_number: u32,
    buffer: Vec<String>,
    chunks: Vec<LegalChunk>,
    cursor: u64,
}

impl SegmenterState {
    fn new(options: &SplitterOptions, first_index: u64) -> Self {
        Self {
            chapter: options.default_chapter.to_string(),
            article_label: options.default_article.to_string(),
            article_number: 0,
            buffer: Vec::new(),
            chunks: Vec::new(),
            cursor: first_index,
        }
    }

    fn accepts(&self, number: u32) -> bool {
        self.article_number.checked_add(1) == Some(number)
    }

    fn open_article(&mut self, marker: &str, number: u32, line: &str) {
        self.article_label = title_case(marker);
        self.article_number = number;
        self.buffer = vec![line.to_string()];
    }

    fn opened_article(&self) -> Option<u32> {
        (self.article_number > 0).then_some(self.article_number)
    }
}

impl LegalSplitter {
    pub fn new(
        source_name: impl Into<String>,
        source_subject: impl Into<String>,
        options: SplitterOptions,
    ) -> Result<Self, IngestError> {
        let classifier = LineClassifier::new(&options)?;
        let source_name = source_name.into();
        Ok(Self {
            document_id: source_name.clone(),
            source_name,
            source_subject: source_subject.into(),
            options,
            classifier,
        })
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = document_id.into();
        self
    }

    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        self.classifier.classify(line)
    }

    pub fn split(&self, clean_text: &str) -> Vec<LegalChunk> {
        self.split_from(clean_text, 0).0
    }

    /// Segments `clean_text`, numbering chunks from `first_index`. Returns the
    /// chunks and the next free index.
    pub fn split_from(&self, clean_text: &str, first_index: u64) -> (Vec<LegalChunk>, u64) {
        let mut state = SegmenterState::new(&self.options, first_index);

        for raw_line in clean_text.split('\n') {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            match self.classifier.classify(line) {
                LineKind::Chapter(marker) => {
                    state.chapter = marker.to_uppercase();
                    state.buffer.push(line.to_string());
                }
                LineKind::Article { marker, number } if state.accepts(number) => {
                    self.flush_boundary(&mut state);
                    state.open_article(marker, number, line);
                }
                LineKind::Article { .. } | LineKind::Body => {
                    state.buffer.push(line.to_string());
                }
            }
        }

        self.flush_end_of_input(&mut state);
        (state.chunks, state.cursor)
    }

    /// Mid-stream flush: short bodies are dropped as spurious boundaries.
    fn flush_boundary(&self, state: &mut SegmenterState) {
        if state.buffer.is_empty() {
            return;
        }

        let body = state.buffer.join("\n");
        if body.chars().count() <= self.options.min_chunk_chars {
            return;
        }

        let chunk = self.assemble_chunk(state, &body, ChunkBoundary::Article);
        state.chunks.push(chunk);
    }

    /// Trailing material is kept whatever its length.
    fn flush_end_of_input(&self, state: &mut SegmenterState) {
        if state.buffer.is_empty() {
            return;
        }

        let body = state.buffer.join("\n");
        let chunk = self.assemble_chunk(state, &body, ChunkBoundary::EndOfInput);
        state.chunks.push(chunk);
    }

    fn assemble_chunk(
        &self,
        state: &mut SegmenterState,
        body: &str,
        boundary: ChunkBoundary,
    ) -> LegalChunk {
        let text = format!(
            "{} ({})\n{} > {}:\n{}",
            self.source_name, self.source_subject, state.chapter, state.article_label, body
        );
        let index = state.cursor;
        state.cursor = state.cursor.saturating_add(1);

        LegalChunk {
            chunk_id: make_chunk_id(&self.document_id, index, &text),
            document_id: self.document_id.clone(),
            chunk_index: index,
            text,
            source_name: self.source_name.clone(),
            source_subject: self.source_subject.clone(),
            chapter_label: state.chapter.clone(),
            article_label: state.article_label.clone(),
            article_number: state.opened_article(),
            boundary,
        }
    }
}

/// Segments one document with the default options.
pub fn segment(
    clean_text: &str,
    doc_name: &str,
    doc_subject: &str,
) -> Result<Vec<LegalChunk>, IngestError> {
    let splitter = LegalSplitter::new(doc_name, doc_subject, SplitterOptions::default())?;
    Ok(splitter.split(clean_text))
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut inside_word = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if inside_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            inside_word = true;
        } else {
            titled.push(ch);
            inside_word = false;
        }
    }

    titled
}

fn make_chunk_id(document_id: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
