use crate::{
    IngestError, LawConfig, LawEntry, LegalChunk, LegalSplitter, NoiseFilter, SplitterOptions,
};
use crate::models::DocumentFingerprint;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the `.txt` files directly inside `folder`. The law table is keyed
/// by bare file name, so subfolders are not searched.
pub fn discover_text_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_text = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        if is_text {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Cleans and segments one document's raw text.
pub fn chunk_text(
    raw_text: &str,
    law: &LawEntry,
    options: SplitterOptions,
) -> Result<Vec<LegalChunk>, IngestError> {
    let clean = NoiseFilter::new()?.clean(raw_text);
    let splitter = LegalSplitter::new(&law.name, &law.tentang, options)?;
    Ok(splitter.split(&clean))
}

pub fn ingest_folder_chunks(
    folder: &Path,
    laws: &LawConfig,
    options: SplitterOptions,
) -> Result<Vec<LegalChunk>, IngestError> {
    let report = ingest_folder_chunks_best_effort(folder, laws, options)?;
    Ok(report.chunks)
}

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub path: PathBuf,
    pub fingerprint: DocumentFingerprint,
    pub source_name: String,
    pub chunk_count: usize,
}

/// A file with no entry in the law table.
#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub chunks: Vec<LegalChunk>,
    pub processed: Vec<ProcessedDocument>,
    pub skipped_files: Vec<SkippedDocument>,
    pub failed_files: Vec<FailedDocument>,
}

/// Ingests every `.txt` file directly inside `folder`. A file that cannot be read or
/// decoded is reported and the batch continues.
pub fn ingest_folder_chunks_best_effort(
    folder: &Path,
    laws: &LawConfig,
    options: SplitterOptions,
) -> Result<IngestionReport, IngestError> {
    let files = discover_text_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no txt files found in {}",
            folder.display()
        )));
    }

    let noise = NoiseFilter::new()?;
    let mut report = IngestionReport::default();
    let mut cursor = 0u64;

    for path in files {
        let lookup = file_name(&path).map(|name| laws.lookup(name));
        let law = match lookup {
            Ok(law) => law,
            Err(error) => {
                report.failed_files.push(FailedDocument {
                    path,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        let Some(law) = law else {
            report.skipped_files.push(SkippedDocument { path });
            continue;
        };

        let build_result = (|| {
            let bytes = fs::read(&path)?;
            let fingerprint = build_document_fingerprint(&path, &bytes)?;
            let raw_text = String::from_utf8(bytes)?;
            let clean = noise.clean(&raw_text);

            let splitter = LegalSplitter::new(&law.name, &law.tentang, options.clone())?
                .with_document_id(fingerprint.document_id.clone());
            let (chunks, next_cursor) = splitter.split_from(&clean, cursor);
            Ok::<_, IngestError>((fingerprint, chunks, next_cursor))
        })();

        match build_result {
            Ok((fingerprint, chunks, next_cursor)) => {
                cursor = next_cursor;
                report.processed.push(ProcessedDocument {
                    path,
                    fingerprint,
                    source_name: law.name.clone(),
                    chunk_count: chunks.len(),
                });
                report.chunks.extend(chunks);
            }
            Err(error) => report.failed_files.push(FailedDocument {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(report)
}

fn file_name(path: &Path) -> Result<&str, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })
}

fn build_document_fingerprint(
    path: &Path,
    bytes: &[u8],
) -> Result<DocumentFingerprint, IngestError> {
    Ok(DocumentFingerprint {
        document_id: generate_document_id(path),
        file_name: file_name(path)?.to_string(),
        source_path: path.to_string_lossy().to_string(),
        checksum: digest_bytes(bytes),
        ingested_at: Utc::now(),
    })
}

fn generate_document_id(path: &Path) -> String {
    digest_bytes(path.to_string_lossy().as_bytes())
}
