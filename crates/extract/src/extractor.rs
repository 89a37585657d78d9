use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::types::Fragment;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Page separator used by `pdftotext` and honored in plain-text documents.
const PAGE_BREAK: char = '\u{0C}';

/// Extracts candidate fragments from a directory of documents.
///
/// Documents are visited in sorted filename order so repeated runs over the
/// same directory always produce the same fragment sequence.
pub struct FragmentExtractor {
    config: ExtractConfig,
    paragraph_split: Regex,
}

impl FragmentExtractor {
    /// Create an extractor with the given configuration
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            paragraph_split: Regex::new(r"\n\s*\n").expect("valid paragraph pattern"),
        }
    }

    /// Extract fragments from every recognized document in `dir`.
    ///
    /// Documents that fail to extract are logged and skipped; a directory
    /// with no extractable content yields an empty list, not an error.
    pub fn extract_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<Fragment>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ExtractError::InputDirNotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| self.is_recognized(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            log::warn!("No extractable documents found in {}", dir.display());
            return Ok(Vec::new());
        }

        log::info!("Extracting text from {} documents...", paths.len());

        let mut fragments = Vec::new();
        for path in &paths {
            match self.extract_document(path) {
                Ok(mut extracted) => fragments.append(&mut extracted),
                Err(err) => {
                    log::warn!("Skipping {}: {err}", path.display());
                }
            }
        }

        log::info!(
            "Extracted {} fragments from {} documents",
            fragments.len(),
            paths.len()
        );
        Ok(fragments)
    }

    /// Extract fragments from a single document.
    pub fn extract_document(&self, path: impl AsRef<Path>) -> Result<Vec<Fragment>> {
        let path = path.as_ref();
        let source_id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let raw = self.read_document_text(path)?;

        let mut fragments = Vec::new();
        for (page_idx, page_text) in raw.split(PAGE_BREAK).enumerate() {
            self.collect_page_fragments(&source_id, page_idx + 1, page_text, &mut fragments);
        }

        log::debug!("{source_id}: {} fragments", fragments.len());
        Ok(fragments)
    }

    fn collect_page_fragments(
        &self,
        source_id: &str,
        page_number: usize,
        page_text: &str,
        out: &mut Vec<Fragment>,
    ) {
        for paragraph in self.paragraph_split.split(page_text) {
            let trimmed = paragraph.trim();
            if trimmed.chars().count() < self.config.min_fragment_chars {
                continue;
            }
            out.push(Fragment::new(
                trimmed.to_string(),
                source_id.to_string(),
                page_number,
            ));
        }
    }

    fn read_document_text(&self, path: &Path) -> Result<String> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if self.config.is_text_extension(&ext) {
            return Ok(std::fs::read_to_string(path)?);
        }
        if ext == "pdf" && self.config.include_pdfs {
            return pdftotext(path);
        }
        Err(ExtractError::UnsupportedDocument(path.to_path_buf()))
    }

    fn is_recognized(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_ascii_lowercase();
        self.config.is_text_extension(&ext) || (ext == "pdf" && self.config.include_pdfs)
    }
}

impl Default for FragmentExtractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

/// Pull page text out of a PDF with the `pdftotext` system binary.
///
/// Pages arrive separated by form feeds, which `extract_document` turns into
/// 1-indexed page numbers.
fn pdftotext(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8"])
        .arg(path)
        .arg("-")
        .output()
        .map_err(|err| ExtractError::PdfExtraction {
            path: path.to_path_buf(),
            reason: format!("failed to run pdftotext: {err} (is poppler installed?)"),
        })?;

    if !output.status.success() {
        return Err(ExtractError::PdfExtraction {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        return Err(ExtractError::PdfExtraction {
            path: path.to_path_buf(),
            reason: "pdftotext produced no text output".to_string(),
        });
    }
    Ok(text)
}
