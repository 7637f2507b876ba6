//! Flat CSV table of processed papers.
//!
//! The table is append-only: a paper whose ID is already present (trimmed,
//! case-insensitive) is never written again. Duplicate detection is a plain
//! read-before-write and assumes a single writer.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::extract::ExtractedFields;

pub const HEADER: [&str; 6] = ["arXiv_ID", "Title", "Year", "Authors", "Abstract", "Conclusion"];
const ID_COLUMN: &str = "arXiv_ID";
const AUTHOR_SEPARATOR: &str = ", ";

/// One stored paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRow {
    pub arxiv_id: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub conclusion: Option<String>,
}

impl PaperRow {
    /// Build a row from extracted fields; `fallback_title` fills a missing title.
    pub fn from_fields(
        arxiv_id: &str,
        fields: &ExtractedFields,
        year: Option<i32>,
        fallback_title: Option<&str>,
    ) -> Self {
        Self {
            arxiv_id: arxiv_id.trim().to_string(),
            title: fields.title().or(fallback_title).map(str::to_string),
            year,
            authors: fields.authors().to_vec(),
            abstract_text: fields.abstract_text().map(str::to_string),
            conclusion: fields.conclusion().map(str::to_string),
        }
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.arxiv_id.clone(),
            self.title.clone().unwrap_or_default(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.authors.join(AUTHOR_SEPARATOR),
            self.abstract_text.clone().unwrap_or_default(),
            self.conclusion.clone().unwrap_or_default(),
        ]
    }

    fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let cell = |name: &str| -> Option<String> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            arxiv_id: cell("arXiv_ID").unwrap_or_default(),
            title: cell("Title"),
            year: cell("Year").and_then(|y| y.parse().ok()),
            authors: cell("Authors")
                .map(|a| {
                    a.split(',')
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            abstract_text: cell("Abstract"),
            conclusion: cell("Conclusion"),
        }
    }
}

/// Normalize an arXiv ID for duplicate comparison
pub fn normalize_id(arxiv_id: &str) -> String {
    arxiv_id.trim().to_lowercase()
}

/// CSV-backed table of [`PaperRow`]s
#[derive(Debug, Clone)]
pub struct PaperTable {
    path: PathBuf,
}

impl PaperTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_empty_file(&self) -> bool {
        fs::metadata(&self.path).map_or(true, |m| m.len() == 0)
    }

    /// Whether a paper with this ID has already been stored.
    pub fn contains(&self, arxiv_id: &str) -> Result<bool> {
        if self.is_empty_file() {
            return Ok(false);
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(&self.path)?;
        let Some(id_index) = reader.headers()?.iter().position(|h| h.trim() == ID_COLUMN) else {
            warn!("CSV file {:?} has no {} column", self.path, ID_COLUMN);
            return Ok(false);
        };

        let wanted = normalize_id(arxiv_id);
        for record in reader.records() {
            let record = record?;
            if record.get(id_index).is_some_and(|id| normalize_id(id) == wanted) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append a row, creating the file with its header first if needed.
    pub fn append(&self, row: &PaperRow) -> Result<()> {
        let needs_header = self.is_empty_file();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.write_record(row.to_record())?;
        writer.flush()?;

        info!("Stored paper {} in {:?}", row.arxiv_id, self.path);
        Ok(())
    }

    /// Append unless the ID is already present. Returns whether a row was written.
    pub fn insert_if_absent(&self, row: &PaperRow) -> Result<bool> {
        if self.contains(&row.arxiv_id)? {
            info!("arXiv ID {} already exists in {:?}, skipping", row.arxiv_id, self.path);
            return Ok(false);
        }
        self.append(row)?;
        Ok(true)
    }

    /// All stored rows, in file order.
    pub fn rows(&self) -> Result<Vec<PaperRow>> {
        if self.is_empty_file() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        reader
            .records()
            .map(|record| Ok(PaperRow::from_record(&headers, &record?)))
            .collect()
    }

    /// The stored row for an ID, if any.
    pub fn find(&self, arxiv_id: &str) -> Result<Option<PaperRow>> {
        let wanted = normalize_id(arxiv_id);
        Ok(self
            .rows()?
            .into_iter()
            .find(|row| normalize_id(&row.arxiv_id) == wanted))
    }
}
