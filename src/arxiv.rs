//! arXiv access: Atom metadata lookup and e-print source download.

pub mod source;

use backoff::ExponentialBackoff;
use log::{debug, info, warn};
use quick_xml::de::from_str;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::io::{Seek, SeekFrom, Write};
use std::time::Duration;
use tempfile::TempDir;

use crate::config::Config;
use crate::error::{NovaError, Result};

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    published: Option<String>,
}

/// Metadata from the arXiv query API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivEntry {
    pub title: Option<String>,
    pub published_year: i32,
}

/// Parse the first `<entry>` of an Atom feed.
///
/// `Ok(None)` when the feed has no entry or the entry has no usable
/// publication date; an error only for malformed XML.
pub fn parse_atom_entry(feed: &str) -> Result<Option<ArxivEntry>> {
    let feed: Feed = from_str(feed).map_err(|e| NovaError::ApiError(format!("Failed to parse Atom feed: {}", e)))?;

    let Some(entry) = feed.entries.into_iter().next() else {
        return Ok(None);
    };
    let Some(published_year) = entry
        .published
        .as_deref()
        .and_then(|published| published.trim().get(..4))
        .and_then(|year| year.parse().ok())
    else {
        return Ok(None);
    };
    let title = entry
        .title
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty());

    Ok(Some(ArxivEntry { title, published_year }))
}

/// Blocking client for the arXiv API and e-print endpoint
pub struct ArxivClient {
    client: Client,
    api_base: String,
    source_base: String,
    api_timeout: Duration,
}

impl ArxivClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_base: config.arxiv_api_base.trim_end_matches('/').to_string(),
            source_base: config.arxiv_source_base.trim_end_matches('/').to_string(),
            api_timeout: config.api_timeout,
        }
    }

    /// Look up a paper's Atom entry, retrying transient failures with exponential backoff.
    pub fn fetch_entry(&self, paper_id: &str) -> Result<ArxivEntry> {
        let url = format!("{}/api/query", self.api_base);

        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Some(self.api_timeout),
            ..Default::default()
        };

        let operation = || -> std::result::Result<String, backoff::Error<NovaError>> {
            info!("Querying arXiv API for paper: {}", paper_id);
            let response = self
                .client
                .get(&url)
                .query(&[("id_list", paper_id), ("max_results", "1")])
                .send()
                .map_err(|e| backoff::Error::transient(NovaError::NetworkError(e)))?;

            let status = response.status();
            if !status.is_success() {
                warn!("arXiv API returned status {}", status);
                let err = NovaError::ApiError(format!("arXiv API returned status {}", status));
                return Err(if status.is_server_error() {
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                });
            }

            response
                .text()
                .map_err(|e| backoff::Error::transient(NovaError::NetworkError(e)))
        };

        let feed = backoff::retry(backoff, operation).map_err(|e| match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })?;
        debug!("arXiv API response: {}", feed);

        parse_atom_entry(&feed)?.ok_or_else(|| NovaError::PaperNotFound(paper_id.to_string()))
    }

    /// Download the e-print archive and return the main LaTeX file with inputs inlined.
    pub fn fetch_latex(&self, paper_id: &str) -> Result<String> {
        let url = format!("{}/e-print/{}", self.source_base, paper_id);

        info!("Downloading source files from arXiv for paper: {}", paper_id);
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(NovaError::Download(format!("HTTP {} for {}", response.status(), paper_id)));
        }

        let content = response.bytes()?;
        if content.is_empty() {
            return Err(NovaError::Download(format!("empty content for paper ID: {}", paper_id)));
        }

        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path();

        let mut source_file = tempfile::tempfile()?;
        source_file.write_all(&content)?;
        source_file.seek(SeekFrom::Start(0))?;

        source::extract_archive(source_file, temp_path)?;
        let main_tex_file = source::find_main_tex_file(temp_path)?;
        info!("Main LaTeX file: {:?}", main_tex_file.strip_prefix(temp_path).unwrap_or(&main_tex_file));

        let (full_content, included) = source::extract_all_latex_from_files(temp_path, &main_tex_file)?;
        debug!("Inlined {} included files", included.len());

        Ok(full_content)
    }
}
