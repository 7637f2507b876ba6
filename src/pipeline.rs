use log::{error, info};

use crate::arxiv::ArxivClient;
use crate::config::Config;
use crate::error::{NovaError, Result};
use crate::extract::{extract, ExtractionMode};
use crate::store::{PaperRow, PaperTable};

/// What happened to one requested paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The table already had a row for this ID; nothing was fetched
    AlreadyStored,
    /// A new row was appended
    Stored(PaperRow),
}

/// Fetch, extract and store one paper, unless it is already in the table.
///
/// A download or decompression failure aborts this paper without writing a row.
pub fn process_paper(config: &Config, arxiv_id: &str) -> Result<ProcessOutcome> {
    let arxiv_id = arxiv_id.trim();
    let table = PaperTable::new(&config.csv_path);

    if table.contains(arxiv_id)? {
        info!("arXiv ID {} already exists in {:?}, skipping", arxiv_id, table.path());
        return Ok(ProcessOutcome::AlreadyStored);
    }

    let client = ArxivClient::new(config);
    let entry = client.fetch_entry(arxiv_id)?;
    let latex = client.fetch_latex(arxiv_id)?;

    let fields = extract(&latex, ExtractionMode::Latex);
    info!(
        "Extracted from {}: title={}, abstract={}, conclusion={}, authors={}",
        arxiv_id,
        fields.title().is_some(),
        fields.abstract_text().is_some(),
        fields.conclusion().is_some(),
        fields.authors().len()
    );

    let row = PaperRow::from_fields(arxiv_id, &fields, Some(entry.published_year), entry.title.as_deref());
    table.append(&row)?;

    Ok(ProcessOutcome::Stored(row))
}

/// Process several papers; one paper failing does not stop the others.
pub fn process_papers(config: &Config, arxiv_ids: &[String]) -> Result<Vec<(String, Result<ProcessOutcome>)>> {
    if arxiv_ids.is_empty() {
        return Err(NovaError::NoPaperIdsProvided);
    }

    let results = arxiv_ids
        .iter()
        .map(|arxiv_id| {
            info!("Processing arXiv paper with ID: {}", arxiv_id);
            let outcome = process_paper(config, arxiv_id);
            if let Err(e) = &outcome {
                error!("Could not process {}: {}", arxiv_id, e);
            }
            (arxiv_id.clone(), outcome)
        })
        .collect();

    Ok(results)
}
