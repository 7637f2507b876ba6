//! Extract title, abstract, conclusion and authors from arXiv papers, keep
//! them in a CSV table, and prepare them for retrieval-augmented chat.

pub mod arxiv;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod translate;

pub use config::Config;
pub use error::{NovaError, Result};
pub use extract::{extract, ExtractedFields, ExtractionMode};
pub use pipeline::{process_paper, process_papers, ProcessOutcome};
