use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::fs;
use std::path::PathBuf;

use nova::document::{display_or, RetrievedPaper};
use nova::prompt::PLACEHOLDER;
use nova::store::PaperTable;
use nova::translate::{translate_text, GoogleTranslator};
use nova::{extract, process_papers, Config, ExtractionMode, ProcessOutcome};

/// CLI app for extracting and storing paper fields from arXiv sources and OCR text
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Download arXiv papers, extract their fields and append them to the CSV table
    Process {
        /// arXiv paper IDs (e.g., 2501.03225)
        #[arg(short, long, required = true)]
        paper_ids: Vec<String>,
        /// CSV table (defaults to NOVA_CSV_PATH or nova_arxiv_csv.csv)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Extract fields from a local LaTeX or OCR text file
    Extract {
        /// Input file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "latex")]
        mode: Mode,
    },
    /// Print a stored paper as a labeled document
    Show {
        /// arXiv paper ID
        paper_id: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Translate English text sentence by sentence
    Translate {
        /// Text to translate
        #[arg(required = true)]
        text: Vec<String>,
        /// Target language code (defaults to NOVA_TARGET_LANGUAGE or ko)
        #[arg(short, long)]
        target: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Latex,
    OcrText,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Latex => ExtractionMode::Latex,
            Mode::OcrText => ExtractionMode::OcrText,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    // RUST_LOG may come from .env
    dotenvy::dotenv().ok();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut config = Config::from_env();

    match args.command {
        Command::Process { paper_ids, csv } => {
            if let Some(csv) = csv {
                config.csv_path = csv;
            }
            let results = process_papers(&config, &paper_ids)?;

            let mut failed = 0;
            for (paper_id, outcome) in results {
                match outcome {
                    Ok(ProcessOutcome::Stored(row)) => {
                        println!("stored {}: {}", paper_id, display_or(row.title.as_deref(), PLACEHOLDER));
                    }
                    Ok(ProcessOutcome::AlreadyStored) => println!("skipped {}: already stored", paper_id),
                    Err(e) => {
                        failed += 1;
                        println!("failed {}: {}", paper_id, e);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} papers could not be processed", failed, paper_ids.len());
            }
        }
        Command::Extract { file, mode } => {
            let raw = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let fields = extract(&raw, mode.into());
            info!("Extracted fields from {:?} in {} mode", file, fields.mode());

            println!("Title: {}", display_or(fields.title(), PLACEHOLDER));
            if fields.mode() == ExtractionMode::Latex {
                println!("Authors: {}", fields.authors().join(", "));
            }
            println!("Abstract: {}", display_or(fields.abstract_text(), PLACEHOLDER));
            println!("Conclusion: {}", display_or(fields.conclusion(), PLACEHOLDER));
        }
        Command::Show { paper_id, csv } => {
            let table = PaperTable::new(csv.unwrap_or(config.csv_path));
            let row = table
                .find(&paper_id)?
                .with_context(|| format!("{} is not stored in {:?}", paper_id, table.path()))?;

            let document = row.to_labeled_text();
            println!("{}", document);

            // What a retrieval hit on this document would recover
            let parsed = RetrievedPaper::parse(&document);
            println!("---");
            println!("Retrieved title: {}", display_or(parsed.title.as_deref(), PLACEHOLDER));
            println!("Retrieved abstract: {}", display_or(parsed.abstract_text.as_deref(), PLACEHOLDER));
            println!("Retrieved conclusion: {}", display_or(parsed.conclusion.as_deref(), PLACEHOLDER));
        }
        Command::Translate { text, target } => {
            let target = target.unwrap_or_else(|| config.target_language.clone());
            let translator = GoogleTranslator::new(&config);
            println!("{}", translate_text(&translator, &text.join(" "), &target));
        }
    }

    Ok(())
}
