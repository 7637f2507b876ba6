//! Field extraction from paper text.
//!
//! A document's title, abstract, conclusion and (for LaTeX) author list are
//! located by an ordered list of named [`FieldRule`]s. For every field the
//! first rule in list order that yields a non-empty value wins; a field no
//! rule can locate is left missing. Extraction never fails.

pub mod cleanup;
pub mod latex;
pub mod ocr;

use log::debug;
use std::fmt;
use std::str::FromStr;

/// Which kind of text the extractor is reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMode {
    /// Raw LaTeX source
    Latex,
    /// Plain text reconstructed from scanned pages
    OcrText,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Latex => "latex",
            ExtractionMode::OcrText => "ocr_text",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latex" | "tex" => Ok(ExtractionMode::Latex),
            "ocr_text" | "ocr-text" | "ocr" | "text" => Ok(ExtractionMode::OcrText),
            other => Err(format!("unknown extraction mode: {}", other)),
        }
    }
}

/// Single-valued fields located by rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Abstract,
    Conclusion,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Abstract => "abstract",
            Field::Conclusion => "conclusion",
        })
    }
}

/// A named extraction rule: locates one field in a document.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub field: Field,
    pub locate: fn(&str) -> Option<String>,
}

impl FieldRule {
    /// Run the rule, normalizing an empty result to `None`.
    pub fn apply(&self, text: &str) -> Option<String> {
        non_empty((self.locate)(text))
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish()
    }
}

/// Fields extracted from one document.
///
/// Present fields are never empty, and author entries are trimmed and never
/// blank. Values are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    mode: ExtractionMode,
    title: Option<String>,
    abstract_text: Option<String>,
    conclusion: Option<String>,
    authors: Vec<String>,
}

impl ExtractedFields {
    pub fn new(
        mode: ExtractionMode,
        title: Option<String>,
        abstract_text: Option<String>,
        conclusion: Option<String>,
        authors: Vec<String>,
    ) -> Self {
        Self {
            mode,
            title: non_empty(title),
            abstract_text: non_empty(abstract_text),
            conclusion: non_empty(conclusion),
            authors: authors
                .into_iter()
                .map(|author| author.trim().to_string())
                .filter(|author| !author.is_empty())
                .collect(),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => self.title(),
            Field::Abstract => self.abstract_text(),
            Field::Conclusion => self.conclusion(),
        }
    }
}

/// The ordered rule list used for a mode
pub fn rules(mode: ExtractionMode) -> &'static [FieldRule] {
    match mode {
        ExtractionMode::Latex => &latex::RULES,
        ExtractionMode::OcrText => &ocr::RULES,
    }
}

/// Extract title, abstract, conclusion and authors from a document's full text.
pub fn extract(raw_text: &str, mode: ExtractionMode) -> ExtractedFields {
    let rules = rules(mode);

    let locate = |field: Field| -> Option<String> {
        rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| {
                let value = rule.apply(raw_text);
                if value.is_some() {
                    debug!("{} located by rule '{}'", field, rule.name);
                }
                value
            })
    };

    let title = locate(Field::Title);
    let abstract_text = locate(Field::Abstract);
    let conclusion = locate(Field::Conclusion);
    let authors = match mode {
        ExtractionMode::Latex => latex::authors(raw_text),
        ExtractionMode::OcrText => Vec::new(),
    };

    ExtractedFields::new(mode, title, abstract_text, conclusion, authors)
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
