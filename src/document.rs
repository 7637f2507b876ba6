//! Labeled-segment documents.
//!
//! A stored row is rendered as `Label: value` lines, the shape a CSV loader
//! hands to an embedding index. A retrieved chunk is turned back into fields
//! by label offset: a value runs from just past its label to the next known
//! label. Values that themselves contain a label token are cut short; there
//! is no escaping.

use crate::store::PaperRow;

pub const ID_LABEL: &str = "arXiv_ID:";
pub const TITLE_LABEL: &str = "Title:";
pub const YEAR_LABEL: &str = "Year:";
pub const AUTHORS_LABEL: &str = "Authors:";
pub const ABSTRACT_LABEL: &str = "Abstract:";
pub const CONCLUSION_LABEL: &str = "Conclusion:";

const LABELS: [&str; 6] = [ID_LABEL, TITLE_LABEL, YEAR_LABEL, AUTHORS_LABEL, ABSTRACT_LABEL, CONCLUSION_LABEL];

impl PaperRow {
    /// Render the row as a labeled document, one `Label: value` line per column.
    pub fn to_labeled_text(&self) -> String {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        let authors = self.authors.join(", ");
        let values = [
            self.arxiv_id.as_str(),
            self.title.as_deref().unwrap_or(""),
            year.as_str(),
            authors.as_str(),
            self.abstract_text.as_deref().unwrap_or(""),
            self.conclusion.as_deref().unwrap_or(""),
        ];

        LABELS
            .iter()
            .zip(values)
            .map(|(label, value)| format!("{} {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The value following `label`, up to the next known label or end of text.
pub fn labeled_value(text: &str, label: &str) -> Option<String> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = LABELS
        .iter()
        .filter_map(|other| rest.find(other))
        .min()
        .unwrap_or(rest.len());

    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Fields recovered from a retrieved labeled document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievedPaper {
    pub arxiv_id: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub conclusion: Option<String>,
}

impl RetrievedPaper {
    pub fn parse(text: &str) -> Self {
        Self {
            arxiv_id: labeled_value(text, ID_LABEL)
                .and_then(|id| id.split_whitespace().next().map(str::to_string)),
            title: labeled_value(text, TITLE_LABEL),
            abstract_text: labeled_value(text, ABSTRACT_LABEL),
            conclusion: labeled_value(text, CONCLUSION_LABEL),
        }
    }
}

/// A field's value, or `placeholder` when it is missing
pub fn display_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value_stops_at_next_label() {
        let text = "Title: A Title\nYear: 2025\nAbstract: Text.\nConclusion: Done.";
        assert_eq!(labeled_value(text, TITLE_LABEL).as_deref(), Some("A Title"));
        assert_eq!(labeled_value(text, ABSTRACT_LABEL).as_deref(), Some("Text."));
        assert_eq!(labeled_value(text, CONCLUSION_LABEL).as_deref(), Some("Done."));
        assert_eq!(labeled_value(text, AUTHORS_LABEL), None);
    }

    #[test]
    fn test_empty_value_is_missing() {
        assert_eq!(labeled_value("Title: \nYear: 2020", TITLE_LABEL), None);
    }

    #[test]
    fn test_display_or() {
        assert_eq!(display_or(Some("x"), "N/A"), "x");
        assert_eq!(display_or(Some("  "), "N/A"), "N/A");
        assert_eq!(display_or(None, "N/A"), "N/A");
    }
}
