use nova::document::{RetrievedPaper, ABSTRACT_LABEL, CONCLUSION_LABEL, ID_LABEL, TITLE_LABEL, YEAR_LABEL};
use nova::prompt::{annotate_response, combined_prompt, ChatMessage};
use nova::store::{PaperRow, PaperTable};
use tempfile::tempdir;

fn stored_row() -> PaperRow {
    PaperRow {
        arxiv_id: "2501.03225".to_string(),
        title: Some("  Retrieval for Everyone ".to_string()),
        year: Some(2025),
        authors: vec!["Ana Gomez".to_string(), "Wei Zhang".to_string()],
        abstract_text: Some("We index papers by abstract and conclusion.\nIt helps chat.".to_string()),
        conclusion: Some("Labels make chunks parseable.".to_string()),
    }
}

#[test]
fn test_labeled_document_has_every_label() {
    let text = stored_row().to_labeled_text();
    for label in [ID_LABEL, TITLE_LABEL, YEAR_LABEL, ABSTRACT_LABEL, CONCLUSION_LABEL] {
        assert!(text.contains(label), "missing {}", label);
    }
    assert!(text.contains("Year: 2025"));
}

#[test]
fn test_labeled_round_trip_recovers_trimmed_values() {
    let row = stored_row();
    let parsed = RetrievedPaper::parse(&row.to_labeled_text());

    assert_eq!(parsed.arxiv_id.as_deref(), Some("2501.03225"));
    assert_eq!(parsed.title.as_deref(), Some("Retrieval for Everyone"));
    assert_eq!(
        parsed.abstract_text.as_deref(),
        Some("We index papers by abstract and conclusion.\nIt helps chat.")
    );
    assert_eq!(parsed.conclusion.as_deref(), Some("Labels make chunks parseable."));
}

#[test]
fn test_round_trip_through_csv_table() {
    let dir = tempdir().unwrap();
    let table = PaperTable::new(dir.path().join("papers.csv"));
    table.append(&stored_row()).unwrap();

    let row = table.find("2501.03225").unwrap().unwrap();
    let parsed = RetrievedPaper::parse(&row.to_labeled_text());
    assert_eq!(parsed.title.as_deref(), Some("Retrieval for Everyone"));
    assert_eq!(parsed.conclusion.as_deref(), Some("Labels make chunks parseable."));
}

#[test]
fn test_missing_fields_parse_as_missing() {
    let row = PaperRow {
        arxiv_id: "2501.03225".to_string(),
        title: None,
        year: None,
        authors: Vec::new(),
        abstract_text: None,
        conclusion: None,
    };
    let parsed = RetrievedPaper::parse(&row.to_labeled_text());
    assert_eq!(parsed.title, None);
    assert_eq!(parsed.abstract_text, None);
    assert_eq!(parsed.conclusion, None);
}

#[test]
fn test_retrieved_chunk_flows_into_prompt() {
    let chunk = stored_row().to_labeled_text();
    let retrieved = RetrievedPaper::parse(&chunk);
    let history = vec![ChatMessage::user("Which paper covers retrieval?")];

    let prompt = combined_prompt(Some(&retrieved), "Which paper covers retrieval?", &history);
    assert!(prompt.contains("Title: Retrieval for Everyone"));
    assert!(prompt.contains("Conclusion: Labels make chunks parseable."));

    let answer = annotate_response("This one :stars:", Some(&retrieved));
    assert!(answer.ends_with("arXiv: https://arxiv.org/abs/2501.03225"));
}
