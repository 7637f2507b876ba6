use nova::error::NovaError;
use nova::{process_papers, Config};

#[test]
fn test_process_papers_no_paper_ids() {
    let paper_ids: Vec<String> = Vec::new();
    let result = process_papers(&Config::default(), &paper_ids);
    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), NovaError::NoPaperIdsProvided));
}

#[test]
fn test_error_messages_name_the_paper() {
    let err = NovaError::PaperNotFound("2501.03225".to_string());
    assert!(err.to_string().contains("2501.03225"));
}
