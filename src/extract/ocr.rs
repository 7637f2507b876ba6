use once_cell::sync::Lazy;
use regex::Regex;

use super::cleanup::collapse_whitespace;
use super::{Field, FieldRule};

static ARXIV_BANNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*arXiv:").expect("Invalid arXiv banner regex pattern")
});
// Case-sensitive on purpose: "ABSTRACT" in running headers is not the heading
static ABSTRACT_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*Abstract\b(.*)$").expect("Invalid abstract heading regex pattern")
});
static CONCLUSION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d{1,2}(?:\.\d+)*\.?\s+|[ivx]{1,4}\.\s+)?(?:conclusions?(?:\s+and\s+[a-z]+(?:\s+[a-z]+)?)?|concluding\s+\w+)\s*(?:[.:—–-]\s*(.*))?$",
    )
    .expect("Invalid conclusion heading regex pattern")
});
static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d{1,2}(?:\.\d+)*\.?|[IVX]{1,4}\.)\s+[A-Z]").expect("Invalid numbered heading regex pattern")
});
static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-{2,}\s*Page\s+\d+\s*-{2,}\s*$").expect("Invalid page marker regex pattern")
});
static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d{1,3}\s*$").expect("Invalid page number regex pattern")
});
static HYPHENATED_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z])-\n([a-z])").expect("Invalid hyphenation regex pattern")
});

const MAX_HEADING_WORDS: usize = 6;

/// OCR-text field rules in priority order
pub static RULES: [FieldRule; 3] = [
    FieldRule { name: "title_after_arxiv_banner", field: Field::Title, locate: title_after_arxiv_banner },
    FieldRule { name: "abstract_heading", field: Field::Abstract, locate: abstract_heading },
    FieldRule { name: "conclusion_heading", field: Field::Conclusion, locate: conclusion_heading },
];

/// Join per-page OCR output into one document, each page behind a page marker.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("\n\n--- Page {} ---\n\n{}", i + 1, page.as_ref()))
        .collect()
}

/// Layout noise that neither ends nor belongs to a span
fn is_noise_line(line: &str) -> bool {
    PAGE_MARKER.is_match(line) || PAGE_NUMBER.is_match(line)
}

/// Whether a line looks like a section heading: numbered (`1 Introduction`,
/// `III. Method`) or a short capitalized line without sentence punctuation.
pub fn is_section_heading(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || is_noise_line(line) {
        return false;
    }
    if NUMBERED_HEADING.is_match(line) {
        return true;
    }

    let starts_upper = line.chars().next().is_some_and(|c| c.is_uppercase());
    let ends_sentence = line.ends_with(['.', ',', ';', '!', '?']);
    starts_upper && !ends_sentence && line.split_whitespace().count() <= MAX_HEADING_WORDS
}

/// Collect text from `first` plus the following lines up to the next heading.
fn span_until_heading<'a>(first: &str, rest: impl Iterator<Item = &'a str>) -> String {
    let mut lines = Vec::new();
    let first = first.trim_start_matches(|c: char| c.is_whitespace() || ".:—–-".contains(c));
    if !first.trim().is_empty() {
        lines.push(first.trim());
    }

    for line in rest {
        if is_noise_line(line) {
            continue;
        }
        if is_section_heading(line) {
            break;
        }
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line);
        }
    }

    let joined = lines.join("\n");
    collapse_whitespace(&HYPHENATED_BREAK.replace_all(&joined, "$1$2"))
}

fn title_after_arxiv_banner(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| ARXIV_BANNER.is_match(line))?;
    lines.next().map(|line| line.trim().to_string())
}

fn abstract_heading(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let (index, remainder) = lines.iter().enumerate().find_map(|(i, line)| {
        ABSTRACT_HEADING
            .captures(line)
            .map(|cap| (i, cap.get(1).map_or("", |m| m.as_str())))
    })?;
    Some(span_until_heading(remainder, lines[index + 1..].iter().copied()))
}

fn conclusion_heading(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let (index, remainder) = lines.iter().enumerate().find_map(|(i, line)| {
        CONCLUSION_HEADING
            .captures(line)
            .map(|cap| (i, cap.get(1).map_or("", |m| m.as_str())))
    })?;
    Some(span_until_heading(remainder, lines[index + 1..].iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static FieldRule {
        RULES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_section_heading_detection() {
        assert!(is_section_heading("1 Introduction"));
        assert!(is_section_heading("2. Related Work"));
        assert!(is_section_heading("III. Method"));
        assert!(is_section_heading("References"));
        assert!(is_section_heading("Keywords: retrieval, agents"));
        assert!(!is_section_heading("Some abstract text spanning lines."));
        assert!(!is_section_heading("and the model we propose in this paper outperforms"));
        assert!(!is_section_heading("--- Page 2 ---"));
        assert!(!is_section_heading("12"));
    }

    #[test]
    fn test_title_follows_arxiv_banner() {
        let text = "arXiv:2501.03225v1 [cs.CL] 6 Jan 2025\nA Great Paper Title\nAlice, Bob\n";
        assert_eq!(rule("title_after_arxiv_banner").apply(text).as_deref(), Some("A Great Paper Title"));
        assert_eq!(rule("title_after_arxiv_banner").apply("No banner\nTitle"), None);
        assert_eq!(rule("title_after_arxiv_banner").apply("arXiv:2501.03225"), None);
    }

    #[test]
    fn test_abstract_stops_at_numbered_heading() {
        let text = "Title\nAbstract\nSome abstract text spanning lines.\n1 Introduction\nBody.";
        assert_eq!(rule("abstract_heading").apply(text).as_deref(), Some("Some abstract text spanning lines."));
    }

    #[test]
    fn test_abstract_inline_and_across_page_break() {
        let text = "Abstract—We propose a new meth-\nod for parsing.\n\n--- Page 2 ---\n\n2\nIt works well.\nIntroduction\nBody.";
        assert_eq!(
            rule("abstract_heading").apply(text).as_deref(),
            Some("We propose a new method for parsing. It works well.")
        );
    }

    #[test]
    fn test_abstract_heading_is_case_sensitive() {
        assert_eq!(rule("abstract_heading").apply("ABSTRACT\nText here.\n"), None);
    }

    #[test]
    fn test_conclusion_heading_variants() {
        let text = "5 Conclusion\nWe showed things.\nReferences\n[1] A.";
        assert_eq!(rule("conclusion_heading").apply(text).as_deref(), Some("We showed things."));

        let text = "Concluding Remarks\nAll done here.";
        assert_eq!(rule("conclusion_heading").apply(text).as_deref(), Some("All done here."));

        let text = "6. Conclusions and Future Work\nMore to do.\nAcknowledgments\nThanks.";
        assert_eq!(rule("conclusion_heading").apply(text).as_deref(), Some("More to do."));

        let text = "Conclusions drawn from this table are limited.\n";
        assert_eq!(rule("conclusion_heading").apply(text), None);
    }

    #[test]
    fn test_join_pages_markers() {
        let joined = join_pages(&["first", "second"]);
        assert_eq!(joined, "\n\n--- Page 1 ---\n\nfirst\n\n--- Page 2 ---\n\nsecond");
    }
}
