use once_cell::sync::Lazy;
use regex::Regex;

use super::cleanup::{clean_markup, clean_title};
use super::{Field, FieldRule};

static TITLE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\title\*?\s*(?:\[[^\]]*\])?\s*\{").expect("Invalid title macro regex pattern")
});
static AUTHOR_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\author\*?\s*(?:\[[^\]]*\])?\s*\{").expect("Invalid author macro regex pattern")
});
static ABSTRACT_ENVIRONMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\begin\{abstract\}(.*?)\\end\{abstract\}").expect("Invalid abstract environment regex pattern")
});
static ABSTRACT_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\abstract\s*\{").expect("Invalid abstract macro regex pattern")
});
static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\section\*?\s*(?:\[[^\]]*\])?\s*\{").expect("Invalid section heading regex pattern")
});
// Where a section's body ends
static SECTION_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\section\*?\s*(?:\[[^\]]*\])?\s*\{|\\appendix\b|\\bibliography(?:style)?\s*\{|\\printbibliography\b|\\begin\{thebibliography\}|\\end\{document\}",
    )
    .expect("Invalid section boundary regex pattern")
});

static AUTHOR_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(^|[^\\])%.*$").expect("Invalid comment regex pattern")
});
static AUTHOR_CONNECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:and|And|AND)\b|\band\b").expect("Invalid author connector regex pattern")
});
static AUTHOR_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\(?:\[[^\]]*\])?").expect("Invalid line break regex pattern")
});
static AUTHOR_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+\*?").expect("Invalid command regex pattern")
});
static AUTHOR_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",+").expect("Invalid author separator regex pattern")
});

/// Macros whose whole argument is noise inside an author block
const AUTHOR_NOTE_MACROS: [&str; 4] = ["thanks", "textsuperscript", "footnote", "inst"];

/// LaTeX field rules in priority order
pub static RULES: [FieldRule; 4] = [
    FieldRule { name: "title_macro", field: Field::Title, locate: title_macro },
    FieldRule { name: "abstract_environment", field: Field::Abstract, locate: abstract_environment },
    FieldRule { name: "abstract_macro", field: Field::Abstract, locate: abstract_macro },
    FieldRule { name: "conclusion_section", field: Field::Conclusion, locate: conclusion_section },
];

/// Find the argument of a brace group opening at `open`.
///
/// Returns the byte range of the content and the index just past the closing
/// brace. Braces are matched with nesting; escaped braces are ignored. If the
/// group never closes, the first `}` after `open` ends it.
pub fn braced_argument(text: &str, open: usize) -> Option<(usize, usize, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open + 1, i, i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    text[open + 1..]
        .find('}')
        .map(|offset| (open + 1, open + 1 + offset, open + 2 + offset))
}

/// Argument of the first macro matched by `pattern` (pattern ends at the opening brace)
fn macro_argument<'a>(text: &'a str, pattern: &Regex) -> Option<&'a str> {
    let m = pattern.find(text)?;
    let (start, end, _) = braced_argument(text, m.end() - 1)?;
    Some(&text[start..end])
}

/// Byte offset of the next section boundary at or after `from`
fn next_boundary(text: &str, from: usize) -> usize {
    SECTION_BOUNDARY
        .find(&text[from..])
        .map_or(text.len(), |m| from + m.start())
}

fn title_macro(text: &str) -> Option<String> {
    macro_argument(text, &TITLE_MACRO).map(clean_title)
}

fn abstract_environment(text: &str) -> Option<String> {
    ABSTRACT_ENVIRONMENT
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| clean_markup(m.as_str()))
}

/// `\abstract{...}` used as a declaration: the text after the macro up to the next section
fn abstract_macro(text: &str) -> Option<String> {
    let m = ABSTRACT_MACRO.find(text)?;
    let (_, _, after) = braced_argument(text, m.end() - 1)?;
    let end = next_boundary(text, after);
    Some(clean_markup(&text[after..end]))
}

fn conclusion_section(text: &str) -> Option<String> {
    let after = SECTION_HEADING.find_iter(text).find_map(|m| {
        let (start, end, after) = braced_argument(text, m.end() - 1)?;
        text[start..end].to_lowercase().contains("conclu").then_some(after)
    })?;
    let end = next_boundary(text, after);
    Some(clean_markup(&text[after..end]))
}

/// Remove `\name{...}` including its (nested) argument for each listed macro
fn strip_macros(text: &str, names: &[&str]) -> String {
    let mut result = text.to_string();
    for name in names {
        let pattern = format!("\\{}{{", name);
        while let Some(start) = result.find(&pattern) {
            let open = start + pattern.len() - 1;
            let end = braced_argument(&result, open).map_or(result.len(), |(_, _, end)| end);
            result.replace_range(start..end, "");
        }
    }
    result
}

/// Split an author block into cleaned author names, in order of appearance.
pub fn split_authors(block: &str) -> Vec<String> {
    let block = AUTHOR_COMMENT.replace_all(block, "$1");
    let block = strip_macros(&block, &AUTHOR_NOTE_MACROS);
    let block = AUTHOR_CONNECTOR.replace_all(&block, ",");
    let block = AUTHOR_LINE_BREAK.replace_all(&block, " ");
    let block = AUTHOR_COMMAND.replace_all(&block, "");
    let block = block.replace(['{', '}'], "");

    AUTHOR_SEPARATOR
        .split(&block)
        .map(clean_markup)
        .filter(|author| !author.is_empty())
        .collect()
}

/// Authors from the first `\author{...}` macro; empty when there is none.
pub fn authors(text: &str) -> Vec<String> {
    macro_argument(text, &AUTHOR_MACRO)
        .map(split_authors)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static FieldRule {
        RULES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_braced_argument_nested() {
        let text = r"\title{A \textbf{B} C} rest";
        let (start, end, after) = braced_argument(text, 6).unwrap();
        assert_eq!(&text[start..end], r"A \textbf{B} C");
        assert_eq!(&text[after..], " rest");
    }

    #[test]
    fn test_braced_argument_unbalanced_takes_first_close() {
        let text = r"{A {B} C";
        let (start, end, _) = braced_argument(text, 0).unwrap();
        assert_eq!(&text[start..end], "A {B");
    }

    #[test]
    fn test_braced_argument_ignores_escaped_braces() {
        let text = r"{a \} b}";
        let (start, end, _) = braced_argument(text, 0).unwrap();
        assert_eq!(&text[start..end], r"a \} b");
    }

    #[test]
    fn test_title_rule() {
        let rule = rule("title_macro");
        assert_eq!(
            rule.apply(r"\title[Short]{  Attention Is \emph{All} You Need }").as_deref(),
            Some("Attention Is All You Need")
        );
        assert_eq!(rule.apply(r"\title{}"), None);
        assert_eq!(rule.apply("no title here"), None);
    }

    #[test]
    fn test_abstract_environment_rule() {
        let text = "\\begin{abstract}\nWe present \\textbf{X}, a model.\n\\end{abstract}";
        assert_eq!(rule("abstract_environment").apply(text).as_deref(), Some("We present , a model."));
    }

    #[test]
    fn test_abstract_macro_starts_after_closing_brace() {
        let text = "\\abstract{Short note}\nThe abstract body.\n\\section{Intro}\nBody.";
        assert_eq!(rule("abstract_macro").apply(text).as_deref(), Some("The abstract body."));

        let text = "\\abstract{A {nested} note}\nWe study graphs.\nThey are useful.\n\\section{Introduction}\nIntro text.";
        assert_eq!(
            rule("abstract_macro").apply(text).as_deref(),
            Some("We study graphs. They are useful.")
        );
    }

    #[test]
    fn test_conclusion_rule_stops_at_next_section() {
        let text = r"\section{Conclusion} text1 \section{References} text2";
        assert_eq!(rule("conclusion_section").apply(text).as_deref(), Some("text1"));
    }

    #[test]
    fn test_conclusion_rule_matches_heading_variants() {
        let text = "\\section*{Conclusions and Future Work}\nWe conclude.\n\\bibliography{refs}\n\\end{document}";
        assert_eq!(rule("conclusion_section").apply(text).as_deref(), Some("We conclude."));
        let text = "\\section{CONCLUDING REMARKS}\nDone.";
        assert_eq!(rule("conclusion_section").apply(text).as_deref(), Some("Done."));
    }

    #[test]
    fn test_conclusion_heading_with_nested_groups() {
        let text = "\\section{Conclusion\\label{sec:conc}}\nWe are done.";
        assert_eq!(rule("conclusion_section").apply(text).as_deref(), Some("We are done."));
        let text = "\\section{Method}\nSteps.\n\\section{\\textsc{Conclusions}}\nWe are done.\n\\appendix\nExtra.";
        assert_eq!(rule("conclusion_section").apply(text).as_deref(), Some("We are done."));
    }

    #[test]
    fn test_split_authors_connectors() {
        let expected = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(split_authors("A, B and C"), expected);
        assert_eq!(split_authors("A, B, C"), expected);
        assert_eq!(split_authors(r"A \and B \and C"), expected);
        assert_eq!(split_authors("A,, B ,C"), expected);
    }

    #[test]
    fn test_split_authors_drops_notes_and_markup() {
        let block = "Alice Smith\\thanks{Work done at \\url{x.org}}\\textsuperscript{1},\n% Carol\nBob Jones\\textsuperscript{2} \\\\ (MIT)";
        assert_eq!(split_authors(block), vec!["Alice Smith", "Bob Jones"]);
    }

    #[test]
    fn test_authors_missing_macro() {
        assert!(authors(r"\title{T}").is_empty());
    }
}
