//! Ordered markup-cleanup passes for LaTeX spans.
//!
//! Order matters: formatting macros go before generic brace stripping,
//! otherwise their arguments would be removed twice or left dangling.

use once_cell::sync::Lazy;
use regex::Regex;

/// One named regex substitution
pub struct CleanupRule {
    pub name: &'static str,
    pattern: &'static Lazy<Regex>,
    replacement: &'static str,
}

impl CleanupRule {
    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

// \emph{..}, \textbf{..}, \url{..}, \textcolor{..}, \textsuperscript{..} and
// any other \name[opt]{arg}
static FORMATTING_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?\{[^{}]*\}").expect("Invalid formatting macro regex pattern")
});
static BRACE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{.*?\}").expect("Invalid brace group regex pattern")
});
static PAREN_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\(.*?\)").expect("Invalid parenthesis group regex pattern")
});
static ENVIRONMENT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:begin|end)\{[^}]*\}").expect("Invalid environment marker regex pattern")
});
// Leading backslash runs go with the command so a removal never exposes a new one
static BARE_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\+[a-zA-Z]+\*?").expect("Invalid command regex pattern")
});
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(^|[^\\])%.*$").expect("Invalid comment regex pattern")
});
static DANGLING_PERIOD_BRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\.\s*\}").expect("Invalid dangling brace regex pattern")
});
static STRAY_CLOSE_BRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\}").expect("Invalid stray brace regex pattern")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Cleanup passes for abstract, conclusion and author spans, in application order.
pub static MARKUP_RULES: [CleanupRule; 10] = [
    CleanupRule { name: "formatting_macros", pattern: &FORMATTING_MACRO, replacement: "" },
    CleanupRule { name: "brace_groups", pattern: &BRACE_GROUP, replacement: "" },
    CleanupRule { name: "paren_groups", pattern: &PAREN_GROUP, replacement: "" },
    CleanupRule { name: "environment_markers", pattern: &ENVIRONMENT_MARKER, replacement: "" },
    CleanupRule { name: "bare_commands", pattern: &BARE_COMMAND, replacement: "" },
    CleanupRule { name: "line_comments", pattern: &LINE_COMMENT, replacement: "$1" },
    CleanupRule { name: "dangling_period_brace", pattern: &DANGLING_PERIOD_BRACE, replacement: "." },
    CleanupRule { name: "stray_close_braces", pattern: &STRAY_CLOSE_BRACE, replacement: "" },
    // `\}b` becomes `\b` once the brace is gone
    CleanupRule { name: "exposed_commands", pattern: &BARE_COMMAND, replacement: "" },
    CleanupRule { name: "whitespace", pattern: &WHITESPACE, replacement: " " },
];

static NOTE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:thanks|footnote)\{[^{}]*\}").expect("Invalid note macro regex pattern")
});
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\(?:\[[^\]]*\])?|~").expect("Invalid line break regex pattern")
});
static MACRO_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?").expect("Invalid macro token regex pattern")
});
static BRACE_CHAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[{}]").expect("Invalid brace regex pattern")
});

/// Lighter passes for titles: notes dropped, other macros unwrapped so their text survives.
pub static TITLE_RULES: [CleanupRule; 5] = [
    CleanupRule { name: "notes", pattern: &NOTE_MACRO, replacement: "" },
    CleanupRule { name: "line_breaks", pattern: &LINE_BREAK, replacement: " " },
    CleanupRule { name: "macro_tokens", pattern: &MACRO_TOKEN, replacement: "" },
    CleanupRule { name: "brace_chars", pattern: &BRACE_CHAR, replacement: "" },
    CleanupRule { name: "whitespace", pattern: &WHITESPACE, replacement: " " },
];

fn run(rules: &[CleanupRule], text: &str) -> String {
    rules
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
        .trim()
        .to_string()
}

/// Strip LaTeX markup and noise from a located span.
pub fn clean_markup(text: &str) -> String {
    run(&MARKUP_RULES, text)
}

/// Strip markup from a title while keeping the text of formatting macros.
pub fn clean_title(text: &str) -> String {
    run(&TITLE_RULES, text)
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static CleanupRule {
        MARKUP_RULES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_formatting_macros_removed_with_argument() {
        assert_eq!(rule("formatting_macros").apply(r"a \textbf{bold} b \url{http://x}"), "a  b ");
        assert_eq!(rule("formatting_macros").apply(r"\cite[p.~3]{key}."), ".");
    }

    #[test]
    fn test_brace_and_paren_groups_removed() {
        assert_eq!(rule("brace_groups").apply("Deep {reinforcement} learning"), "Deep  learning");
        assert_eq!(rule("paren_groups").apply("reinforcement learning (RL) agents"), "reinforcement learning  agents");
        assert_eq!(rule("paren_groups").apply("split (over\nlines) here"), "split  here");
    }

    #[test]
    fn test_comments_keep_escaped_percent() {
        let text = "50\\% of runs % remove me\n% whole line\nkept";
        assert_eq!(rule("line_comments").apply(text), "50\\% of runs \n\nkept");
    }

    #[test]
    fn test_dangling_period_brace_collapsed() {
        assert_eq!(rule("dangling_period_brace").apply("the end . }"), "the end.");
    }

    #[test]
    fn test_clean_markup_full_chain() {
        let text = r"We study \emph{deep} reinforcement (RL) learning \cite{sutton} today.
% a comment
\begin{itemize} \item first \end{itemize}
Results improve by 10\%.}";
        assert_eq!(
            clean_markup(text),
            "We study reinforcement learning today. first Results improve by 10\\%."
        );
    }

    #[test]
    fn test_clean_markup_is_idempotent() {
        let samples = [
            r"We study \emph{deep} reinforcement learning (RL) \cite{sutton}.",
            "Line one (with\nparen) and {brace\ngroup} text % comment\nnext \\textbf{x}.}",
            r"\section*{Intro} \label{sec:intro} plain text \\ more",
            "nothing to clean",
        ];
        for sample in samples {
            let once = clean_markup(sample);
            assert_eq!(clean_markup(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_escaped_brace_does_not_leave_a_command() {
        assert_eq!(clean_markup(r"a \}b"), "a");
        assert_eq!(clean_markup("a"), "a");
    }

    #[test]
    fn test_clean_markup_is_idempotent_over_fragment_combinations() {
        let fragments = [
            "a", " ", r"\}", r"\{", "}", "{", "(", ")", "%", ".", r"\emph{x}", r"\\", "\n", r"\%", "b c", "\\",
        ];
        for x in fragments {
            for y in fragments {
                for z in fragments {
                    let sample = format!("{}{}{}", x, y, z);
                    let once = clean_markup(&sample);
                    assert_eq!(clean_markup(&once), once, "not idempotent for {:?}", sample);
                }
            }
        }
    }

    #[test]
    fn test_clean_title_keeps_formatted_text() {
        assert_eq!(
            clean_title(r"Deep \emph{Learning}\thanks{Funded by X} for\\ {Everyone}"),
            "Deep Learning for Everyone"
        );
    }
}
