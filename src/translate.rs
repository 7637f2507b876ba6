//! Sentence-by-sentence machine translation of chat requests.
//!
//! The translation service is reached through the [`Translator`] trait. Any
//! failure ends up as readable text in the result; [`translate_text`] never
//! returns an error.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{NovaError, Result};

// English "translate" counts only as an opening word or when followed by a colon
static REQUEST_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:다음을 번역해줘|번역|^\s*translate(?: the following)?\b|\btranslate(?: the following)?\s*[:：])\s*[:：]?\s*",
    )
    .expect("Invalid translation trigger regex pattern")
});
static ENGLISH_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)[A-Za-z].*").expect("Invalid English text regex pattern")
});
static SECTION_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(abstract|conclusion)\b").expect("Invalid section title regex pattern")
});
static ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(Dr|Mr|Ms|Inc|Ltd|Etc)\.").expect("Invalid abbreviation regex pattern")
});
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]\s+").expect("Invalid sentence end regex pattern")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s([,.!?])").expect("Invalid punctuation spacing regex pattern")
});
static BREAK_AFTER_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([.!?])\s+").expect("Invalid sentence break regex pattern")
});
static INDENTED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s+").expect("Invalid indentation regex pattern")
});

/// A machine-translation backend
pub trait Translator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Client for the public Google Translate endpoint
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.translate_base.trim_end_matches('/').to_string(),
        }
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target_language), ("dt", "t"), ("q", text)])
            .send()?;

        if !response.status().is_success() {
            return Err(NovaError::TranslationError(format!("service returned status {}", response.status())));
        }

        let body: Value = response.json()?;
        let translated: String = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| NovaError::TranslationError("unexpected response shape".to_string()))?
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if translated.trim().is_empty() {
            return Err(NovaError::TranslationError("empty translation".to_string()));
        }
        Ok(translated)
    }
}

/// Whether a chat message asks for a translation
pub fn is_translation_request(prompt: &str) -> bool {
    REQUEST_TRIGGER.is_match(prompt)
}

/// The English text to translate: everything from the first ASCII letter after the trigger phrase.
pub fn english_payload(prompt: &str) -> Option<&str> {
    let rest = REQUEST_TRIGGER
        .find(prompt)
        .map_or(prompt, |m| &prompt[m.end()..]);
    ENGLISH_START
        .find(rest)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Split English text into sentences, leaving common abbreviations intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = ABBREVIATION.replace_all(text, "$1 ");

    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(&text) {
        // keep the punctuation with its sentence
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(|s| WHITESPACE.replace_all(s.trim(), " ").into_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Tidy translated text: single spaces, no space before punctuation, one sentence per line.
pub fn clean_spacing(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = BREAK_AFTER_SENTENCE.replace_all(&text, "$1\n");
    let text = INDENTED_LINE.replace_all(&text, "\n");
    text.trim().to_string()
}

fn section_label(section: &str, target_language: &str) -> String {
    let is_abstract = section.eq_ignore_ascii_case("abstract");
    match (target_language, is_abstract) {
        ("ko", true) => "초록".to_string(),
        ("ko", false) => "결론".to_string(),
        (_, true) => "Abstract".to_string(),
        (_, false) => "Conclusion".to_string(),
    }
}

/// Translate a chat request sentence by sentence into `target_language`.
pub fn translate_text(translator: &dyn Translator, prompt: &str, target_language: &str) -> String {
    let Some(mut english) = english_payload(prompt) else {
        return "No English text found to translate.".to_string();
    };

    let mut heading = None;
    if let Some(cap) = SECTION_TITLE.captures(english) {
        if let (Some(whole), Some(section)) = (cap.get(0), cap.get(1)) {
            heading = Some(section_label(section.as_str(), target_language));
            english = english[whole.end()..].trim_start_matches([':', ' ', '\n', '\t']);
        }
    }

    let translated: Vec<String> = split_sentences(english)
        .into_iter()
        .map(|sentence| match translator.translate(&sentence, target_language) {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed for sentence: {}", e);
                format!("[translation error: {}]", sentence)
            }
        })
        .collect();
    debug!("Translated {} sentences", translated.len());

    let body = clean_spacing(&translated.join(" "));
    match heading {
        Some(heading) => format!("{}\n\n{}", heading, body),
        None => body,
    }
}
