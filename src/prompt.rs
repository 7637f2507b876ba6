//! Chat-side text composition: prompts for the language model and messages
//! shown to the user. Nothing here talks to a service.

use crate::document::{display_or, RetrievedPaper};
use crate::extract::ExtractedFields;

/// Shown in place of a missing field
pub const PLACEHOLDER: &str = "N/A";
/// Marker the model adds when the retrieved paper should be shown
pub const SHOW_PAPER_MARKER: &str = ":stars:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

fn paper_block(paper: &RetrievedPaper) -> String {
    format!(
        "Title: {}\nAbstract: {}\nConclusion: {}",
        display_or(paper.title.as_deref(), PLACEHOLDER),
        display_or(paper.abstract_text.as_deref(), PLACEHOLDER),
        display_or(paper.conclusion.as_deref(), PLACEHOLDER),
    )
}

/// Build the model prompt from the conversation so far, the current question
/// and the paper retrieved for it.
///
/// `history` is expected to end with the current question, which is not
/// repeated in the history section.
pub fn combined_prompt(retrieved: Option<&RetrievedPaper>, query: &str, history: &[ChatMessage]) -> String {
    let previous = &history[..history.len().saturating_sub(1)];
    let formatted_history = previous
        .iter()
        .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    let retrieval = retrieved
        .map(|paper| format!("Paper found by retrieval:\n{}\n\n", paper_block(paper)))
        .unwrap_or_default();

    format!(
        "[context]:\n\
         Previous conversation:\n{}\n\n\
         Current question:\n{}\n\n\
         {}---\n\
         Use the [context] above if it relates to the previous conversation; otherwise answer fresh. \
         If the retrieved paper should be shown to the user, add {} to your answer.",
        formatted_history, query, retrieval, SHOW_PAPER_MARKER
    )
}

/// Append the retrieved paper to the model's answer when the answer asks for it.
pub fn annotate_response(response: &str, retrieved: Option<&RetrievedPaper>) -> String {
    match retrieved {
        Some(paper) if response.contains(SHOW_PAPER_MARKER) => {
            let link = paper
                .arxiv_id
                .as_deref()
                .map(|id| format!("\narXiv: https://arxiv.org/abs/{}", id))
                .unwrap_or_default();
            format!("{}\n\nFound paper\n\n{}{}", response, paper_block(paper), link)
        }
        _ => response.to_string(),
    }
}

/// Assistant message announcing an uploaded PDF and what was extracted from it
pub fn uploaded_paper_message(filename: &str, fields: &ExtractedFields) -> ChatMessage {
    ChatMessage::assistant(format!(
        "New PDF uploaded: {}\n\nTitle\n\n{}\n\nAbstract\n\n{}\n\nConclusion\n\n{}\n",
        filename,
        display_or(fields.title(), PLACEHOLDER),
        display_or(fields.abstract_text(), PLACEHOLDER),
        display_or(fields.conclusion(), PLACEHOLDER),
    ))
}
