//! Extraction of captions and the invitation from free-form model output.
//!
//! Each extraction strategy is a pure function over the raw text. Callers use
//! [`parse_response`], which tries the strategies in priority order; the
//! individual strategies are public so they can be exercised on their own.

use crate::models::Caption;
use regex::Regex;
use std::sync::LazyLock;

static BRACKETED_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Caption\[\d+\]:[^\r\n]*").expect("valid regex"));
static SPACED_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Caption \d+:[^\r\n]*").expect("valid regex"));
static UNSPACED_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Caption\d+:[^\r\n]*").expect("valid regex"));

static INLINE_INVITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Invitation:[ \t]*([^\r\n]*\S)").expect("valid regex"));
static NEXT_LINE_INVITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Invitation:[ \t]*\r?\n[ \t]*([^\r\n]*\S)").expect("valid regex")
});

/// Where the invitation text was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationSource {
    /// `Invitation: <text>` on one line.
    Inline,
    /// `Invitation:` with the text on the following line.
    NextLine,
    /// No marker; everything after the final colon. Low confidence.
    AfterLastColon,
    /// Nothing usable.
    Missing,
}

impl InvitationSource {
    pub fn is_heuristic(self) -> bool {
        matches!(self, InvitationSource::AfterLastColon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub captions: Vec<Caption>,
    pub invitation: String,
    pub invitation_source: InvitationSource,
}

impl ParsedResponse {
    /// At least one caption and a non-empty invitation.
    pub fn is_valid(&self) -> bool {
        !self.captions.is_empty() && !self.invitation.is_empty()
    }
}

pub fn parse_response(text: &str) -> ParsedResponse {
    let captions = extract_captions(text);
    let (invitation, invitation_source) = extract_invitation(text);
    if invitation_source.is_heuristic() {
        tracing::warn!(%invitation, "No Invitation marker in model output, fell back to text after last colon");
    }
    ParsedResponse {
        captions,
        invitation,
        invitation_source,
    }
}

/// Captions from the first strategy that yields any.
pub fn extract_captions(text: &str) -> Vec<Caption> {
    let strategies: [fn(&str) -> Vec<Caption>; 3] =
        [bracketed_captions, spaced_captions, unspaced_captions];
    strategies
        .iter()
        .map(|strategy| strategy(text))
        .find(|captions| !captions.is_empty())
        .unwrap_or_default()
}

/// `Caption[1]: text`
pub fn bracketed_captions(text: &str) -> Vec<Caption> {
    captions_matching(&BRACKETED_CAPTION, text)
}

/// `Caption 1: text`
pub fn spaced_captions(text: &str) -> Vec<Caption> {
    captions_matching(&SPACED_CAPTION, text)
}

/// `Caption1: text`
pub fn unspaced_captions(text: &str) -> Vec<Caption> {
    captions_matching(&UNSPACED_CAPTION, text)
}

fn captions_matching(pattern: &Regex, text: &str) -> Vec<Caption> {
    pattern
        .find_iter(text)
        .filter_map(|m| caption_text(m.as_str()))
        .map(Caption::new)
        .collect()
}

/// Text after the first `": "` of a caption line (or the first colon if the
/// model left out the space).
fn caption_text(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(": ").or_else(|| line.split_once(':'))?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

pub fn extract_invitation(text: &str) -> (String, InvitationSource) {
    if let Some(invitation) = inline_invitation(text) {
        return (invitation, InvitationSource::Inline);
    }
    if let Some(invitation) = next_line_invitation(text) {
        return (invitation, InvitationSource::NextLine);
    }
    match after_last_colon(text) {
        Some(invitation) => (invitation, InvitationSource::AfterLastColon),
        None => (String::new(), InvitationSource::Missing),
    }
}

pub fn inline_invitation(text: &str) -> Option<String> {
    first_capture(&INLINE_INVITATION, text)
}

pub fn next_line_invitation(text: &str) -> Option<String> {
    first_capture(&NEXT_LINE_INVITATION, text)
}

/// Last-resort heuristic: everything after the final colon, trimmed.
/// Picks up unrelated text whenever the model uses colons elsewhere.
pub fn after_last_colon(text: &str) -> Option<String> {
    let (_, tail) = text.rsplit_once(':')?;
    let tail = tail.trim();
    (!tail.is_empty()).then(|| tail.to_string())
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
