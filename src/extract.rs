//! Emotion and understanding classification of a single student turn.
//!
//! Both run as separate completions against the same turn. A failed call never
//! aborts the turn: it degrades to an absent value.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::client::{CompletionClient, CompletionParams};
use crate::prompt::{emotion_prompt, understanding_prompt};
use crate::types::{Emotion, UnderstandingLevel};

static NOT_APPLICABLE: &str = "n/a";

fn first_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid number regex"))
}

/// Case-insensitive substring match against the known labels, in declaration
/// order. Anything unrecognized is [`Emotion::Neutral`].
pub fn parse_emotion(reply: &str) -> Emotion {
    let reply = reply.trim().to_lowercase();
    Emotion::ALL
        .into_iter()
        .find(|emotion| reply.contains(emotion.as_str()))
        .unwrap_or(Emotion::Neutral)
}

/// `None` when the reply marks the turn as non-academic or carries no ASCII number.
/// Numbers outside 1..=10 are clamped.
pub fn parse_understanding(reply: &str) -> Option<UnderstandingLevel> {
    if reply.to_lowercase().contains(NOT_APPLICABLE) {
        return None;
    }
    let digits = first_number().find(reply)?.as_str();
    // Too many digits for u64 is still "above 10".
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(UnderstandingLevel::clamped(value))
}

/// A failed call yields `None`; an unmatched reply yields `Some(Neutral)`.
pub fn detect_emotion<C: CompletionClient>(
    client: &C,
    params: CompletionParams,
    utterance: &str,
) -> Option<Emotion> {
    match client.complete(&emotion_prompt(utterance), params) {
        Ok(completion) => {
            let emotion = parse_emotion(&completion.text);
            debug!(%emotion, raw = %completion.text, "emotion classified");
            Some(emotion)
        }
        Err(err) => {
            warn!(error = %err, "emotion detection failed");
            None
        }
    }
}

pub fn estimate_understanding<C: CompletionClient>(
    client: &C,
    params: CompletionParams,
    utterance: &str,
    reply: &str,
) -> Option<UnderstandingLevel> {
    match client.complete(&understanding_prompt(utterance, reply), params) {
        Ok(completion) => {
            let level = parse_understanding(&completion.text);
            debug!(?level, raw = %completion.text, "understanding estimated");
            level
        }
        Err(err) => {
            warn!(error = %err, "understanding estimation failed");
            None
        }
    }
}
