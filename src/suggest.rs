use tracing::{info, warn};

use crate::client::{CompletionClient, CompletionParams};
use crate::prompt::suggestions_prompt;
use crate::types::{ExamFact, ProfileSnapshot, ProgressFact};

/// Suggestions fire after every third student/tutor exchange.
pub const DEFAULT_CADENCE: usize = 6;
pub const MAX_SUGGESTIONS: usize = 5;

pub static FALLBACK_SUGGESTIONS: [&str; 4] = [
    "Review your recent notes and highlight key concepts",
    "Practice active recall by explaining topics out loud",
    "Take regular breaks during study sessions",
    "Create visual summaries or mind maps for complex topics",
];

pub fn is_due(turn_count: usize, every: usize) -> bool {
    every > 0 && turn_count > 0 && turn_count % every == 0
}

/// Strips a leading `-`, `•` or `N.` marker. Lines without one are prose.
fn strip_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
        return Some(rest);
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.')
}

pub fn parse_suggestions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter_map(strip_marker)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn fallback() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// Never fails: a failed call or an unparseable reply yields the fixed list.
pub fn generate<C: CompletionClient>(
    client: &C,
    params: CompletionParams,
    profile: &ProfileSnapshot,
    progress: &[ProgressFact],
    exams: &[ExamFact],
) -> Vec<String> {
    let prompt = suggestions_prompt(profile, progress, exams);
    match client.complete(&prompt, params) {
        Ok(completion) => {
            let suggestions = parse_suggestions(&completion.text);
            if suggestions.is_empty() {
                warn!("no suggestions in reply, using fallback");
                return fallback();
            }
            info!(count = suggestions.len(), "study suggestions generated");
            suggestions
        }
        Err(err) => {
            warn!(error = %err, "suggestion generation failed");
            fallback()
        }
    }
}
