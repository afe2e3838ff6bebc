use tracing::{info, warn};

use crate::client::{CompletionClient, CompletionParams};
use crate::prompt::summary_prompt;
use crate::types::Turn;

pub static FALLBACK_SUMMARY: &str = "Study session completed successfully.";

pub fn summarize<C: CompletionClient>(
    client: &C,
    params: CompletionParams,
    turns: &[Turn],
    display_name: &str,
) -> String {
    match client.complete(&summary_prompt(turns, display_name), params) {
        Ok(completion) if !completion.text.trim().is_empty() => {
            info!(turns = turns.len(), "session summarized");
            completion.text.trim().to_string()
        }
        Ok(_) => {
            warn!("empty session summary, using fallback");
            FALLBACK_SUMMARY.to_string()
        }
        Err(err) => {
            warn!(error = %err, "session summary failed");
            FALLBACK_SUMMARY.to_string()
        }
    }
}
