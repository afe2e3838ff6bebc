use crate::types::{Role, Turn};

pub const DEFAULT_WINDOW: usize = 10;

/// The last `window` turns, oldest first. The returned slice borrows the
/// history, so it can be iterated any number of times.
pub fn recent_turns(turns: &[Turn], window: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(window)..]
}

fn label(role: Role) -> &'static str {
    match role {
        Role::Student => "Student",
        Role::Assistant => "AI Tutor",
        Role::System => "System",
    }
}

/// Renders turns as labeled lines, followed by the cue for the next tutor reply.
pub fn render_history(turns: &[Turn], utterance: &str) -> String {
    let mut out = String::from("CONVERSATION HISTORY:\n");
    for turn in turns {
        out.push_str(&format!("{}: {}\n", label(turn.role), turn.text));
        if let Some(emotion) = turn.emotion {
            out.push_str(&format!("[Emotion detected: {}]\n", emotion));
        }
    }
    out.push_str(&format!("\nStudent: {}\nAI Tutor:", utterance));
    out
}

/// Full role-labeled transcript, one turn per line.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
