use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Emotional state detected in a student message. Declaration order is the
/// order in which classifier replies are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Excited,
    Neutral,
    Confused,
    Stressed,
    Sad,
    Frustrated,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Excited,
        Emotion::Neutral,
        Emotion::Confused,
        Emotion::Stressed,
        Emotion::Sad,
        Emotion::Frustrated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Neutral => "neutral",
            Emotion::Confused => "confused",
            Emotion::Stressed => "stressed",
            Emotion::Sad => "sad",
            Emotion::Frustrated => "frustrated",
        }
    }
}

impl Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Understanding of a topic on a 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UnderstandingLevel(u8);

impl UnderstandingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Pulls any value into range instead of rejecting it.
    pub fn clamped(level: u64) -> Self {
        Self(level.clamp(Self::MIN as u64, Self::MAX as u64) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UnderstandingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("understanding level {value} is outside 1..=10"))
    }
}

impl From<UnderstandingLevel> for u8 {
    fn from(value: UnderstandingLevel) -> Self {
        value.0
    }
}

impl Display for UnderstandingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understanding: Option<UnderstandingLevel>,
}

impl Turn {
    pub fn student(text: impl Into<String>) -> Self {
        Self::new(Role::Student, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
            emotion: None,
            understanding: None,
        }
    }
}

/// Conversational context that picks the instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    General,
    StudySession,
    CheckIn,
    ExamPrep,
}

impl Mode {
    /// Exact, case-sensitive match; anything else is [`Mode::General`].
    pub fn parse(name: &str) -> Self {
        match name {
            "study_session" => Mode::StudySession,
            "check_in" => Mode::CheckIn,
            "exam_prep" => Mode::ExamPrep,
            _ => Mode::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::StudySession => "study_session",
            Mode::CheckIn => "check_in",
            Mode::ExamPrep => "exam_prep",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    mode: Mode,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    active: bool,
    #[serde(default)]
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(mode: Mode) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode,
            created_at: now,
            updated_at: now,
            summary: None,
            active: true,
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Mode is fixed once the first turn is in, and never changes after the end.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if !self.turns.is_empty() || !self.active {
            return false;
        }
        self.mode = mode;
        true
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns appended so far; drives the suggestion cadence.
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_ended(&self) -> bool {
        !self.active
    }

    pub fn append(&mut self, turn: Turn) {
        self.touch(turn.timestamp);
        self.turns.push(turn);
    }

    /// Terminal transition: no turns may follow. Ending twice keeps the first summary.
    pub fn end(&mut self, summary: String) {
        if !self.active {
            return;
        }
        self.summary = Some(summary);
        self.active = false;
        self.touch(Utc::now());
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}

/// Read-only view of the student, supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub display_name: String,
    pub academic_level: Option<String>,
    pub subjects: Vec<String>,
    pub preferred_study_style: Option<String>,
    pub cumulative_study_minutes: u32,
    pub conversation_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressFact {
    pub subject: String,
    pub topic: String,
    pub understanding: UnderstandingLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamFact {
    pub subject: String,
    pub date: NaiveDate,
}

/// Everything produced for one student turn.
#[derive(Debug, Clone, Serialize)]
pub struct TutorReply {
    pub reply: String,
    pub emotion: Option<Emotion>,
    pub understanding: Option<UnderstandingLevel>,
    pub suggestions: Vec<String>,
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn understanding_level_clamps_into_range() {
        assert_eq!(UnderstandingLevel::clamped(0).get(), 1);
        assert_eq!(UnderstandingLevel::clamped(7).get(), 7);
        assert_eq!(UnderstandingLevel::clamped(42).get(), 10);
        assert!(UnderstandingLevel::new(11).is_none());
    }

    #[test]
    fn understanding_level_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<UnderstandingLevel>("0").is_err());
        let level: UnderstandingLevel = serde_json::from_str("4").unwrap();
        assert_eq!(level.get(), 4);
    }

    #[test]
    fn unknown_mode_falls_back_to_general() {
        assert_eq!(Mode::parse("study_session"), Mode::StudySession);
        assert_eq!(Mode::parse("exam_prep"), Mode::ExamPrep);
        assert_eq!(Mode::parse("EXAM_PREP"), Mode::General);
        assert_eq!(Mode::parse(" check_in"), Mode::General);
        assert_eq!(Mode::parse("cram"), Mode::General);
    }

    #[test]
    fn append_advances_updated_at_monotonically() {
        let mut conversation = Conversation::new(Mode::General);
        let created = conversation.updated_at();

        let mut stale = Turn::student("hi");
        stale.timestamp = created - chrono::Duration::hours(1);
        conversation.append(stale);
        assert_eq!(conversation.updated_at(), created);

        conversation.append(Turn::assistant("hello"));
        assert!(conversation.updated_at() >= created);
        assert_eq!(conversation.turn_count(), 2);
    }

    #[test]
    fn end_is_terminal() {
        let mut conversation = Conversation::new(Mode::CheckIn);
        assert!(conversation.is_active());
        assert_eq!(conversation.summary(), None);

        conversation.end("done".to_string());
        let ended_at = conversation.updated_at();
        assert!(conversation.is_ended());
        assert!(!conversation.is_active());
        assert_eq!(conversation.summary(), Some("done"));

        conversation.end("again".to_string());
        assert_eq!(conversation.summary(), Some("done"));

        assert!(!conversation.set_mode(Mode::General));
        assert_eq!(conversation.mode(), Mode::CheckIn);
        assert!(conversation.is_ended());
        assert_eq!(conversation.updated_at(), ended_at);
    }

    #[test]
    fn mode_changes_only_before_first_turn() {
        let mut conversation = Conversation::new(Mode::General);
        assert!(conversation.set_mode(Mode::ExamPrep));
        assert_eq!(conversation.mode(), Mode::ExamPrep);

        conversation.append(Turn::student("hi"));
        assert!(!conversation.set_mode(Mode::CheckIn));
        assert_eq!(conversation.mode(), Mode::ExamPrep);
    }

    #[test]
    fn conversation_survives_json_round_trip() {
        let mut conversation = Conversation::new(Mode::ExamPrep);
        let mut turn = Turn::student("I'm lost");
        turn.emotion = Some(Emotion::Confused);
        conversation.append(turn);

        let json = serde_json::to_string(&conversation).unwrap();
        let restored: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.mode(), Mode::ExamPrep);
        assert_eq!(restored.id(), conversation.id());
        assert_eq!(restored.turns()[0].emotion, Some(Emotion::Confused));
        assert!(json.contains("\"role\":\"student\""));
    }
}
