//! Conversation pipeline for a study companion: windows the chat history,
//! composes tutor prompts, reads emotion and understanding out of each turn,
//! and produces periodic study suggestions and an end-of-session summary.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod suggest;
pub mod summary;
pub mod tutor;
pub mod types;
pub mod window;

pub use client::{Completion, CompletionClient, CompletionParams, OpenAiClient};
pub use config::Config;
pub use error::{CompletionError, ConfigError, TutorError};
pub use tutor::{Tutor, TurnContext};
pub use types::{
    Conversation, Emotion, ExamFact, Mode, ProfileSnapshot, ProgressFact, Role, Turn, TutorReply,
    UnderstandingLevel,
};
