#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion returned no text")]
    EmptyReply,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("home directory not found")]
    HomeDir,

    #[error("missing completion credentials: {0}")]
    Credentials(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TutorError {
    #[error("conversation {0} has already ended")]
    ConversationEnded(String),
}
