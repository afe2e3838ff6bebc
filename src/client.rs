use openai_api_rust::{
    chat::{ChatApi as _, ChatBody},
    Auth, OpenAI, Role,
};
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::error::{CompletionError, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub total_tokens: Option<u32>,
}

/// A stateless text-completion service. Every call must carry its full context.
pub trait CompletionClient {
    fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<Completion, CompletionError>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for &C {
    fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<Completion, CompletionError> {
        (**self).complete(prompt, params)
    }
}

pub struct OpenAiClient {
    openai: OpenAI,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ConfigError> {
        let auth = match &config.api_key {
            Some(key) => Auth::new(key),
            None => Auth::from_env().map_err(|e| ConfigError::Credentials(format!("{e:?}")))?,
        };
        Ok(Self {
            openai: OpenAI::new(auth, &config.api_base),
            model: config.name.clone(),
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<Completion, CompletionError> {
        let body = ChatBody {
            model: self.model.clone(),
            max_tokens: Some(params.max_tokens as i32),
            temperature: Some(params.temperature),
            top_p: None,
            n: Some(1),
            stream: Some(false),
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            logit_bias: None,
            user: None,
            messages: vec![openai_api_rust::Message {
                role: Role::User,
                content: prompt.to_string(),
            }],
        };
        let completion = self
            .openai
            .chat_completion_create(&body)
            .map_err(|e| CompletionError::Request(format!("{e:?}")))?;

        let choice = completion.choices.first().ok_or(CompletionError::EmptyReply)?;
        let text = choice
            .message
            .as_ref()
            .map(|m| m.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyReply)?;

        if choice.finish_reason.as_deref() != Some("stop") {
            warn!(finish_reason = ?choice.finish_reason, "completion did not stop cleanly");
        }
        debug!(tokens = ?completion.usage.total_tokens, "completion received");

        Ok(Completion {
            text,
            total_tokens: completion.usage.total_tokens,
        })
    }
}

pub mod mock {
    //! Scripted completion client for deterministic tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{Completion, CompletionClient, CompletionParams};
    use crate::error::CompletionError;

    /// Replays queued replies in order and records every prompt it saw.
    /// An exhausted script fails like an unreachable service.
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, text: &str) -> Self {
            self.push(Ok(text.to_string()));
            self
        }

        pub fn fail(self, error: &str) -> Self {
            self.push(Err(error.to_string()));
            self
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
        }

        fn push(&self, reply: Result<String, String>) {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(reply);
            }
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(
            &self,
            prompt: &str,
            _params: CompletionParams,
        ) -> Result<Completion, CompletionError> {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            let next = self
                .replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front());
            match next {
                Some(Ok(text)) => Ok(Completion {
                    text,
                    total_tokens: None,
                }),
                Some(Err(error)) => Err(CompletionError::Request(error)),
                None => Err(CompletionError::Request("script exhausted".to_string())),
            }
        }
    }
}
