use chrono::Utc;
use tracing::{info, warn};

use crate::client::{CompletionClient, CompletionParams};
use crate::config::{ModelConfig, TutorConfig};
use crate::error::TutorError;
use crate::extract::{detect_emotion, estimate_understanding};
use crate::prompt::{compose_reply, FALLBACK_REPLY};
use crate::suggest;
use crate::summary::summarize;
use crate::types::{
    Conversation, Emotion, ExamFact, Mode, ProfileSnapshot, ProgressFact, Turn, TutorReply,
    UnderstandingLevel,
};
use crate::window::recent_turns;

/// Caller-owned facts about the student, read but never changed by the tutor.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub profile: &'a ProfileSnapshot,
    pub progress: &'a [ProgressFact],
    pub exams: &'a [ExamFact],
}

pub struct Tutor<C> {
    client: C,
    reply_params: CompletionParams,
    analysis_params: CompletionParams,
    settings: TutorConfig,
}

impl<C: CompletionClient> Tutor<C> {
    pub fn new(client: C, model: &ModelConfig, settings: &TutorConfig) -> Self {
        Self {
            client,
            reply_params: model.reply_params(),
            analysis_params: settings.analysis_params(),
            settings: settings.clone(),
        }
    }

    pub fn start_conversation(&self, mode: Mode) -> Conversation {
        let conversation = Conversation::new(mode);
        info!(id = %conversation.id(), %mode, "conversation started");
        conversation
    }

    /// Runs one student turn: reply, emotion, understanding, then suggestions
    /// when due. Completion failures degrade to defaults; the only error is
    /// calling this on an ended conversation.
    pub fn process_turn(
        &self,
        conversation: &mut Conversation,
        ctx: TurnContext<'_>,
        utterance: &str,
    ) -> Result<TutorReply, TutorError> {
        if conversation.is_ended() {
            return Err(TutorError::ConversationEnded(conversation.id().to_string()));
        }
        let mut student = Turn::student(utterance);

        let history = recent_turns(conversation.turns(), self.settings.history_window);
        let prompt = compose_reply(
            conversation.mode(),
            ctx.profile,
            ctx.progress,
            history,
            utterance,
        );

        let (reply, emotion, understanding) = match self.client.complete(&prompt, self.reply_params)
        {
            Ok(completion) if !completion.text.trim().is_empty() => {
                let reply = completion.text.trim().to_string();
                let (emotion, understanding) = self.analyze(utterance, &reply);
                (reply, emotion, understanding)
            }
            Ok(_) => {
                warn!(id = %conversation.id(), "empty tutor reply, using fallback");
                (FALLBACK_REPLY.to_string(), None, None)
            }
            Err(err) => {
                warn!(id = %conversation.id(), error = %err, "tutor reply failed, using fallback");
                (FALLBACK_REPLY.to_string(), None, None)
            }
        };

        student.emotion = emotion;
        student.understanding = understanding;
        conversation.append(student);
        conversation.append(Turn::assistant(reply.clone()));

        let suggestions = if suggest::is_due(conversation.turn_count(), self.settings.suggestion_every)
        {
            suggest::generate(
                &self.client,
                self.reply_params,
                ctx.profile,
                ctx.progress,
                ctx.exams,
            )
        } else {
            Vec::new()
        };

        info!(
            id = %conversation.id(),
            turns = conversation.turn_count(),
            emotion = ?emotion,
            understanding = ?understanding,
            suggestions = suggestions.len(),
            "turn processed"
        );

        Ok(TutorReply {
            reply,
            emotion,
            understanding,
            suggestions,
            conversation_id: conversation.id().to_string(),
        })
    }

    fn analyze(
        &self,
        utterance: &str,
        reply: &str,
    ) -> (Option<Emotion>, Option<UnderstandingLevel>) {
        let emotion = detect_emotion(&self.client, self.analysis_params, utterance);
        let understanding =
            estimate_understanding(&self.client, self.analysis_params, utterance, reply);
        (emotion, understanding)
    }

    /// Summarizes the whole transcript and closes the conversation for good.
    pub fn end_session(
        &self,
        conversation: &mut Conversation,
        profile: &ProfileSnapshot,
    ) -> Result<String, TutorError> {
        if conversation.is_ended() {
            return Err(TutorError::ConversationEnded(conversation.id().to_string()));
        }
        let summary = summarize(
            &self.client,
            self.reply_params,
            conversation.turns(),
            &profile.display_name,
        );
        conversation.end(summary.clone());
        info!(
            id = %conversation.id(),
            duration_mins = (Utc::now() - conversation.created_at()).num_minutes(),
            "session ended"
        );
        Ok(summary)
    }
}
