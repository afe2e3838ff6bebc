//! Prompt text for every completion the tutor issues.

use crate::types::{ExamFact, Mode, ProfileSnapshot, ProgressFact, Turn};
use crate::window::{render_history, render_transcript};

/// Progress facts shown in the reply prompt.
pub const REPLY_PROGRESS_LIMIT: usize = 5;
/// Progress facts shown in the suggestion prompt.
pub const SUGGESTION_PROGRESS_LIMIT: usize = 10;

static GENERAL_TEMPLATE: &str = "You are an empathetic AI tutor and friend for students. Your personality:

🎯 CORE TRAITS:
- Warm, encouraging, and genuinely caring
- Use appropriate emojis to convey emotion
- Ask thoughtful follow-up questions
- Remember previous conversations and academic progress
- Detect emotional states (stress, confusion, excitement) and respond appropriately

📚 ACADEMIC SUPPORT:
- Help with study planning and organization
- Provide explanations in simple, relatable terms
- Encourage active learning through questions
- Track understanding levels (1-10 scale)
- Suggest personalized study techniques

💝 EMOTIONAL SUPPORT:
- Acknowledge feelings and validate experiences
- Offer encouragement during difficult times
- Celebrate achievements, both big and small
- Help manage academic stress and anxiety
- Be a positive, supportive presence

Remember: You're not just a tutor, you're a friend who happens to be really good at helping with academics!";

static STUDY_SESSION_TEMPLATE: &str = "You are now in STUDY SESSION mode! 🎯

Your role:
- Keep the student focused and motivated
- Provide bite-sized explanations when asked
- Check understanding regularly
- Offer encouragement and praise effort
- Track study time and breaks
- Suggest when to take breaks (every 25-30 mins)

Stay energetic, supportive, and focused on learning goals!";

static CHECK_IN_TEMPLATE: &str = "Time for a friendly check-in! 😊

Your focus:
- Ask about their day and how they're feeling
- Inquire about recent studies and understanding
- Check on upcoming exams or deadlines
- Offer emotional support if needed
- Help them plan their next study steps
- Be genuinely interested in their well-being

Keep it conversational and caring!";

static EXAM_PREP_TEMPLATE: &str = "You are now in EXAM PREP mode! 📝

Your role:
- Help the student prioritize topics by weight and weakness
- Quiz them with exam-style questions and review their answers
- Turn mistakes into short, targeted explanations
- Build a realistic revision plan for the days left
- Keep exam nerves in check with calm reassurance

Be focused, practical, and confidence-building!";

/// Fixed reply shown when the tutor cannot produce one.
pub static FALLBACK_REPLY: &str = "I'm having a bit of trouble connecting right now, but I'm still here for you! 😊

Could you tell me what you'd like to work on today? Whether it's:
- Reviewing a specific subject
- Planning your study schedule
- Just having a chat about how you're feeling

I'm here to help however I can!";

pub fn mode_template(mode: Mode) -> &'static str {
    match mode {
        Mode::General => GENERAL_TEMPLATE,
        Mode::StudySession => STUDY_SESSION_TEMPLATE,
        Mode::CheckIn => CHECK_IN_TEMPLATE,
        Mode::ExamPrep => EXAM_PREP_TEMPLATE,
    }
}

/// `high_school` -> `High School`. Underscores become spaces, then every
/// letter that follows a non-letter is upper-cased and the rest lower-cased.
pub fn humanize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn last<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

pub fn profile_block(profile: &ProfileSnapshot, progress: &[ProgressFact]) -> String {
    let mut out = String::from("STUDENT PROFILE:\n");
    if !profile.display_name.is_empty() {
        out.push_str(&format!("- Name: {}\n", profile.display_name));
    }
    if let Some(level) = &profile.academic_level {
        out.push_str(&format!("- Academic Level: {}\n", humanize(level)));
    }
    if !profile.subjects.is_empty() {
        out.push_str(&format!("- Subjects: {}\n", profile.subjects.join(", ")));
    }
    if let Some(style) = &profile.preferred_study_style {
        out.push_str(&format!("- Study Style: {}\n", style));
    }
    out.push_str(&format!(
        "- Total Study Time: {} minutes\n",
        profile.cumulative_study_minutes
    ));
    out.push_str(&format!("- Conversations: {}\n", profile.conversation_count));

    let recent = last(progress, REPLY_PROGRESS_LIMIT);
    if !recent.is_empty() {
        out.push_str("\nRECENT ACADEMIC PROGRESS:\n");
        for fact in recent {
            out.push_str(&format!(
                "- {}: {} (Understanding: {}/10)\n",
                fact.subject, fact.topic, fact.understanding
            ));
        }
    }
    out
}

/// Builds the tutor reply prompt. `history` should already be windowed.
pub fn compose_reply(
    mode: Mode,
    profile: &ProfileSnapshot,
    progress: &[ProgressFact],
    history: &[Turn],
    utterance: &str,
) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        mode_template(mode),
        profile_block(profile, progress),
        render_history(history, utterance)
    )
}

pub fn emotion_prompt(utterance: &str) -> String {
    format!(
        "Analyze the emotional state of this student message. Consider context clues like:
- Word choice and tone
- Mentions of stress, confusion, excitement, frustration
- Academic pressure indicators
- Confidence or uncertainty signals

Student message: \"{utterance}\"

Respond with ONLY one of these emotions: happy, excited, neutral, confused, stressed, sad, frustrated

Emotion:"
    )
}

pub fn understanding_prompt(utterance: &str, reply: &str) -> String {
    format!(
        "Based on this conversation, estimate the student's understanding level of the topic being discussed.
Consider:
- Confidence in their responses
- Questions they ask
- Clarity of their explanations
- Mistakes or misconceptions

Student: \"{utterance}\"
AI Response: \"{reply}\"

If no academic topic is being discussed, respond with \"N/A\".
Otherwise, respond with a number from 1-10 where:
1-3: Struggling, needs basic help
4-6: Developing understanding
7-8: Good grasp, minor gaps
9-10: Strong understanding

Understanding level:"
    )
}

pub fn suggestions_prompt(
    profile: &ProfileSnapshot,
    progress: &[ProgressFact],
    exams: &[ExamFact],
) -> String {
    let progress_summary = last(progress, SUGGESTION_PROGRESS_LIMIT)
        .iter()
        .map(|p| format!("- {}: {} (Level: {}/10)", p.subject, p.topic, p.understanding))
        .collect::<Vec<_>>()
        .join("\n");

    let exam_context = if exams.is_empty() {
        String::new()
    } else {
        let exams = exams
            .iter()
            .map(|e| format!("{} on {}", e.subject, e.date.format("%Y-%m-%d")))
            .collect::<Vec<_>>()
            .join(", ");
        format!("\nUpcoming exams: {exams}")
    };

    format!(
        "Generate 3-5 personalized study suggestions for {name}.
Consider their:
- Academic level: {level}
- Learning style: {style}
- Recent progress: {progress_summary}
{exam_context}

Provide specific, actionable suggestions that match their learning style and current needs.

Suggestions:",
        name = profile.display_name,
        level = profile.academic_level.as_deref().unwrap_or("unspecified"),
        style = profile.preferred_study_style.as_deref().unwrap_or("mixed"),
    )
}

pub fn summary_prompt(turns: &[Turn], display_name: &str) -> String {
    format!(
        "Create a concise summary of this tutoring conversation for {display_name}.
Focus on:
- Main topics discussed
- Student's emotional state and progress
- Key learning achievements
- Areas that need more attention
- Overall session outcome

Keep it encouraging and actionable.

Conversation:
{transcript}

Summary:",
        transcript = render_transcript(turns)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnderstandingLevel;

    fn ada() -> ProfileSnapshot {
        ProfileSnapshot {
            display_name: "Ada".to_string(),
            academic_level: Some("undergraduate".to_string()),
            subjects: vec!["Math".to_string(), "Physics".to_string()],
            ..Default::default()
        }
    }

    fn fact(subject: &str, topic: &str, level: u8) -> ProgressFact {
        ProgressFact {
            subject: subject.to_string(),
            topic: topic.to_string(),
            understanding: UnderstandingLevel::new(level).unwrap(),
        }
    }

    #[test]
    fn humanizes_academic_level() {
        assert_eq!(humanize("high_school"), "High School");
        assert_eq!(humanize("undergraduate"), "Undergraduate");
        assert_eq!(humanize("MIDDLE_school"), "Middle School");
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("pre-med"), "Pre-Med");
        assert_eq!(humanize("a__b"), "A  B");
        assert_eq!(humanize("year_2_student"), "Year 2 Student");
    }

    #[test]
    fn study_session_prompt_has_template_profile_and_cue() {
        let prompt = compose_reply(Mode::StudySession, &ada(), &[], &[], "What is a derivative?");

        assert!(prompt.starts_with(STUDY_SESSION_TEMPLATE));
        assert!(prompt.contains("- Academic Level: Undergraduate\n"));
        assert!(prompt.contains("- Subjects: Math, Physics\n"));
        assert!(!prompt.contains("RECENT ACADEMIC PROGRESS"));
        assert!(!prompt.contains("Study Style"));
        assert!(prompt.ends_with("Student: What is a derivative?\nAI Tutor:"));
    }

    #[test]
    fn every_mode_has_its_own_template() {
        let templates: Vec<&str> = [Mode::General, Mode::StudySession, Mode::CheckIn, Mode::ExamPrep]
            .into_iter()
            .map(mode_template)
            .collect();
        for (i, a) in templates.iter().enumerate() {
            for b in &templates[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn profile_block_lists_only_last_five_progress_facts() {
        let progress: Vec<ProgressFact> = (1..=7)
            .map(|i| fact("Math", &format!("topic {i}"), i as u8))
            .collect();

        let block = profile_block(&ada(), &progress);
        assert!(!block.contains("topic 2 "));
        assert!(block.contains("- Math: topic 3 (Understanding: 3/10)\n"));
        assert!(block.contains("- Math: topic 7 (Understanding: 7/10)\n"));
    }

    #[test]
    fn empty_profile_never_fails() {
        let block = profile_block(&ProfileSnapshot::default(), &[]);
        assert_eq!(
            block,
            "STUDENT PROFILE:\n- Total Study Time: 0 minutes\n- Conversations: 0\n"
        );
    }

    #[test]
    fn suggestions_prompt_lists_progress_and_exams() {
        let exams = vec![ExamFact {
            subject: "Physics".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 12, 3).unwrap(),
        }];
        let prompt = suggestions_prompt(&ada(), &[fact("Math", "Limits", 4)], &exams);

        assert!(prompt.contains("- Math: Limits (Level: 4/10)"));
        assert!(prompt.contains("Upcoming exams: Physics on 2026-12-03"));
        assert!(prompt.contains("- Academic level: undergraduate"));
    }

    #[test]
    fn understanding_prompt_embeds_both_sides() {
        let prompt = understanding_prompt("what is 2+2", "It's 4!");
        assert!(prompt.contains("Student: \"what is 2+2\""));
        assert!(prompt.contains("AI Response: \"It's 4!\""));
        assert!(prompt.contains("\"N/A\""));
    }
}
