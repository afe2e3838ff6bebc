use study_companion::client::mock::ScriptedClient;
use study_companion::config::{ModelConfig, TutorConfig};
use study_companion::prompt::FALLBACK_REPLY;
use study_companion::suggest::FALLBACK_SUGGESTIONS;
use study_companion::summary::FALLBACK_SUMMARY;
use study_companion::{
    Conversation, Emotion, Mode, ProfileSnapshot, ProgressFact, Role, Turn, Tutor, TurnContext,
    TutorError, UnderstandingLevel,
};

fn ada() -> ProfileSnapshot {
    ProfileSnapshot {
        display_name: "Ada".to_string(),
        academic_level: Some("undergraduate".to_string()),
        subjects: vec!["Math".to_string(), "Physics".to_string()],
        preferred_study_style: Some("visual".to_string()),
        ..Default::default()
    }
}

fn tutor(client: &ScriptedClient) -> Tutor<&ScriptedClient> {
    Tutor::new(client, &ModelConfig::default(), &TutorConfig::default())
}

fn ctx(profile: &ProfileSnapshot) -> TurnContext<'_> {
    TurnContext {
        profile,
        progress: &[],
        exams: &[],
    }
}

#[test]
fn study_session_turn_builds_expected_prompt() {
    let client = ScriptedClient::new()
        .reply("A derivative measures how fast something changes.")
        .reply("confused")
        .reply("3");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = tutor.start_conversation(Mode::StudySession);

    let reply = tutor
        .process_turn(&mut conversation, ctx(&profile), "What is a derivative?")
        .unwrap();

    assert_eq!(reply.reply, "A derivative measures how fast something changes.");
    assert_eq!(reply.emotion, Some(Emotion::Confused));
    assert_eq!(reply.understanding, UnderstandingLevel::new(3));
    assert!(reply.suggestions.is_empty());
    assert_eq!(reply.conversation_id, conversation.id());

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("STUDY SESSION mode"));
    assert!(prompts[0].contains("Undergraduate"));
    assert!(prompts[0].contains("Math, Physics"));
    assert!(prompts[0].ends_with("Student: What is a derivative?\nAI Tutor:"));
}

#[test]
fn turns_are_appended_with_extracted_state() {
    let client = ScriptedClient::new().reply("Hi Ada!").reply("Happy").reply("N/A");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::CheckIn);

    tutor
        .process_turn(&mut conversation, ctx(&profile), "Hey, good day today")
        .unwrap();

    let turns = conversation.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::Student);
    assert_eq!(turns[0].text, "Hey, good day today");
    assert_eq!(turns[0].emotion, Some(Emotion::Happy));
    assert_eq!(turns[0].understanding, None);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].text, "Hi Ada!");
    assert!(turns[0].timestamp <= turns[1].timestamp);
}

#[test]
fn emotion_call_failure_keeps_the_reply() {
    let client = ScriptedClient::new()
        .reply("Let's work through it.")
        .fail("quota exceeded")
        .reply("5");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);

    let reply = tutor
        .process_turn(&mut conversation, ctx(&profile), "Integrals are hard")
        .unwrap();

    assert_eq!(reply.reply, "Let's work through it.");
    assert_eq!(reply.emotion, None);
    assert_eq!(reply.understanding, UnderstandingLevel::new(5));
}

#[test]
fn unmatched_emotion_defaults_to_neutral() {
    let client = ScriptedClient::new()
        .reply("Sure.")
        .reply("contemplative")
        .reply("12");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);

    let reply = tutor
        .process_turn(&mut conversation, ctx(&profile), "hmm")
        .unwrap();

    assert_eq!(reply.emotion, Some(Emotion::Neutral));
    assert_eq!(reply.understanding, UnderstandingLevel::new(10));
}

#[test]
fn reply_failure_uses_fallback_and_skips_analysis() {
    let client = ScriptedClient::new().fail("timeout");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);

    let reply = tutor
        .process_turn(&mut conversation, ctx(&profile), "hello?")
        .unwrap();

    assert_eq!(reply.reply, FALLBACK_REPLY);
    assert_eq!(reply.emotion, None);
    assert_eq!(reply.understanding, None);
    assert_eq!(client.prompts().len(), 1);
    assert_eq!(conversation.turn_count(), 2);
}

#[test]
fn suggestions_fire_on_third_exchange() {
    let client = ScriptedClient::new();
    let client = (0..3).fold(client, |c, i| {
        c.reply(&format!("answer {i}")).reply("neutral").reply("6")
    });
    let client = client.reply("1. Take breaks\n- Review notes\nRandom prose");
    let tutor = tutor(&client);
    let profile = ada();
    let progress = vec![ProgressFact {
        subject: "Math".to_string(),
        topic: "Limits".to_string(),
        understanding: UnderstandingLevel::new(4).unwrap(),
    }];
    let context = TurnContext {
        profile: &profile,
        progress: &progress,
        exams: &[],
    };
    let mut conversation = Conversation::new(Mode::StudySession);

    let first = tutor.process_turn(&mut conversation, context, "q1").unwrap();
    let second = tutor.process_turn(&mut conversation, context, "q2").unwrap();
    let third = tutor.process_turn(&mut conversation, context, "q3").unwrap();

    assert!(first.suggestions.is_empty());
    assert!(second.suggestions.is_empty());
    assert_eq!(third.suggestions, vec!["Take breaks", "Review notes"]);

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 10);
    assert!(prompts[9].contains("- Math: Limits (Level: 4/10)"));
    assert!(prompts[9].contains("- Learning style: visual"));
}

#[test]
fn failed_suggestions_use_fixed_list() {
    let client = ScriptedClient::new().reply("ok").reply("sad").reply("2");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);
    for i in 0..4 {
        conversation.append(Turn::student(format!("earlier {i}")));
    }

    let reply = tutor
        .process_turn(&mut conversation, ctx(&profile), "still stuck")
        .unwrap();

    assert_eq!(conversation.turn_count(), 6);
    assert_eq!(reply.suggestions, FALLBACK_SUGGESTIONS);
}

#[test]
fn prompt_only_carries_recent_history() {
    let client = ScriptedClient::new().reply("ok").reply("neutral").reply("N/A");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);
    for i in 0..13 {
        conversation.append(Turn::student(format!("old message #{i};")));
    }

    tutor
        .process_turn(&mut conversation, ctx(&profile), "new")
        .unwrap();

    let prompt = &client.prompts()[0];
    assert!(!prompt.contains("old message #2;"));
    assert!(prompt.contains("old message #3;"));
    assert!(prompt.contains("old message #12;"));
}

#[test]
fn end_session_stores_summary_and_closes() {
    let client = ScriptedClient::new().reply("Great focus on derivatives today.");
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::StudySession);
    conversation.append(Turn::student("What is a derivative?"));
    conversation.append(Turn::assistant("A rate of change."));

    let summary = tutor.end_session(&mut conversation, &profile).unwrap();

    assert_eq!(summary, "Great focus on derivatives today.");
    assert_eq!(conversation.summary(), Some(summary.as_str()));
    assert!(!conversation.is_active());
    assert!(client.prompts()[0].contains("student: What is a derivative?\nassistant: A rate of change."));
}

#[test]
fn end_session_failure_uses_fallback_summary() {
    let client = ScriptedClient::new().fail("503");
    let tutor = tutor(&client);
    let mut conversation = Conversation::new(Mode::General);

    let summary = tutor.end_session(&mut conversation, &ada()).unwrap();
    assert_eq!(summary, FALLBACK_SUMMARY);
    assert!(conversation.is_ended());
}

#[test]
fn ended_conversation_rejects_further_work() {
    let client = ScriptedClient::new();
    let tutor = tutor(&client);
    let profile = ada();
    let mut conversation = Conversation::new(Mode::General);
    conversation.end("done".to_string());

    let turn = tutor.process_turn(&mut conversation, ctx(&profile), "hi");
    assert_eq!(turn.unwrap_err(), TutorError::ConversationEnded(conversation.id().to_string()));
    assert!(matches!(
        tutor.end_session(&mut conversation, &profile),
        Err(TutorError::ConversationEnded(_))
    ));
    assert!(client.prompts().is_empty());
    assert_eq!(conversation.turn_count(), 0);
}
