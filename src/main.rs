use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use study_companion::{
    Config, ConfigError, Conversation, Mode, OpenAiClient, Role, Tutor, TurnContext, TutorReply,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Args {
    /// Chat with the tutor, resuming the saved conversation if it is still open.
    Chat {
        /// general, study_session, check_in or exam_prep
        #[clap(long, short, default_value = "general")]
        mode: String,
        /// Where the conversation is saved between runs.
        #[clap(long)]
        save: Option<PathBuf>,
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

mod world {
    use clap::Parser;

    #[derive(Parser)]
    #[command(version, about, long_about = None)]
    pub(crate) enum Command {
        /// Print the transcript.
        Log,
        /// Debug dump of the conversation.
        Dump,
        /// Switch mode before the first message.
        Mode { mode: String },
        /// Summarize the session and exit.
        End,
        Exit,
    }
}

type SharedConversation = Arc<Mutex<Conversation>>;

fn save(conversation: &Conversation, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(conversation)?)?;
    Ok(())
}

fn load_or_start(path: &Path, mode: Mode) -> Result<Conversation, ConfigError> {
    if path.exists() {
        let saved: Conversation = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if saved.is_active() {
            info!(id = %saved.id(), turns = saved.turn_count(), "resuming conversation");
            return Ok(saved);
        }
    }
    Ok(Conversation::new(mode))
}

fn with_locked<T>(shared: &SharedConversation, f: impl FnOnce(&mut Conversation) -> T) -> Option<T> {
    let mut guard = shared.lock().ok()?;
    Some(f(&mut *guard))
}

/// Runs `f` on a copy with the lock released, then stores the copy back.
/// A Ctrl-C save during a slow completion sees the conversation as it was
/// before the turn. The chat loop is the only writer.
fn with_snapshot<T>(shared: &SharedConversation, f: impl FnOnce(&mut Conversation) -> T) -> Option<T> {
    let mut working = with_locked(shared, |c| c.clone())?;
    let out = f(&mut working);
    with_locked(shared, |c| *c = working)?;
    Some(out)
}

fn save_and_exit(conversation: &SharedConversation, path: &Path) -> ! {
    match conversation.lock() {
        Ok(conversation) => match save(&conversation, path) {
            Ok(()) => println!("world: Saved into: {:?}", path),
            Err(err) => error!(error = %err, "failed to save conversation"),
        },
        Err(_) => error!("conversation lock poisoned, not saving"),
    }
    println!("world: Exiting.");
    exit(0)
}

fn print_reply(reply: &TutorReply) {
    let emotion = reply.emotion.map(|e| e.to_string());
    let understanding = reply.understanding.map(|u| format!("{u}/10"));
    println!(
        "tutor: {}\n(e: {}, u: {})",
        reply.reply,
        emotion.as_deref().unwrap_or("-"),
        understanding.as_deref().unwrap_or("-"),
    );
    if !reply.suggestions.is_empty() {
        println!("world: Study suggestions:");
        for suggestion in &reply.suggestions {
            println!("  - {}", suggestion);
        }
    }
}

fn exec_chat(
    mode: Mode,
    save_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), ConfigError> {
    let config_path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;
    let save_path = match save_path {
        Some(path) => path,
        None => Config::app_dir()?.join("conversation.json"),
    };

    let tutor = Tutor::new(OpenAiClient::new(&config.model)?, &config.model, &config.tutor);
    let user_name = config.profile.display_name.clone();
    let ctx = TurnContext {
        profile: &config.profile,
        progress: &config.progress,
        exams: &config.exams,
    };

    let conversation: SharedConversation =
        Arc::new(Mutex::new(load_or_start(&save_path, mode)?));

    {
        let conversation = Arc::clone(&conversation);
        let save_path = save_path.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            println!();
            save_and_exit(&conversation, &save_path);
        }) {
            error!(error = %err, "failed to install Ctrl-C handler");
        }
    }

    if let Some((mode, turns)) = with_locked(&conversation, |c| (c.mode(), c.turn_count())) {
        println!(
            "world: {} conversation ({} turns so far). Type #help for commands.",
            mode, turns
        );
    }

    loop {
        print!("{}: ", user_name);
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            save_and_exit(&conversation, &save_path);
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('#') {
            let mut sw = vec!["#".to_string()];
            match shellwords::split(command) {
                Ok(mut words) => sw.append(&mut words),
                Err(err) => {
                    println!("world: {}", err);
                    continue;
                }
            }

            match <world::Command as CommandFactory>::command().try_get_matches_from(sw) {
                Ok(mut matches) => match world::Command::from_arg_matches_mut(&mut matches) {
                    Ok(world::Command::Log) => {
                        with_locked(&conversation, |c| {
                            for turn in c.turns() {
                                let name = match turn.role {
                                    Role::Student => user_name.as_str(),
                                    Role::Assistant => "tutor",
                                    Role::System => "system",
                                };
                                println!("{}: {}", name, turn.text);
                            }
                        });
                    }
                    Ok(world::Command::Dump) => {
                        with_locked(&conversation, |c| println!("world: Conversation: {:#?}", c));
                    }
                    Ok(world::Command::Mode { mode }) => {
                        let mode = Mode::parse(&mode);
                        match with_locked(&conversation, |c| c.set_mode(mode)) {
                            Some(true) => println!("world: Mode set to {}", mode),
                            _ => println!("world: Mode can only change before the first message"),
                        }
                    }
                    Ok(world::Command::End) => {
                        match with_snapshot(&conversation, |c| tutor.end_session(c, &config.profile)) {
                            Some(Ok(summary)) => println!("tutor: {}", summary),
                            Some(Err(err)) => println!("world: {}", err),
                            None => error!("conversation lock poisoned"),
                        }
                        save_and_exit(&conversation, &save_path);
                    }
                    Ok(world::Command::Exit) => save_and_exit(&conversation, &save_path),
                    Err(err) => println!("world: {}", err),
                },
                Err(err) => println!("world: {}", err),
            }
        } else {
            match with_snapshot(&conversation, |c| tutor.process_turn(c, ctx, input)) {
                Some(Ok(reply)) => print_reply(&reply),
                Some(Err(err)) => {
                    println!("world: {}", err);
                    save_and_exit(&conversation, &save_path);
                }
                None => {
                    error!("conversation lock poisoned");
                    exit(1);
                }
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("study_companion=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse() {
        Args::Chat { mode, save, config } => {
            if let Err(err) = exec_chat(Mode::parse(&mode), save, config) {
                error!(error = %err, "chat failed");
                eprintln!("world: {}", err);
                exit(1);
            }
        }
    }
}
