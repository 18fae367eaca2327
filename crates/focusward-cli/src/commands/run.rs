//! Interactive focus session.
//!
//! Reads one command per line from stdin and prints every timer event as a
//! JSON line on stdout. End of input quits; a session still in progress is
//! abandoned without a record.

use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use focusward_core::{
    AppLifecycle, Config, Database, Event, FocusTimer, LifecycleNotifier, SessionStore,
    SystemClock, TargetMinutes, TimerEngine, TimerPhase,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

#[derive(Args)]
pub struct RunArgs {
    /// Target minutes (defaults to timer.default_minutes)
    #[arg(long)]
    minutes: Option<String>,
    /// Session category (defaults to categories.default)
    #[arg(long)]
    category: Option<String>,
    /// Start the countdown immediately
    #[arg(long)]
    start: bool,
}

/// One line of stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Start,
    Pause,
    Reset,
    Minutes(String),
    Category(String),
    Lifecycle(AppLifecycle),
    Status,
    Acknowledge,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "start" | "resume" => Self::Start,
            "pause" => Self::Pause,
            "reset" => Self::Reset,
            "minutes" => Self::Minutes(arg.to_string()),
            "category" if !arg.is_empty() => Self::Category(arg.to_string()),
            "category" => return Err("category requires a name".to_string()),
            "background" | "bg" => Self::Lifecycle(AppLifecycle::Background),
            "inactive" => Self::Lifecycle(AppLifecycle::Inactive),
            "active" | "fg" => Self::Lifecycle(AppLifecycle::Active),
            "status" => Self::Status,
            "ack" => Self::Acknowledge,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(command)
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(args))
}

async fn run_session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let category = match &args.category {
        Some(name) => config.resolve_category(name)?,
        None => config.default_category(),
    };
    let target = match &args.minutes {
        Some(input) => TargetMinutes::parse(input),
        None => config.default_target(),
    };

    let store = Arc::new(SessionStore::load(Database::open()?));
    // Stdin is the only lifecycle source here, so transitions are applied
    // in command order instead of through the notifier.
    let notifier = LifecycleNotifier::new();
    let engine = TimerEngine::with_target(SystemClock, target, category);
    let timer = FocusTimer::with_tick_interval(
        engine,
        store,
        notifier.subscribe(),
        config.tick_interval(),
    );
    let mut events = timer.subscribe();

    print_json(&timer.snapshot().await)?;
    if args.start {
        timer.start().await?;
        drain(&mut events)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => {
                        let reply = apply(&timer, &config, command).await;
                        drain(&mut events)?;
                        if let Some(reply) = reply {
                            print_json(&reply)?;
                        }
                    }
                    Err(message) => print_json(&error_line(&message))?,
                }
            }
            event = events.recv() => match event {
                Ok(event) => print_json(&event)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    if matches!(timer.phase().await, TimerPhase::Running | TimerPhase::Paused) {
        tracing::info!("abandoning session in progress");
        timer.reset().await;
    }
    drain(&mut events)?;
    Ok(())
}

/// Run one command. Returns a line to print beyond the emitted events.
async fn apply(
    timer: &FocusTimer<SystemClock>,
    config: &Config,
    command: SessionCommand,
) -> Option<serde_json::Value> {
    match command {
        SessionCommand::Start => match timer.start().await {
            Ok(_) => None,
            Err(e) => Some(error_line(&e.to_string())),
        },
        SessionCommand::Pause => {
            timer.pause().await;
            None
        }
        SessionCommand::Reset => {
            timer.reset().await;
            None
        }
        SessionCommand::Minutes(input) => {
            timer.configure_target(&input).await;
            None
        }
        SessionCommand::Category(name) => match config.resolve_category(&name) {
            Ok(category) => {
                timer.set_category(category).await;
                None
            }
            Err(e) => Some(error_line(&e.to_string())),
        },
        SessionCommand::Lifecycle(next) => {
            timer.observe_lifecycle(next).await;
            None
        }
        SessionCommand::Status => serde_json::to_value(timer.snapshot().await).ok(),
        SessionCommand::Acknowledge => match timer.acknowledge().await {
            Some(_) => None,
            None => Some(error_line("no completed session to acknowledge")),
        },
        SessionCommand::Quit => None,
    }
}

/// Print events that are already queued.
fn drain(events: &mut broadcast::Receiver<Event>) -> Result<(), serde_json::Error> {
    loop {
        match events.try_recv() {
            Ok(event) => print_json(&event)?,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event output fell behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn error_line(message: &str) -> serde_json::Value {
    json!({ "type": "error", "message": message })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
