use clap::Subcommand;
use focusward_core::storage::{load_sessions, Database};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SessionsAction::List { limit } => {
            let mut sessions = load_sessions(&db);
            if let Some(limit) = limit {
                sessions.truncate(limit);
            }
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
