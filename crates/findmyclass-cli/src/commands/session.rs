//! Session subcommand.
//!
//! Records the signed-in user locally. Ending a session also unlinks the
//! calendar token so the next sign-in starts clean.

use clap::Subcommand;
use findmyclass_core::{CredentialStore, KeyringStore, SessionStore, PROVIDER_TOKEN_KEY};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Sign in as a user
    Start {
        /// User identifier (e.g. university email)
        user: String,
    },
    /// Sign out and unlink the calendar token
    End,
    /// Show the current session
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    match action {
        SessionAction::Start { user } => {
            let record = store.start(&user)?;
            println!("Signed in as {}", record.user);
        }
        SessionAction::End => {
            store.end()?;
            if let Err(e) = KeyringStore::new().remove(PROVIDER_TOKEN_KEY) {
                tracing::warn!(error = %e, "failed to clear provider token");
            }
            println!("Signed out");
        }
        SessionAction::Status { json } => {
            let current = store.current();
            if json {
                println!("{}", serde_json::to_string_pretty(&current)?);
            } else {
                match current {
                    Some(record) => println!(
                        "Signed in as {} since {}",
                        record.user,
                        record.started_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                    None => println!("Not signed in"),
                }
            }
        }
    }
    Ok(())
}
