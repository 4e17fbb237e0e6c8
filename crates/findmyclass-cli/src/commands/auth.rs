use clap::Subcommand;
use findmyclass_core::{CredentialStore, KeyringStore, PROVIDER_TOKEN_KEY};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Google Calendar: login / logout / status
    Google {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Store a calendar access token
    Login {
        /// OAuth access token with calendar read scope
        #[arg(long)]
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Check whether a token is stored
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Google { action: op } => handle_google(op, &KeyringStore::new()),
    }
}

fn handle_google(op: AuthOp, store: &dyn CredentialStore) -> Result<(), Box<dyn std::error::Error>> {
    match op {
        AuthOp::Login { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err("--token must not be empty".into());
            }
            store.set(PROVIDER_TOKEN_KEY, token)?;
            println!("Google calendar linked");
        }
        AuthOp::Logout => {
            store.remove(PROVIDER_TOKEN_KEY)?;
            println!("Google calendar unlinked");
        }
        AuthOp::Status => {
            let linked = matches!(store.get(PROVIDER_TOKEN_KEY)?, Some(t) if !t.is_empty());
            println!("{}", if linked { "linked" } else { "not linked" });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use findmyclass_core::MemoryStore;

    #[test]
    fn test_login_then_logout() {
        let store = MemoryStore::new();

        handle_google(AuthOp::Login { token: " ya29.abc ".into() }, &store).unwrap();
        assert_eq!(store.get(PROVIDER_TOKEN_KEY).unwrap().as_deref(), Some("ya29.abc"));

        handle_google(AuthOp::Logout, &store).unwrap();
        assert_eq!(store.get(PROVIDER_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_blank_token_rejected() {
        let store = MemoryStore::new();
        assert!(handle_google(AuthOp::Login { token: "  ".into() }, &store).is_err());
        assert_eq!(store.get(PROVIDER_TOKEN_KEY).unwrap(), None);
    }
}
