use calnotify_core::auth::oauth::{self, ClientCredentials, OAuthConfig};
use calnotify_core::{JsonEventCache, Notifier, PendingQueue};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Connect the Google account (opens a browser)
    Login {
        /// OAuth client ID (stored; only needed on the first login)
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret (stored; only needed on the first login)
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Disconnect and clear cached events and reminders
    Logout,
    /// Check authentication status
    Status,
}

pub async fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login {
            client_id,
            client_secret,
        } => {
            match (client_id, client_secret) {
                (Some(client_id), Some(client_secret)) => {
                    oauth::store_client_credentials(&ClientCredentials {
                        client_id,
                        client_secret,
                    })?;
                }
                (None, None) => {}
                _ => return Err("--client-id and --client-secret must be given together".into()),
            }
            let config = OAuthConfig::google()?;
            oauth::authorize(&config).await?;
            println!("authenticated");
        }
        AuthAction::Logout => {
            oauth::clear_tokens()?;
            let queue = PendingQueue::open_default()?;
            queue.cancel_all().await;
            JsonEventCache::open_default()?.clear()?;
            println!("signed out; cached events and reminders cleared");
        }
        AuthAction::Status => match oauth::load_tokens() {
            Some(tokens) => match tokens.expires_at {
                Some(expires_at) => {
                    let when = chrono::DateTime::from_timestamp(expires_at, 0)
                        .map(|t| {
                            t.with_timezone(&Local)
                                .format("%Y-%m-%d %H:%M")
                                .to_string()
                        })
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("authenticated (access token expires {when})");
                }
                None => println!("authenticated"),
            },
            None => println!("not authenticated"),
        },
    }
    Ok(())
}
