use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "calnotify", version, about = "Calendar reminder agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle against the connected calendar
    Sync {
        /// Print the sync report as JSON
        #[arg(long)]
        json: bool,
        /// Fetch and plan without scheduling or cancelling anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Cached upcoming events
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Google account connection
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Queued notifications and reminder sounds
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// One-screen overview of the agent state
    Status,
    /// Run the sync-and-deliver loop in the foreground
    Watch {
        /// Run a single pass, then exit
        #[arg(long)]
        once: bool,
        /// Minutes between sync cycles (defaults to the configured interval)
        #[arg(long)]
        interval_mins: Option<u64>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calnotify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync { json, dry_run } => commands::sync::run(json, dry_run).await,
        Commands::Events { action } => commands::events::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Notify { action } => commands::notify::run(action).await,
        Commands::Status => commands::status::run(),
        Commands::Watch {
            once,
            interval_mins,
        } => commands::watch::run(once, interval_mins).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "calnotify", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
