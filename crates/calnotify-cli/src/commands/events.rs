use calnotify_core::event;
use calnotify_core::{EventCache, JsonEventCache};
use chrono::{Local, Utc};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum EventsAction {
    /// List cached upcoming events
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the next upcoming event
    Next {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EventsAction) -> Result<(), Box<dyn std::error::Error>> {
    let cache = JsonEventCache::open_default()?;
    let snapshot = cache.load();

    match action {
        EventsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.events)?);
                return Ok(());
            }
            if snapshot.events.is_empty() {
                println!("no cached events; run `calnotify sync` first");
                return Ok(());
            }
            for event in &snapshot.events {
                let start = event.start.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                match &event.location {
                    Some(location) => println!("{start}  {}  ({location})", event.title),
                    None => println!("{start}  {}", event.title),
                }
            }
            if let Some(synced_at) = snapshot.synced_at {
                let at = synced_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                println!("last synced {at}");
            }
        }
        EventsAction::Next { json } => {
            let next = event::next_event(&snapshot.events, Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&next)?);
                return Ok(());
            }
            match next {
                Some(next) => {
                    let start = next.start.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                    println!("{start}  {}", next.title);
                }
                None => println!("no upcoming events"),
            }
        }
    }
    Ok(())
}
