use calnotify_core::auth::oauth;
use calnotify_core::notify::content;
use calnotify_core::storage::{self, Config, JsonEventCache, PendingQueue};
use calnotify_core::{event, EventCache};
use chrono::{Local, Utc};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let cache = JsonEventCache::open_default()?;
    let queue = PendingQueue::open_default()?;
    let snapshot = cache.load();

    let account = if oauth::load_tokens().is_some() {
        "authenticated"
    } else {
        "not authenticated"
    };
    println!("account:   {account}");
    match snapshot.synced_at {
        Some(at) => {
            let at = at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            println!("last sync: {at}");
        }
        None => println!("last sync: never"),
    }
    println!("events:    {} cached", snapshot.events.len());
    match event::next_event(&snapshot.events, Utc::now()) {
        Some(next) => {
            let start = next.start.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            println!("next:      {start}  {}", next.title);
        }
        None => println!("next:      none"),
    }
    println!("queued:    {} notification(s)", queue.list().len());
    println!(
        "reminders: {} and {} before start",
        content::lead_label(config.reminders.first_lead_minutes),
        content::lead_label(config.reminders.second_lead_minutes)
    );
    println!("data dir:  {}", storage::data_dir()?.display());
    Ok(())
}
