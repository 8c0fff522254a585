use calnotify_core::storage::{Config, JsonEventCache, PendingQueue};
use calnotify_core::sync::{self, SyncReconciler};
use calnotify_core::{CalendarSource, EventCache, GoogleCalendar};
use chrono::{Local, Utc};

pub async fn run(json: bool, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.reminders.validate()?;

    let source = GoogleCalendar::new(&config.calendar);
    let cache = JsonEventCache::open_default()?;

    if dry_run {
        return preview(&source, &cache, json).await;
    }

    let queue = PendingQueue::open_default()?;
    let reconciler =
        SyncReconciler::new(source, queue, cache).with_fetch_timeout(Some(config.fetch_timeout()));

    let report = reconciler.sync(&config.reminders).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

/// Fetch and diff without touching the notification queue or the snapshot.
async fn preview(
    source: &GoogleCalendar,
    cache: &JsonEventCache,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !source.is_authorized() {
        return Err("calendar access is not authorized; run `calnotify auth login`".into());
    }
    let fetched = source.fetch_events().await?;
    let previous = cache.load();
    let plan = sync::plan(fetched, &previous.events, Utc::now());

    if json {
        let preview = serde_json::json!({
            "future": plan.future.len(),
            "to_schedule": plan.scheduled().len(),
            "to_cancel": plan.removed_ids,
            "truncated": plan.truncated,
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!(
        "{} upcoming, {} to schedule, {} to cancel{}",
        plan.future.len(),
        plan.scheduled().len(),
        plan.removed_ids.len(),
        if plan.truncated { " (truncated)" } else { "" }
    );
    for event in plan.scheduled() {
        let start = event.start.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!("  {start}  {}", event.title);
    }
    Ok(())
}
