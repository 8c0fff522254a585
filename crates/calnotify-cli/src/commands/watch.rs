use std::time::{Duration, Instant};

use calnotify_core::storage::{Config, JsonEventCache, PendingQueue};
use calnotify_core::sync::SyncReconciler;
use calnotify_core::GoogleCalendar;
use chrono::Utc;

use super::notify;

/// Foreground agent loop: re-sync on an interval, deliver due reminders
/// on every tick.
pub async fn run(once: bool, interval_mins: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.reminders.validate()?;

    let interval = interval_mins
        .map(|mins| Duration::from_secs(mins * 60))
        .unwrap_or_else(|| config.sync_interval());
    let tick = config.tick();

    let source = GoogleCalendar::new(&config.calendar);
    let reconciler = SyncReconciler::new(
        source,
        PendingQueue::open_default()?,
        JsonEventCache::open_default()?,
    )
    .with_fetch_timeout(Some(config.fetch_timeout()));

    // Second handle on the queue file, used to drain due notifications.
    let queue = PendingQueue::open_default()?;

    if once {
        let report = reconciler.sync(&config.reminders).await?;
        let delivered = deliver_due(&queue)?;
        println!("{} ({delivered} delivered)", report.summary());
        return Ok(());
    }

    tracing::info!(
        "Watching: sync every {}m, delivery check every {}s",
        interval.as_secs() / 60,
        tick.as_secs()
    );

    let mut next_sync = Instant::now();
    loop {
        if Instant::now() >= next_sync {
            // Re-read the policy so lead-time and sound edits take effect
            // without restarting the agent.
            let policy = Config::load_or_default().reminders;
            if let Err(e) = reconciler.sync(&policy).await {
                tracing::error!("Sync failed: {}", e);
            }
            next_sync = Instant::now() + interval;
        }

        match deliver_due(&queue) {
            Ok(0) => {}
            Ok(n) => tracing::info!("Delivered {} notification(s)", n),
            Err(e) => tracing::error!("Failed to drain the pending queue: {}", e),
        }

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping");
                break;
            }
        }
    }
    Ok(())
}

fn deliver_due(queue: &PendingQueue) -> Result<usize, Box<dyn std::error::Error>> {
    let due = queue.take_due(Utc::now())?;
    let count = due.len();
    for item in due {
        if let Err(e) = notify::show(&item.title, &item.body, item.sound) {
            tracing::warn!("Failed to display notification for {}: {}", item.event_id, e);
        }
    }
    Ok(count)
}
