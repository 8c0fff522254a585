use calnotify_core::notify::content;
use calnotify_core::{Config, NotificationSound, Notifier, PendingQueue, ReminderSlot};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List queued notifications
    Pending {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a test notification for a reminder slot, with its configured sound
    Test {
        /// Which reminder to preview
        slot: ReminderSlot,
    },
    /// List the available reminder sounds
    Sounds,
    /// Cancel every queued notification
    Clear,
}

pub async fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        NotifyAction::Pending { json } => {
            let queue = PendingQueue::open_default()?;
            let items = queue.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }
            if items.is_empty() {
                println!("no queued notifications");
                return Ok(());
            }
            for item in items {
                let trigger = item.trigger_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                println!("{trigger}  {}  [{}]", item.title, item.identifier());
            }
        }
        NotifyAction::Test { slot } => {
            let config = Config::load()?;
            let sound = config.reminders.sound(slot);
            let (title, body) = content::test_notification(&config.reminders, slot);
            show(&title, &body, sound)?;
            println!("{slot} reminder test sent ({} sound)", sound.label());
        }
        NotifyAction::Sounds => {
            for sound in NotificationSound::ALL {
                println!("{:<14} {}", sound.id(), sound.label());
            }
        }
        NotifyAction::Clear => {
            let queue = PendingQueue::open_default()?;
            let count = queue.list().len();
            queue.cancel_all().await;
            println!("cleared {count} notification(s)");
        }
    }
    Ok(())
}

/// Display a notification through the desktop session's notification daemon.
pub fn show(
    title: &str,
    body: &str,
    sound: NotificationSound,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut notification = notify_rust::Notification::new();
    notification.summary(title).body(body).appname("calnotify");
    if let Some(name) = sound.desktop_sound() {
        notification.sound_name(name);
    }
    notification.show()?;
    Ok(())
}
