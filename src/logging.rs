//! Activity capture for the command-line front end.
//!
//! A tracing layer records every event emitted while a command runs into a
//! bounded in-memory log, so the front end can show what the registry did
//! (logins, registrations, saved rows) after the command finishes.

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// One captured tracing event
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl ActivityEntry {
    pub fn format(&self) -> String {
        format!(
            "{} {:>5} [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.to_string(),
            "target": self.target,
            "message": self.message
        })
        .to_string()
    }
}

/// Bounded log of the events captured during one command
pub struct ActivityLog {
    entries: parking_lot::Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: parking_lot::Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record `entry`, evicting the oldest once full
    pub fn push(&self, entry: ActivityEntry) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        if self.capacity > 0 {
            entries.push_back(entry);
        }
    }

    /// Last `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }
}

pub type SharedActivityLog = Arc<ActivityLog>;

pub fn create_activity_log(capacity: usize) -> SharedActivityLog {
    Arc::new(ActivityLog::new(capacity))
}

/// Tracing layer feeding an [`ActivityLog`]
pub struct ActivityCaptureLayer {
    log: SharedActivityLog,
}

impl ActivityCaptureLayer {
    pub fn new(log: SharedActivityLog) -> Self {
        Self { log }
    }
}

impl<S> Layer<S> for ActivityCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.log.push(ActivityEntry {
            timestamp: chrono::Utc::now(),
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Collects the `message` field plus any structured fields
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn entry(level: Level, message: &str) -> ActivityEntry {
        ActivityEntry {
            timestamp: chrono::Utc::now(),
            level,
            target: "test".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_activity_log_keeps_order() {
        let log = create_activity_log(3);
        log.push(entry(Level::INFO, "Message 1"));
        log.push(entry(Level::INFO, "Message 2"));

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "Message 1");
        assert_eq!(recent[1].message, "Message 2");
    }

    #[test]
    fn test_activity_log_overflow() {
        let log = create_activity_log(2);
        for i in 1..=5 {
            log.push(entry(Level::INFO, &format!("Message {}", i)));
        }

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "Message 4");
        assert_eq!(recent[1].message, "Message 5");
    }

    #[test]
    fn test_recent_returns_tail() {
        let log = create_activity_log(10);
        for i in 1..=4 {
            log.push(entry(Level::WARN, &format!("Message {}", i)));
        }

        let tail: Vec<_> = log.recent(2).into_iter().map(|e| e.message).collect();
        assert_eq!(tail, vec!["Message 3", "Message 4"]);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn test_capture_layer_records_fields() {
        let log = create_activity_log(10);
        let subscriber =
            tracing_subscriber::registry().with(ActivityCaptureLayer::new(log.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(member_id = "141", "Registered member");
        });

        let recent = log.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "Registered member member_id=141");
        assert!(recent[0].to_json().contains("\"level\":\"INFO\""));
    }
}
