//! Notification source: watches the session bus for MPRIS property
//! changes through a `dbus-monitor` child process and turns each signal
//! into a media-session notification for the event trigger.
//!
//! When `dbus-monitor` is unavailable (or exits), an interval poll keeps
//! resolution passes coming. Resolution itself shells out to the platform,
//! so every trigger invocation runs on a blocking thread.

use npbridge_core::{EventTrigger, NotificationEvent};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Collapse bursts of PropertiesChanged signals (players typically emit
/// several per track change) into one resolution pass.
const SIGNAL_DEBOUNCE: Duration = Duration::from_millis(300);

pub async fn run(trigger: Arc<EventTrigger>, poll_interval: u64) {
    fire(&trigger, None).await;

    match spawn_monitor() {
        Ok(child) => {
            info!("watching MPRIS property changes via dbus-monitor");
            follow(child, &trigger).await;
            warn!("dbus-monitor exited");
        }
        Err(e) => warn!("dbus-monitor unavailable: {e}"),
    }

    if poll_interval == 0 {
        info!("polling disabled; no further resolution passes");
        return;
    }
    info!("falling back to polling every {poll_interval}s");
    let mut tick = tokio::time::interval(Duration::from_secs(poll_interval));
    loop {
        tick.tick().await;
        fire(&trigger, Some(NotificationEvent::media_session(""))).await;
    }
}

fn spawn_monitor() -> std::io::Result<Child> {
    Command::new("dbus-monitor")
        .args([
            "--session",
            "type='signal',interface='org.freedesktop.DBus.Properties',\
             member='PropertiesChanged',path='/org/mpris/MediaPlayer2'",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
}

async fn follow(mut child: Child, trigger: &Arc<EventTrigger>) {
    let Some(stdout) = child.stdout.take() else {
        return;
    };
    let mut lines = BufReader::new(stdout).lines();
    let mut last_fired: Option<Instant> = None;

    while let Ok(Some(line)) = lines.next_line().await {
        if !is_properties_changed(&line) {
            continue;
        }
        if let Some(prev) = last_fired {
            if prev.elapsed() < SIGNAL_DEBOUNCE {
                debug!("debounced MPRIS signal");
                continue;
            }
        }
        last_fired = Some(Instant::now());
        let sender = sender_of(&line).unwrap_or_default();
        fire(trigger, Some(NotificationEvent::media_session(&sender))).await;
    }
}

/// Run one trigger invocation on a blocking thread; `None` means the
/// startup "listener connected" event.
async fn fire(trigger: &Arc<EventTrigger>, event: Option<NotificationEvent>) {
    let trigger = trigger.clone();
    let joined = tokio::task::spawn_blocking(move || match event {
        Some(event) => trigger.on_notification(&event),
        None => trigger.on_listener_connected(),
    })
    .await;
    if joined.is_err() {
        warn!("resolution task panicked");
    }
}

/// Signal header lines look like:
/// `signal time=... sender=:1.50 -> destination=... path=/org/mpris/MediaPlayer2; interface=org.freedesktop.DBus.Properties; member=PropertiesChanged`
fn is_properties_changed(line: &str) -> bool {
    line.starts_with("signal") && line.contains("member=PropertiesChanged")
}

fn sender_of(line: &str) -> Option<String> {
    line.split_whitespace()
        .find_map(|token| token.strip_prefix("sender="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNAL_LINE: &str = "signal time=1698234000.123456 sender=:1.50 -> destination=(null destination) serial=203 path=/org/mpris/MediaPlayer2; interface=org.freedesktop.DBus.Properties; member=PropertiesChanged";

    #[test]
    fn test_signal_header_detection() {
        assert!(is_properties_changed(SIGNAL_LINE));
        assert!(!is_properties_changed("   string \"Metadata\""));
        assert!(!is_properties_changed(
            "method call time=1.0 sender=:1.9 member=PropertiesChanged"
        ));
    }

    #[test]
    fn test_sender_extraction() {
        assert_eq!(sender_of(SIGNAL_LINE).as_deref(), Some(":1.50"));
        assert_eq!(sender_of("signal time=1.0"), None);
    }
}
