//! Linux media sessions via MPRIS (Media Player Remote Interfacing
//! Specification).
//!
//! Sessions are discovered by listing `org.mpris.MediaPlayer2.*` bus names
//! and queried/commanded per name with `dbus-send`. The reply format of
//! `dbus-send --print-reply` is loosely structured text, so the parsers
//! here are deliberately tolerant: anything they cannot make sense of is
//! simply absent.

use anyhow::{Context, Result};
use npbridge_core::{BridgeError, PlaybackState, SessionHandle, SessionSource, TrackSnapshot};
use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const PLAYER_PATH: &str = "/org/mpris/MediaPlayer2";
const PLAYER_IFACE: &str = "org.mpris.MediaPlayer2.Player";

/// `SessionSource` over the session D-Bus.
pub struct MprisSource;

impl MprisSource {
    pub fn new() -> Self {
        Self
    }

    fn list_bus_names(&self) -> Result<Vec<String>> {
        let output = Command::new("dbus-send")
            .args([
                "--session",
                "--print-reply",
                "--dest=org.freedesktop.DBus",
                "/org/freedesktop/DBus",
                "org.freedesktop.DBus.ListNames",
            ])
            .output()
            .context("failed to invoke dbus-send")?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("AccessDenied") {
            return Err(BridgeError::PermissionDenied(stderr.trim().to_string()).into());
        }

        Ok(parse_player_names(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for MprisSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSource for MprisSource {
    fn sessions(&self) -> Result<Vec<Arc<dyn SessionHandle>>> {
        let names = self.list_bus_names()?;
        debug!("found {} MPRIS player(s)", names.len());
        Ok(names
            .into_iter()
            .map(|bus_name| Arc::new(MprisHandle::new(bus_name)) as Arc<dyn SessionHandle>)
            .collect())
    }
}

/// One MPRIS player, addressed by its bus name. The name is a borrowed
/// reference into the bus: the player may vanish between discovery and
/// use, in which case queries and commands error and the core logs and
/// moves on.
pub struct MprisHandle {
    bus_name: String,
    package: String,
}

impl MprisHandle {
    fn new(bus_name: String) -> Self {
        let package = bus_name
            .strip_prefix(MPRIS_PREFIX)
            .unwrap_or(&bus_name)
            .to_string();
        Self { bus_name, package }
    }

    fn get_property(&self, property: &str) -> Result<String> {
        let output = Command::new("dbus-send")
            .args([
                "--session",
                "--print-reply",
                &format!("--dest={}", self.bus_name),
                PLAYER_PATH,
                "org.freedesktop.DBus.Properties.Get",
                &format!("string:{PLAYER_IFACE}"),
                &format!("string:{property}"),
            ])
            .output()
            .context("failed to invoke dbus-send")?;

        parse_variant_string(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("no {property} reply from {}", self.bus_name))
    }

    fn get_metadata_map(&self) -> Result<HashMap<String, String>> {
        let output = Command::new("dbus-send")
            .args([
                "--session",
                "--print-reply",
                &format!("--dest={}", self.bus_name),
                PLAYER_PATH,
                "org.freedesktop.DBus.Properties.Get",
                &format!("string:{PLAYER_IFACE}"),
                "string:Metadata",
            ])
            .output()
            .context("failed to invoke dbus-send")?;

        Ok(parse_metadata_reply(&String::from_utf8_lossy(&output.stdout)))
    }

    fn call_player_method(&self, method: &str) -> Result<()> {
        let output = Command::new("dbus-send")
            .args([
                "--session",
                "--print-reply",
                &format!("--dest={}", self.bus_name),
                PLAYER_PATH,
                &format!("{PLAYER_IFACE}.{method}"),
            ])
            .output()
            .map_err(|e| {
                BridgeError::CommandDispatch(format!("failed to invoke dbus-send: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::CommandDispatch(format!(
                "{method} on {}: {}",
                self.bus_name,
                stderr.trim()
            ))
            .into());
        }
        debug!("issued {method} to {}", self.bus_name);
        Ok(())
    }
}

impl SessionHandle for MprisHandle {
    fn package(&self) -> &str {
        &self.package
    }

    fn playback_state(&self) -> PlaybackState {
        match self.get_property("PlaybackStatus") {
            Ok(status) => match status.as_str() {
                "Playing" => PlaybackState::Playing,
                "Paused" => PlaybackState::Paused,
                "Stopped" => PlaybackState::Stopped,
                other => {
                    debug!("unrecognized PlaybackStatus {other:?} from {}", self.bus_name);
                    PlaybackState::Unknown
                }
            },
            Err(e) => {
                debug!("PlaybackStatus query failed for {}: {e}", self.bus_name);
                PlaybackState::Unknown
            }
        }
    }

    fn metadata(&self) -> Result<Option<TrackSnapshot>> {
        let map = self.get_metadata_map()?;
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(TrackSnapshot::from_parts(
            &self.package,
            map.get("xesam:title").cloned(),
            map.get("xesam:artist")
                .or_else(|| map.get("xesam:albumArtist"))
                .cloned(),
            map.get("xesam:album").cloned(),
        )))
    }

    fn play(&self) -> Result<()> {
        self.call_player_method("Play")
    }

    fn pause(&self) -> Result<()> {
        self.call_player_method("Pause")
    }

    fn next(&self) -> Result<()> {
        self.call_player_method("Next")
    }

    fn previous(&self) -> Result<()> {
        self.call_player_method("Previous")
    }

    fn stop(&self) -> Result<()> {
        self.call_player_method("Stop")
    }
}

/// Extract MPRIS bus names from a `ListNames` reply, preserving reply
/// order.
fn parse_player_names(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter_map(|line| {
            let name = line
                .trim()
                .strip_prefix("string \"")?
                .strip_suffix('"')?;
            name.starts_with(MPRIS_PREFIX).then(|| name.to_string())
        })
        .collect()
}

/// Extract the string payload of a `variant string` property reply.
/// The value appears on the variant line itself or on the following line.
fn parse_variant_string(reply: &str) -> Option<String> {
    let lines: Vec<&str> = reply.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if !line.starts_with("variant") {
            continue;
        }
        if let Some(value) = quoted_value(line) {
            return Some(value);
        }
        if let Some(next) = lines.get(i + 1) {
            if let Some(value) = quoted_value(next.trim()) {
                return Some(value);
            }
        }
    }
    None
}

/// Parse a `Metadata` property reply into a flat key/value map.
///
/// Each entry looks like
/// ```text
/// dict entry(
///    string "xesam:title"
///    variant       string "Time"
/// )
/// ```
/// with array-valued keys (e.g. `xesam:artist`) nesting one level deeper;
/// only the first element of an array is kept.
fn parse_metadata_reply(reply: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    let lines: Vec<&str> = reply.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim().starts_with("dict entry(") {
            let key = lines
                .get(i + 1)
                .and_then(|line| quoted_value(line.trim()));
            if let Some(key) = key {
                if let Some((value, consumed)) = parse_entry_value(&lines[i + 2..]) {
                    metadata.insert(key, value);
                    i += 2 + consumed;
                    continue;
                }
            }
        }
        i += 1;
    }

    metadata
}

/// Scan the lines of one dict entry's value for the first quoted string,
/// stopping at the next entry. Returns the value and the number of lines
/// consumed.
fn parse_entry_value(lines: &[&str]) -> Option<(String, usize)> {
    for (offset, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.starts_with("dict entry(") {
            return None;
        }
        if line.contains("string") {
            if let Some(value) = quoted_value(line) {
                return Some((value, offset + 1));
            }
        }
    }
    None
}

fn quoted_value(line: &str) -> Option<String> {
    line.split('"').nth(1).map(str::to_string)
}
