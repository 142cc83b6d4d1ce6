use crate::models::PlaybackState;
use crate::registry::ActiveSessionSlot;
use crate::traits::{SessionHandle, SessionSource};
use crate::writer::MetadataWriter;
use std::sync::Arc;
use tracing::{debug, warn};

/// Select the active session from the platform-provided list: the first
/// handle reporting `Playing`, else the first handle in the list.
///
/// The index-0 fallback is deliberate even when nothing is playing, so the
/// control relay always has a controllable target while any session exists.
pub fn select(sessions: &[Arc<dyn SessionHandle>]) -> Option<&Arc<dyn SessionHandle>> {
    sessions
        .iter()
        .find(|s| s.playback_state() == PlaybackState::Playing)
        .or_else(|| sessions.first())
}

/// Resolves the active media session and hands its metadata to the writer.
///
/// `resolve_once` never returns an error and never panics: any platform
/// failure (including a revoked permission) is logged and reduced to "no
/// snapshot produced this pass", so the callback threads driving the event
/// trigger are never taken down.
pub struct SessionResolver {
    source: Arc<dyn SessionSource>,
    slot: Arc<ActiveSessionSlot>,
    writer: Arc<MetadataWriter>,
}

impl SessionResolver {
    pub fn new(
        source: Arc<dyn SessionSource>,
        slot: Arc<ActiveSessionSlot>,
        writer: Arc<MetadataWriter>,
    ) -> Self {
        Self {
            source,
            slot,
            writer,
        }
    }

    /// Run one resolution pass: query the session list, update the
    /// registry, and emit a metadata snapshot when one is available.
    pub fn resolve_once(&self) {
        let sessions = match self.source.sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("media session query failed: {e}");
                return;
            }
        };

        let Some(handle) = select(&sessions) else {
            debug!("no active media sessions");
            self.slot.clear();
            return;
        };

        // Stored unconditionally so the relay has a target even when the
        // metadata query below fails.
        self.slot.store(handle.clone());

        match handle.metadata() {
            Ok(Some(snapshot)) => {
                debug!(
                    "resolved {}: \"{}\" by \"{}\"",
                    snapshot.package, snapshot.title, snapshot.artist
                );
                self.writer.send(&snapshot);
            }
            Ok(None) => debug!("no metadata reported by {}", handle.package()),
            Err(e) => warn!("metadata query failed for {}: {e}", handle.package()),
        }
    }
}
