use crate::errors::BridgeError;
use crate::models::TrackSnapshot;
use crate::traits::OutputChannel;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Owns the one shared output channel and serializes snapshots onto it.
///
/// `attach`, `detach` and `send` all run under the same lock, so an attach
/// racing an in-flight send is serialized rather than interleaved at the
/// byte level, and concurrent sends each emit one complete line.
#[derive(Default)]
pub struct MetadataWriter {
    channel: Mutex<Option<Box<dyn OutputChannel>>>,
}

impl MetadataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an output channel, replacing any previously attached one.
    pub fn attach(&self, channel: Box<dyn OutputChannel>) {
        let mut guard = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.replace(channel).is_some() {
            debug!("replaced previously attached output channel");
        } else {
            debug!("output channel attached");
        }
    }

    /// Clear the channel reference without closing it; ownership returns to
    /// the lifecycle collaborator that supplied it.
    pub fn detach(&self) {
        let mut guard = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("output channel detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Write one snapshot as a single JSON line (write + flush as one unit
    /// under the lock).
    ///
    /// With no channel attached this is a logged no-op. A write or flush
    /// failure is fatal for the channel: it is closed best-effort and
    /// forgotten, and the next `send` no-ops until `attach` is called
    /// again. Nothing propagates to the caller.
    pub fn send(&self, snapshot: &TrackSnapshot) {
        let mut guard = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(channel) = guard.as_mut() else {
            debug!("send with no output channel attached, dropping snapshot");
            return;
        };

        let line = match snapshot.encode() {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to encode snapshot for {}: {}", snapshot.package, e);
                return;
            }
        };
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');

        let result = channel
            .write_all(&bytes)
            .and_then(|()| channel.flush());
        match result {
            Ok(()) => debug!("wrote metadata line for {}", snapshot.package),
            Err(e) => {
                warn!("{}, dropping channel", BridgeError::ChannelWrite(e));
                if let Some(mut broken) = guard.take() {
                    let _ = broken.close();
                }
            }
        }
    }
}
