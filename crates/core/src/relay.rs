use crate::models::PlaybackState;
use crate::registry::ActiveSessionSlot;
use crate::traits::SessionHandle;
use std::sync::Arc;
use tracing::{debug, warn};

/// Forwards external playback commands to the registered active session.
///
/// Every entry point is a no-op when the registry is empty and swallows
/// platform command failures; callers never see an error. A command may
/// race a resolution pass replacing the active session, in which case it
/// targets whichever handle was visible at the instant of the read.
pub struct ControlRelay {
    slot: Arc<ActiveSessionSlot>,
}

impl ControlRelay {
    pub fn new(slot: Arc<ActiveSessionSlot>) -> Self {
        Self { slot }
    }

    /// Toggle playback: pause when the held session reports `Playing`,
    /// otherwise play.
    pub fn play_pause(&self) {
        self.dispatch("play/pause", |handle| {
            if handle.playback_state() == PlaybackState::Playing {
                debug!("pausing {}", handle.package());
                handle.pause()
            } else {
                debug!("resuming {}", handle.package());
                handle.play()
            }
        });
    }

    pub fn next(&self) {
        self.dispatch("next", |handle| handle.next());
    }

    pub fn previous(&self) {
        self.dispatch("previous", |handle| handle.previous());
    }

    pub fn stop(&self) {
        self.dispatch("stop", |handle| handle.stop());
    }

    fn dispatch<F>(&self, action: &str, f: F)
    where
        F: FnOnce(&dyn SessionHandle) -> anyhow::Result<()>,
    {
        let Some(handle) = self.slot.load() else {
            warn!("no active session for {action}");
            return;
        };
        if let Err(e) = f(handle.as_ref()) {
            warn!("{action} failed for {}: {e}", handle.package());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackSnapshot;
    use anyhow::{anyhow, Result};
    use std::sync::Mutex;

    struct ScriptedSession {
        state: PlaybackState,
        fail_commands: bool,
        issued: Mutex<Vec<&'static str>>,
    }

    impl ScriptedSession {
        fn new(state: PlaybackState) -> Arc<Self> {
            Arc::new(Self {
                state,
                fail_commands: false,
                issued: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, command: &'static str) -> Result<()> {
            self.issued.lock().unwrap().push(command);
            if self.fail_commands {
                return Err(anyhow!("session is gone"));
            }
            Ok(())
        }

        fn issued(&self) -> Vec<&'static str> {
            self.issued.lock().unwrap().clone()
        }
    }

    impl SessionHandle for ScriptedSession {
        fn package(&self) -> &str {
            "com.example.scripted"
        }

        fn playback_state(&self) -> PlaybackState {
            self.state
        }

        fn metadata(&self) -> Result<Option<TrackSnapshot>> {
            Ok(None)
        }

        fn play(&self) -> Result<()> {
            self.record("play")
        }

        fn pause(&self) -> Result<()> {
            self.record("pause")
        }

        fn next(&self) -> Result<()> {
            self.record("next")
        }

        fn previous(&self) -> Result<()> {
            self.record("previous")
        }

        fn stop(&self) -> Result<()> {
            self.record("stop")
        }
    }

    fn relay_with(session: Arc<ScriptedSession>) -> ControlRelay {
        let slot = Arc::new(ActiveSessionSlot::new());
        slot.store(session);
        ControlRelay::new(slot)
    }

    #[test]
    fn test_play_pause_pauses_a_playing_session() {
        let session = ScriptedSession::new(PlaybackState::Playing);
        relay_with(session.clone()).play_pause();
        assert_eq!(session.issued(), vec!["pause"]);
    }

    #[test]
    fn test_play_pause_plays_anything_else() {
        for state in [
            PlaybackState::Paused,
            PlaybackState::Stopped,
            PlaybackState::Unknown,
        ] {
            let session = ScriptedSession::new(state);
            relay_with(session.clone()).play_pause();
            assert_eq!(session.issued(), vec!["play"], "state {state:?}");
        }
    }

    #[test]
    fn test_transport_commands_are_unconditional() {
        let session = ScriptedSession::new(PlaybackState::Paused);
        let relay = relay_with(session.clone());
        relay.next();
        relay.previous();
        relay.stop();
        assert_eq!(session.issued(), vec!["next", "previous", "stop"]);
    }

    #[test]
    fn test_empty_registry_is_a_silent_noop() {
        let relay = ControlRelay::new(Arc::new(ActiveSessionSlot::new()));
        relay.play_pause();
        relay.next();
        relay.previous();
        relay.stop();
    }

    #[test]
    fn test_command_failure_is_contained() {
        let session = Arc::new(ScriptedSession {
            state: PlaybackState::Playing,
            fail_commands: true,
            issued: Mutex::new(Vec::new()),
        });
        let relay = relay_with(session.clone());
        relay.stop();
        assert_eq!(session.issued(), vec!["stop"]);
    }
}
