use crate::models::{PlaybackState, TrackSnapshot};
use anyhow::Result;
use std::io;
use std::sync::Arc;

/// Borrowed, time-limited reference to one controllable platform playback
/// session.
///
/// Handles are owned by the platform and may go stale at any time; every
/// command on a stale handle fails with an error result, never a panic.
pub trait SessionHandle: Send + Sync {
    /// Package identifier of the app owning the session.
    fn package(&self) -> &str;

    /// Current playback state. Backend failures collapse to
    /// [`PlaybackState::Unknown`].
    fn playback_state(&self) -> PlaybackState;

    /// Current metadata, or `None` when the session reports none.
    fn metadata(&self) -> Result<Option<TrackSnapshot>>;

    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn next(&self) -> Result<()>;
    fn previous(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

/// Query for the platform's currently active media sessions, in the
/// platform-provided order.
pub trait SessionSource: Send + Sync {
    fn sessions(&self) -> Result<Vec<Arc<dyn SessionHandle>>>;
}

/// Externally supplied byte sink carrying the newline-delimited protocol.
///
/// The writer owns an attached channel only until the first write failure,
/// at which point it closes and forgets it.
pub trait OutputChannel: Send {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

impl OutputChannel for std::net::TcpStream {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        io::Write::write_all(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(self)
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}
