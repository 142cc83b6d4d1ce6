//! Platform media session backends.
//!
//! - Linux: MPRIS over D-Bus (shelling out to `dbus-send`)
//! - other targets: a backend that reports no sessions, so the bridge
//!   degrades to silent no-ops instead of failing to build
//!
//! All backends implement the [`npbridge_core::SessionSource`] and
//! [`npbridge_core::SessionHandle`] seams; the core never sees a platform
//! type.

use npbridge_core::SessionSource;
use std::sync::Arc;

#[cfg(target_os = "linux")]
mod linux;
mod null;

#[cfg(target_os = "linux")]
pub use linux::MprisSource;
pub use null::NullSource;

/// Create the session source for the current platform.
pub fn create_session_source() -> Arc<dyn SessionSource> {
    #[cfg(target_os = "linux")]
    return Arc::new(linux::MprisSource::new());

    #[cfg(not(target_os = "linux"))]
    Arc::new(null::NullSource)
}
