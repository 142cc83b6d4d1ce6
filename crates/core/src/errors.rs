use thiserror::Error;

/// Closed set of failure kinds in the bridge core.
///
/// Nothing in this crate lets one of these escape past its own boundary:
/// every fallible operation reduces a failure to a logged event plus either
/// "no snapshot produced" or "no command issued".
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The platform refused the media session list query (e.g. the
    /// notification-access grant was revoked).
    #[error("media session access denied: {0}")]
    PermissionDenied(String),

    /// Writing or flushing the output channel failed. The writer drops the
    /// channel on this; it is never retried.
    #[error("output channel write failed: {0}")]
    ChannelWrite(#[from] std::io::Error),

    /// The platform rejected or errored on a transport command.
    #[error("transport command failed: {0}")]
    CommandDispatch(String),
}
