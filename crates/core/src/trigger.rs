use crate::models::NotificationEvent;
use crate::resolver::SessionResolver;
use tracing::debug;

/// Entry points the platform dispatcher drives.
///
/// Both are fire-and-forget: they run a resolution pass synchronously on
/// the calling thread and report nothing back.
pub struct EventTrigger {
    resolver: SessionResolver,
}

impl EventTrigger {
    pub fn new(resolver: SessionResolver) -> Self {
        Self { resolver }
    }

    /// The session listener came up; resolve once unconditionally.
    pub fn on_listener_connected(&self) {
        debug!("session listener connected");
        self.resolver.resolve_once();
    }

    /// A platform notification was observed. Only notifications backed by
    /// a media session reach the resolver.
    pub fn on_notification(&self, event: &NotificationEvent) {
        if !event.media_session {
            debug!("ignoring non-media notification from {:?}", event.package);
            return;
        }
        self.resolver.resolve_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActiveSessionSlot;
    use crate::traits::{SessionHandle, SessionSource};
    use crate::writer::MetadataWriter;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSource {
        queries: AtomicUsize,
    }

    impl SessionSource for CountingSource {
        fn sessions(&self) -> Result<Vec<Arc<dyn SessionHandle>>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn trigger_with_counter() -> (EventTrigger, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::default());
        let resolver = SessionResolver::new(
            source.clone(),
            Arc::new(ActiveSessionSlot::new()),
            Arc::new(MetadataWriter::new()),
        );
        (EventTrigger::new(resolver), source)
    }

    #[test]
    fn test_listener_connected_always_resolves() {
        let (trigger, source) = trigger_with_counter();
        trigger.on_listener_connected();
        assert_eq!(source.queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_media_notification_resolves() {
        let (trigger, source) = trigger_with_counter();
        trigger.on_notification(&NotificationEvent::media_session("com.example.player"));
        assert_eq!(source.queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_notifications_are_filtered() {
        let (trigger, source) = trigger_with_counter();
        trigger.on_notification(&NotificationEvent::other("com.example.mail"));
        assert_eq!(source.queries.load(Ordering::SeqCst), 0);
    }
}
