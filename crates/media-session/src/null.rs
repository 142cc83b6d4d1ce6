use anyhow::Result;
use npbridge_core::{SessionHandle, SessionSource};
use std::sync::Arc;

/// Backend for platforms without a session query: always reports an empty
/// session list, which the resolver turns into an empty registry.
pub struct NullSource;

impl SessionSource for NullSource {
    fn sessions(&self) -> Result<Vec<Arc<dyn SessionHandle>>> {
        Ok(Vec::new())
    }
}
