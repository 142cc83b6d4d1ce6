//! Core of the now-playing bridge: resolves the active platform media
//! session, relays its metadata as newline-delimited JSON over a single
//! attached output channel, and forwards transport commands back to the
//! resolved session.
//!
//! Everything here is synchronous and platform-free; the platform session
//! backend and the channel lifecycle owner plug in through the traits in
//! [`traits`].

pub mod errors;
pub mod models;
pub mod registry;
pub mod relay;
pub mod resolver;
pub mod traits;
pub mod trigger;
pub mod writer;

pub use errors::*;
pub use models::*;
pub use registry::*;
pub use relay::*;
pub use resolver::*;
pub use traits::*;
pub use trigger::*;
pub use writer::*;
