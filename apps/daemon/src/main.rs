mod server;
mod watcher;

use anyhow::Result;
use clap::Parser;
use npbridge_core::{ActiveSessionSlot, ControlRelay, EventTrigger, MetadataWriter, SessionResolver};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bridge the platform's now-playing metadata to a local consumer over a
/// newline-delimited JSON stream, and relay the consumer's playback
/// commands back to the active media session.
#[derive(Parser, Debug)]
#[command(name = "npbridged", version, about)]
struct Args {
    /// Port the consumer connects to
    #[arg(long, default_value_t = 28200)]
    port: u16,

    /// Address to bind the consumer endpoint on
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Seconds between fallback resolution polls when no notification
    /// watcher is available (0 disables polling)
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,npbridge_core=debug,npbridge_media_session=debug,npbridged=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("Starting npbridged");

    let slot = Arc::new(ActiveSessionSlot::new());
    let writer = Arc::new(MetadataWriter::new());
    let source = npbridge_media_session::create_session_source();
    let resolver = SessionResolver::new(source, slot.clone(), writer.clone());
    let trigger = Arc::new(EventTrigger::new(resolver));
    let relay = Arc::new(ControlRelay::new(slot));

    tokio::spawn(watcher::run(trigger, args.poll_interval));

    server::run(&args.bind, args.port, writer, relay).await
}
