//! Consumer endpoint: one TCP port carrying metadata out (newline-delimited
//! JSON) and playback commands in (one command word per line).
//!
//! A new connection replaces any previously attached output channel; the
//! old channel's consumer is simply cut off. Commands are read from the
//! same connection on a dedicated blocking task.

use anyhow::Result;
use npbridge_core::{ControlRelay, MetadataWriter};
use std::io::BufRead;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Playback command words accepted on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayCommand {
    PlayPause,
    Next,
    Previous,
    Stop,
}

impl RelayCommand {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "play-pause" | "playpause" => Some(Self::PlayPause),
            "next" => Some(Self::Next),
            "previous" | "prev" => Some(Self::Previous),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

pub async fn run(
    bind: &str,
    port: u16,
    writer: Arc<MetadataWriter>,
    relay: Arc<ControlRelay>,
) -> Result<()> {
    let listener = TcpListener::bind((bind, port)).await?;
    info!("consumer endpoint listening on {bind}:{port}");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("consumer connected from {peer}");

        // The core writer is synchronous; hand it a blocking socket and
        // keep a clone of the same connection for the command reader.
        let stream = stream.into_std()?;
        stream.set_nonblocking(false)?;
        let command_stream = stream.try_clone()?;
        writer.attach(Box::new(stream));

        let relay = relay.clone();
        tokio::task::spawn_blocking(move || command_loop(command_stream, relay));
    }
}

/// Read command lines until the peer goes away. EOF does not detach the
/// output channel; a dead peer surfaces as a write failure in the writer,
/// which then drops the channel itself.
fn command_loop(stream: std::net::TcpStream, relay: Arc<ControlRelay>) {
    let reader = std::io::BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("command reader closed: {e}");
                return;
            }
        };
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        match RelayCommand::parse(word) {
            Some(RelayCommand::PlayPause) => relay.play_pause(),
            Some(RelayCommand::Next) => relay.next(),
            Some(RelayCommand::Previous) => relay.previous(),
            Some(RelayCommand::Stop) => relay.stop(),
            None => warn!("ignoring unknown command {word:?}"),
        }
    }
    debug!("command stream ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_words() {
        assert_eq!(RelayCommand::parse("play-pause"), Some(RelayCommand::PlayPause));
        assert_eq!(RelayCommand::parse("playpause"), Some(RelayCommand::PlayPause));
        assert_eq!(RelayCommand::parse("next"), Some(RelayCommand::Next));
        assert_eq!(RelayCommand::parse("previous"), Some(RelayCommand::Previous));
        assert_eq!(RelayCommand::parse("prev"), Some(RelayCommand::Previous));
        assert_eq!(RelayCommand::parse("stop"), Some(RelayCommand::Stop));
    }

    #[test]
    fn test_parse_rejects_unknown_words() {
        assert_eq!(RelayCommand::parse("seek"), None);
        assert_eq!(RelayCommand::parse(""), None);
        assert_eq!(RelayCommand::parse("PLAY-PAUSE"), None);
    }
}
