//! Local playback of the synthesized reply.
//!
//! Playback is fire-and-forget: the caller gets control back immediately and
//! failures are only logged. Starting a new playback stops the previous one.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStreamBuilder, Sink};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub trait Playback: Send + Sync {
    /// Start playing the file at `path` without waiting for it to finish.
    fn play(&self, path: &Path);
}

/// Used when playback is disabled or no audio device is expected.
pub struct NoPlayback;

impl Playback for NoPlayback {
    fn play(&self, path: &Path) {
        debug!("Playback disabled, not playing {}", path.display());
    }
}

/// Marks one playback. It stays current until a newer one is issued.
struct PlaybackTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl PlaybackTicket {
    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Plays through the default output device with rodio.
#[derive(Default)]
pub struct RodioPlayback {
    generation: Arc<AtomicU64>,
}

impl RodioPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_ticket(&self) -> PlaybackTicket {
        PlaybackTicket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            current: self.generation.clone(),
        }
    }

    fn start(&self, path: &Path) -> JoinHandle<()> {
        let ticket = self.issue_ticket();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = play_blocking(&path, &ticket) {
                warn!("Playback of {} failed: {e}", path.display());
            }
        })
    }
}

impl Playback for RodioPlayback {
    fn play(&self, path: &Path) {
        drop(self.start(path));
    }
}

fn play_blocking(path: &Path, ticket: &PlaybackTicket) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read audio: {e}"))?;
    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| format!("Failed to decode audio: {e}"))?;

    if !ticket.is_current() {
        debug!("Playback superseded before it started");
        return Ok(());
    }

    let stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| format!("Failed to open audio output: {e}"))?;
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    info!("Playing {}", path.display());

    // Poll for completion or a newer playback
    loop {
        if sink.empty() {
            debug!("Playback finished");
            return Ok(());
        }
        if !ticket.is_current() {
            sink.stop();
            debug!("Playback superseded by a newer reply");
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let player = RodioPlayback::new();
        let first = player.issue_ticket();
        assert!(first.is_current());

        let second = player.issue_ticket();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[tokio::test]
    async fn missing_file_is_logged_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let player = RodioPlayback::new();

        player.play(&dir.path().join("missing.mp3"));
        player.start(&dir.path().join("missing.mp3")).await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_file_fails_before_touching_the_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.mp3");
        std::fs::write(&path, b"not audio at all").unwrap();

        let player = RodioPlayback::new();
        tokio::time::timeout(Duration::from_secs(5), player.start(&path))
            .await
            .expect("playback of a bad file should finish at once")
            .unwrap();
    }

    #[tokio::test]
    async fn each_play_starts_a_new_generation() {
        let dir = tempfile::tempdir().unwrap();
        let player = RodioPlayback::new();
        let earlier = player.issue_ticket();

        player.play(&dir.path().join("missing.mp3"));
        assert!(!earlier.is_current());
        assert_eq!(player.generation.load(Ordering::SeqCst), 2);
    }
}
