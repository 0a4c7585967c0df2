//! Speech: text → MP3 artifact → optional local playback.
//!
//! Components:
//! - `gtts`: Google Translate TTS encoder (text → MP3 bytes)
//! - `store`: the single on-disk audio artifact served at `/audio`
//! - `playback`: fire-and-forget rodio playback of the artifact

pub mod gtts;
pub mod playback;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use crate::error::SynthesisError;
use store::AudioStore;

/// MIME type of every artifact the encoder produces.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// An opaque text-to-audio encoder producing MP3 bytes.
#[async_trait]
pub trait SpeechEncoder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// The audio file written by the most recent synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub size: usize,
}

pub struct SpeechSynthesizer {
    encoder: Arc<dyn SpeechEncoder>,
    store: Arc<AudioStore>,
}

impl SpeechSynthesizer {
    pub fn new(encoder: Arc<dyn SpeechEncoder>, store: Arc<AudioStore>) -> Self {
        Self { encoder, store }
    }

    /// Encode `text` and replace the current artifact with the result.
    pub async fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let t_start = Instant::now();
        let audio = self.encoder.encode(text).await?;
        let artifact = self.store.replace(&audio).await?;

        info!(
            "Synthesized {} chars → {} bytes at {} ({:.0}ms)",
            text.len(),
            artifact.size,
            artifact.path.display(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechEncoder for Echo {
        async fn encode(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(text.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn synthesize_writes_encoded_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AudioStore::new(dir.path().join("audio/output.mp3")));
        let encoder = Arc::new(Echo { calls: AtomicUsize::new(0) });
        let synth = SpeechSynthesizer::new(encoder, store.clone());

        let artifact = synth.synthesize("hello").await.unwrap();
        assert_eq!(artifact.size, 5);
        assert_eq!(store.fetch_latest().await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AudioStore::new(dir.path().join("output.mp3")));
        let encoder = Arc::new(Echo { calls: AtomicUsize::new(0) });
        let synth = SpeechSynthesizer::new(encoder.clone(), store.clone());

        let err = synth.synthesize("  \n").await.unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyText));
        assert_eq!(encoder.calls.load(Ordering::Relaxed), 0);
        assert!(!store.exists());
    }
}
