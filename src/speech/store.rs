//! The single audio artifact on disk.
//!
//! One fixed path, overwritten by every synthesis. Writes go to a sibling
//! temp file and are renamed into place under a lock, so readers see either
//! the previous file or the new one. Concurrent writers still race: the last
//! one to finish wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use super::AudioArtifact;
use crate::error::SynthesisError;

pub struct AudioStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AudioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the artifact with `audio`.
    pub async fn replace(&self, audio: &[u8]) -> Result<AudioArtifact, SynthesisError> {
        let _guard = self.write_lock.lock().await;
        let write_err = |source: std::io::Error| SynthesisError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp = self.path.with_extension("part");
        tokio::fs::write(&tmp, audio).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        debug!("Wrote {} bytes to {}", audio.len(), self.path.display());

        Ok(AudioArtifact {
            path: self.path.clone(),
            size: audio.len(),
        })
    }

    /// Read the current artifact. `Ok(None)` while no synthesis has happened.
    pub async fn fetch_latest(&self) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
