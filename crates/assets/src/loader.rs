use crate::gltf_import::{ImportedPrimitive, read_gltf};
use crate::store::AssetError;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Result of one background model import.
#[derive(Debug)]
pub struct LoadOutcome {
    pub path: PathBuf,
    pub result: Result<Vec<ImportedPrimitive>, AssetError>,
}

/// Decodes models on worker threads and hands results back to the owning
/// thread through a channel. The store and scene are never touched off-thread.
pub struct AssetLoader {
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
    pending: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    /// Start importing a glTF/GLB file in the background.
    pub fn request_model(&mut self, path: impl Into<PathBuf>) -> Result<(), AssetError> {
        let path = path.into();
        let tx = self.tx.clone();
        let job_path = path.clone();
        std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let result = read_gltf(&job_path);
                // The receiver may be gone if the app shut down mid-load.
                let _ = tx.send(LoadOutcome {
                    path: job_path,
                    result,
                });
            })?;
        self.pending += 1;
        tracing::info!("queued model import {}", path.display());
        Ok(())
    }

    /// Number of requests that have not been returned by `poll`/`wait` yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Collect every finished import without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut done = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            done.push(outcome);
        }
        self.pending -= done.len();
        done
    }

    /// Block until the next import finishes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadOutcome> {
        if self.pending == 0 {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.pending -= 1;
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_with_nothing_queued() {
        let mut loader = AssetLoader::new();
        assert!(loader.poll().is_empty());
        assert_eq!(loader.pending(), 0);
        assert!(loader.wait(Duration::from_millis(1)).is_none());
    }

    #[test]
    fn failed_import_is_delivered() {
        let mut loader = AssetLoader::new();
        loader.request_model("/no/such/sign.glb").unwrap();
        assert_eq!(loader.pending(), 1);

        let outcome = loader.wait(Duration::from_secs(10)).expect("outcome");
        assert!(outcome.result.is_err());
        assert!(outcome.path.ends_with("sign.glb"));
        assert_eq!(loader.pending(), 0);
    }
}
