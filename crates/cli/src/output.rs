//! Writing generated images to disk.

use std::path::{Path, PathBuf};

use chatdeck_core::error::Result;
use chatdeck_core::image::ImagePayload;
use chatdeck_core::message::SessionId;
use tracing::debug;

/// Writes `<dir>/<session-id>-<n>.png`, `n` counting from 1.
pub struct ImageWriter {
    dir: PathBuf,
    prefix: String,
    count: usize,
}

impl ImageWriter {
    pub fn new(dir: impl Into<PathBuf>, session: &SessionId) -> Self {
        Self {
            dir: dir.into(),
            prefix: session.0.clone(),
            count: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&mut self, image: &ImagePayload) -> Result<PathBuf> {
        let bytes = image.decode()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        self.count += 1;
        let path = self.dir.join(format!("{}-{}.png", self.prefix, self.count));
        tokio::fs::write(&path, &bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved image");
        Ok(path)
    }
}
