use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Result;

/// Run-scoped directory tree holding the raw audio, the segment files, and
/// the output artifacts. The pipeline owns the workspace lifecycle: nothing
/// survives from one run to the next.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_audio_dir(&self) -> PathBuf {
        self.root.join("raw_audio")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join("chunks")
    }

    pub fn transcripts_path(&self) -> PathBuf {
        self.root.join("transcripts.txt")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.txt")
    }

    pub fn digest_path(&self) -> PathBuf {
        self.root.join("digest.txt")
    }

    /// Destroy any prior contents and recreate the workspace empty.
    /// Destructive: there is no merge with earlier runs.
    pub async fn reset(&self) -> Result<()> {
        if fs::try_exists(&self.root).await? {
            fs::remove_dir_all(&self.root).await?;
        }
        fs::create_dir_all(self.raw_audio_dir()).await?;
        fs::create_dir_all(self.chunks_dir()).await?;
        Ok(())
    }
}
