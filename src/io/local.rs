use super::EntrySource;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads inputs from the local filesystem
#[derive(Debug, Default, Clone)]
pub struct LocalFileSource {
    base_dir: Option<PathBuf>,
}

impl LocalFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative names against `base_dir` instead of the working directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

#[async_trait]
impl EntrySource for LocalFileSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name);
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("{}", path.display()))?;
        if metadata.is_dir() {
            bail!("{}: is a directory", path.display());
        }

        tokio::fs::read(&path)
            .await
            .with_context(|| format!("{}", path.display()))
    }
}
