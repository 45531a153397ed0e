//! Filesystem infrastructure: implements `DescriptorWriter`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::DescriptorWriter;

/// Production filesystem implementation of `DescriptorWriter`.
pub struct LocalFs;

impl DescriptorWriter for LocalFs {
    async fn write_descriptor(&self, path: &Path, contents: &str) -> Result<()> {
        let path: PathBuf = path.to_path_buf();
        let contents = contents.to_owned();
        tokio::task::spawn_blocking(move || {
            std::fs::write(&path, contents)
                .with_context(|| format!("writing host descriptor {}", path.display()))
        })
        .await
        .context("spawn_blocking for write_descriptor")?
    }
}
