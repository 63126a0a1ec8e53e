mod local;

pub use local::LocalFileSource;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for fetching the full content of a named input
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Read all bytes behind `name`
    async fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Derive the name an input is stored under inside the archive.
///
/// Paths use `/` as separator and lose any leading `/` or `./`, so every
/// stored name is archive-relative. With `junk_paths` only the final
/// component is kept.
pub fn archive_name(input: &str, junk_paths: bool) -> String {
    let mut name = input.replace('\\', "/");
    loop {
        if let Some(rest) = name.strip_prefix("./") {
            name = rest.to_string();
        } else if let Some(rest) = name.strip_prefix('/') {
            name = rest.to_string();
        } else {
            break;
        }
    }

    if junk_paths && let Some(base) = name.rsplit('/').find(|s| !s.is_empty()) {
        return base.to_string();
    }

    name
}
