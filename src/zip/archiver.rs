use log::{info, warn};
use std::io::Write;

use crate::io::{EntrySource, LocalFileSource, archive_name};
use anyhow::Result;

use super::writer::{ArchiveEntry, ArchiveSummary, ArchiveWriter, WrittenEntry};

/// Options controlling how inputs are named inside the archive
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    /// Store only the base name of each input
    pub junk_paths: bool,
}

/// An input that was left out of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub name: String,
    pub reason: String,
}

/// Outcome of [`Archiver::pack`]
#[derive(Debug)]
pub struct PackReport<W> {
    pub sink: W,
    pub summary: ArchiveSummary,
    pub skipped: Vec<SkippedInput>,
}

/// Packs named inputs into a STORED ZIP archive
pub struct Archiver<S: EntrySource = LocalFileSource> {
    source: S,
    options: ArchiveOptions,
}

impl Archiver {
    /// Archiver reading inputs from the local filesystem
    pub fn new(options: ArchiveOptions) -> Self {
        Self::with_source(LocalFileSource::new(), options)
    }
}

impl<S: EntrySource> Archiver<S> {
    pub fn with_source(source: S, options: ArchiveOptions) -> Self {
        Self { source, options }
    }

    /// Fetch each input in order and write it to `sink`.
    ///
    /// Inputs that cannot be fetched, or that the archive format cannot
    /// hold, are skipped with a warning and reported in
    /// [`PackReport::skipped`]. Any failure of the sink aborts the whole
    /// operation.
    pub async fn pack<W: Write>(&self, inputs: &[String], sink: W) -> Result<PackReport<W>> {
        self.pack_with(inputs, sink, |_| {}).await
    }

    /// Like [`pack`](Self::pack), calling `on_entry` after each entry is written
    pub async fn pack_with<W, F>(
        &self,
        inputs: &[String],
        sink: W,
        mut on_entry: F,
    ) -> Result<PackReport<W>>
    where
        W: Write,
        F: FnMut(&WrittenEntry),
    {
        let mut writer = ArchiveWriter::new(sink);
        let mut skipped = Vec::new();

        for input in inputs {
            let content = match self.source.fetch(input).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("{:#}", e);
                    skipped.push(SkippedInput {
                        name: input.clone(),
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            };

            let entry = ArchiveEntry::new(archive_name(input, self.options.junk_paths), content);
            match writer.add_entry(&entry) {
                Ok(written) => on_entry(written),
                Err(e) if e.is_entry_local() => {
                    warn!("{}: {}", input, e);
                    skipped.push(SkippedInput {
                        name: input.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        let (sink, summary) = writer.finish()?;
        info!(
            "wrote {} entries ({} bytes), skipped {}",
            summary.entries.len(),
            summary.total_size,
            skipped.len()
        );

        Ok(PackReport {
            sink,
            summary,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::ArchiveReader;
    use std::path::PathBuf;

    async fn fixture_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stowzip-{}-{}", tag, std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn skips_missing_inputs() {
        let dir = fixture_dir("archiver-skip").await;
        tokio::fs::write(dir.join("ok1"), b"first").await.unwrap();
        tokio::fs::write(dir.join("ok2"), b"second").await.unwrap();

        let archiver = Archiver::with_source(
            LocalFileSource::with_base_dir(&dir),
            ArchiveOptions::default(),
        );
        let inputs = vec!["ok1".to_string(), "missing".to_string(), "ok2".to_string()];

        let mut seen = Vec::new();
        let report = archiver
            .pack_with(&inputs, Vec::<u8>::new(), |e| seen.push(e.display_name()))
            .await
            .unwrap();

        assert_eq!(seen, ["ok1", "ok2"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "missing");

        let reader = ArchiveReader::new(&report.sink);
        let entries = reader.verify().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["ok1", "ok2"]);
        // ok1 occupies 30 + 3 + 5 bytes
        assert_eq!(entries[1].lfh_offset, 38);
        assert_eq!(reader.read_entry(&entries[1]).unwrap(), b"second");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn junk_paths_strips_directories() {
        let dir = fixture_dir("archiver-junk").await;
        tokio::fs::create_dir_all(dir.join("nested")).await.unwrap();
        tokio::fs::write(dir.join("nested/file.txt"), b"x").await.unwrap();

        let archiver = Archiver::with_source(
            LocalFileSource::with_base_dir(&dir),
            ArchiveOptions { junk_paths: true },
        );
        let report = archiver
            .pack(&["nested/file.txt".to_string()], Vec::<u8>::new())
            .await
            .unwrap();

        assert_eq!(report.summary.entries[0].display_name(), "file.txt");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn no_inputs_gives_empty_archive() {
        let archiver = Archiver::new(ArchiveOptions::default());
        let report = archiver.pack(&[], Vec::<u8>::new()).await.unwrap();

        assert_eq!(report.sink.len(), 22);
        assert_eq!(report.summary.central_directory_size, 0);
        assert!(report.skipped.is_empty());
    }
}
