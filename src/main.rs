//! Main entry point for the stowzip CLI application.
//!
//! This binary packs local files into a STORED ZIP archive,
//! optionally testing and listing the result afterwards.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::warn;
use std::io::BufWriter;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use stowzip::cli::parse_file_list;
use stowzip::zip::{ArchiveOptions, ArchiveReader, Archiver};
use stowzip::Cli;

/// Application entry point.
///
/// Parses command-line arguments, collects the inputs (from the command line
/// or an interactive prompt) and writes the archive.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    let files = if cli.files.is_empty() {
        prompt_for_files().await?
    } else {
        cli.files.clone()
    };

    let output = Path::new(&cli.output);
    create_archive(&files, output, &cli).await?;

    if cli.test {
        test_archive(output, &cli).await?;
    }

    if cli.verbose {
        list_archive(output).await?;
    }

    Ok(())
}

/// Ask for the inputs on the terminal.
///
/// # Returns
///
/// The whitespace-separated names typed on one line, in order.
async fn prompt_for_files() -> Result<Vec<String>> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Files to zip (separated by space): ")
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    Ok(parse_file_list(&line))
}

/// Drop inputs that name the archive being written.
///
/// The output file is truncated before inputs are read, so packing it into
/// itself would only store a partial copy. Must run once `output` exists, so
/// that spellings like `./out.zip` or `dir/../out.zip` resolve to the same
/// file.
fn exclude_output(files: &[String], output: &Path) -> Vec<String> {
    let target = std::fs::canonicalize(output).ok();

    files
        .iter()
        .filter(|f| {
            let path = Path::new(f.as_str());
            let same = path == output
                || (target.is_some() && std::fs::canonicalize(path).ok() == target);
            if same {
                warn!("{}: skipping the output archive itself", f);
            }
            !same
        })
        .cloned()
        .collect()
}

/// Write the archive to `output`.
///
/// Each entry is announced as it is added, unless quiet. If writing the
/// archive fails the partial file is removed, since it is not a valid archive.
///
/// # Arguments
///
/// * `files` - Input names, in archive order
/// * `output` - Destination path
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the output cannot be written.
async fn create_archive(files: &[String], output: &Path, cli: &Cli) -> Result<()> {
    let archiver = Archiver::new(ArchiveOptions {
        junk_paths: cli.junk_paths,
    });

    let file = std::fs::File::create(output)
        .with_context(|| format!("Error creating ZIP file {}", output.display()))?;
    let files = exclude_output(files, output);

    let quiet = cli.is_quiet();
    let result = archiver
        .pack_with(&files, BufWriter::new(file), |entry| {
            if !quiet {
                println!("  adding: {} (stored 0%)", entry.display_name());
            }
        })
        .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            // Best effort; the write error is the one worth reporting
            let _ = std::fs::remove_file(output);
            return Err(e.context(format!("Error writing ZIP file {}", output.display())));
        }
    };

    if !quiet {
        println!(
            "created {} ({} entries, {} bytes)",
            output.display(),
            report.summary.entries.len(),
            report.summary.total_size
        );
    }

    Ok(())
}

/// Re-read the archive and check every entry's CRC-32.
async fn test_archive(output: &Path, cli: &Cli) -> Result<()> {
    let data = tokio::fs::read(output).await?;

    match ArchiveReader::new(&data).verify() {
        Ok(_) => {
            if !cli.is_very_quiet() {
                println!("test of {} OK", output.display());
            }
            Ok(())
        }
        Err(e) => bail!("test of {} FAILED: {}", output.display(), e),
    }
}

/// List the archive contents in a table.
///
/// Entries are STORED, so the size column always equals the length and the
/// compression ratio is always 0%.
async fn list_archive(output: &Path) -> Result<()> {
    let data = tokio::fs::read(output).await?;
    let entries = ArchiveReader::new(&data).list_files()?;

    println!(
        "{:>10}  {:>10}  {:>5}  {:>8}  Name",
        "Length", "Size", "Cmpr", "CRC-32"
    );
    println!("{}", "-".repeat(60));

    let mut total = 0u64;
    for entry in &entries {
        println!(
            "{:>10}  {:>10}  {:>4}%  {:08x}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            0,
            entry.crc32,
            entry.file_name
        );
        total += entry.uncompressed_size as u64;
    }

    println!("{}", "-".repeat(60));
    println!(
        "{:>10}  {:>10}  {:>4}%  {:>8}  {} files",
        total,
        total,
        0,
        "",
        entries.len()
    );

    Ok(())
}
