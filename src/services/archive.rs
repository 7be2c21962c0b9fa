//! Writing batch results to disk: loose files or a single zip.

use chrono::{DateTime, Local};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::models::JobResult;

/// Deflate level for zip entries.
const ZIP_LEVEL: i64 = 6;

/// Consumes the results of a finished batch.
pub trait Archiver {
    fn archive(&self, results: &[JobResult]) -> Result<ArchiveReport, ArchiveError>;
}

/// What an archiver wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Batch directory or zip file
    pub location: PathBuf,
    /// One entry name per result, in result order
    pub entries: Vec<String>,
    /// Results stored as their original image
    pub fallbacks: usize,
}

impl ArchiveReport {
    fn new(location: PathBuf, results: &[JobResult]) -> Self {
        Self {
            location,
            entries: entry_names(results),
            fallbacks: results.iter().filter(|r| !r.is_processed()).count(),
        }
    }
}

/// `halftone_<n>_<w>x<h>.<ext>`, `n` counting from 1.
pub fn file_name(position: usize, result: &JobResult) -> String {
    format!(
        "halftone_{}_{}x{}.{}",
        position + 1,
        result.width,
        result.height,
        extension(result)
    )
}

fn entry_names(results: &[JobResult]) -> Vec<String> {
    results
        .iter()
        .enumerate()
        .map(|(position, result)| file_name(position, result))
        .collect()
}

fn extension(result: &JobResult) -> &'static str {
    if result.is_processed() {
        return "png";
    }
    image::guess_format(&result.output)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

/// Pack every result into one zip, entries named by [`file_name`].
pub fn build_zip(results: &[JobResult]) -> Result<Vec<u8>, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (position, result) in results.iter().enumerate() {
        writer.start_file(file_name(position, result), options)?;
        writer
            .write_all(&result.output)
            .map_err(zip::result::ZipError::Io)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// `halftone_batch_<YYYYmmdd-HHMMSS>`, shared by batch directories and zips.
pub fn batch_stem(now: DateTime<Local>) -> String {
    format!("halftone_batch_{}", now.format("%Y%m%d-%H%M%S"))
}

/// Create `<root>/<stem><ext>`, then `<stem>_2<ext>`, ... until `create`
/// does not report `AlreadyExists`.
fn create_unique<T>(
    root: &Path,
    stem: &str,
    ext: &str,
    create: impl Fn(&Path) -> std::io::Result<T>,
) -> Result<(PathBuf, T), ArchiveError> {
    std::fs::create_dir_all(root).map_err(|source| ArchiveError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut attempt = 1;
    loop {
        let name = if attempt == 1 {
            format!("{stem}{ext}")
        } else {
            format!("{stem}_{attempt}{ext}")
        };
        let path = root.join(name);
        match create(&path) {
            Ok(created) => return Ok((path, created)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(ArchiveError::Io { path, source }),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ArchiveError> {
    std::fs::write(path, bytes).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every result into `<root>/halftone_batch_<YYYYmmdd-HHMMSS>/`.
#[derive(Debug, Clone)]
pub struct DirectoryArchiver {
    root: PathBuf,
}

impl DirectoryArchiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn create_batch_dir(&self, now: DateTime<Local>) -> Result<PathBuf, ArchiveError> {
        let (dir, ()) = create_unique(&self.root, &batch_stem(now), "", |path| {
            std::fs::create_dir(path)
        })?;
        Ok(dir)
    }
}

impl Archiver for DirectoryArchiver {
    fn archive(&self, results: &[JobResult]) -> Result<ArchiveReport, ArchiveError> {
        let directory = self.create_batch_dir(Local::now())?;
        let report = ArchiveReport::new(directory, results);

        for (name, result) in report.entries.iter().zip(results) {
            let path = report.location.join(name);
            write_file(&path, &result.output)?;
            tracing::debug!(job = %result.id, path = %path.display(), "Wrote result");
        }

        tracing::info!(
            directory = %report.location.display(),
            files = report.entries.len(),
            fallbacks = report.fallbacks,
            "Archived batch"
        );
        Ok(report)
    }
}

/// Writes every result into `<root>/halftone_batch_<YYYYmmdd-HHMMSS>.zip`.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    root: PathBuf,
}

impl ZipArchiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Archiver for ZipArchiver {
    fn archive(&self, results: &[JobResult]) -> Result<ArchiveReport, ArchiveError> {
        let bytes = build_zip(results)?;
        let (path, mut file) = create_unique(&self.root, &batch_stem(Local::now()), ".zip", |path| {
            std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
        })?;
        file.write_all(&bytes)
            .map_err(|source| ArchiveError::Io {
                path: path.clone(),
                source,
            })?;

        let report = ArchiveReport::new(path, results);
        tracing::info!(
            archive = %report.location.display(),
            files = report.entries.len(),
            fallbacks = report.fallbacks,
            bytes = bytes.len(),
            "Archived batch"
        );
        Ok(report)
    }
}
