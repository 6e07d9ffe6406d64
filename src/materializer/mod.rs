//! Turns extracted candidates into directories and files under an output root.

pub mod paths;

use crate::config::OutputConfig;
use crate::error::{Md2ProjectError, Result};
use crate::extractor::FileCandidate;
use crate::ui::GracefulShutdown;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct WriteProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub bytes_written: u64,
    pub total_bytes: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl WriteProgress {
    pub fn new(total_files: usize, total_bytes: u64) -> Self {
        Self {
            files_processed: 0,
            total_files,
            bytes_written: 0,
            total_bytes,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_file(&mut self, path: &str, bytes: u64) {
        self.files_processed += 1;
        self.bytes_written += bytes;
        self.current_file = Some(path.to_string());
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    pub path: String,
    pub bytes: u64,
    /// A file is already present at the destination
    pub exists: bool,
    pub origin: String,
}

/// What a run would do, computed without touching the filesystem beyond
/// existence checks.
#[derive(Debug, Clone, Serialize)]
pub struct MaterializePlan {
    pub root: PathBuf,
    /// Distinct parent directories relative to `root`, sorted
    pub directories: Vec<String>,
    pub files: Vec<PlannedFile>,
    pub rejected: Vec<WriteError>,
}

impl MaterializePlan {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    pub fn existing_files(&self) -> usize {
        self.files.iter().filter(|f| f.exists).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterializeReport {
    pub root: PathBuf,
    pub directories_created: Vec<String>,
    pub files_written: Vec<String>,
    /// Existing files left untouched because overwriting was disabled
    pub files_skipped: Vec<String>,
    pub bytes_written: u64,
    pub errors: Vec<WriteError>,
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
}

impl MaterializeReport {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            directories_created: Vec::new(),
            files_written: Vec::new(),
            files_skipped: Vec::new(),
            bytes_written: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
            completed_at: Utc::now(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

enum WriteOutcome {
    Written(u64),
    Skipped,
}

pub struct Materializer {
    overwrite: bool,
    trailing_newline: bool,
    buffer_size: usize,
}

impl Materializer {
    pub fn new() -> Self {
        Self {
            overwrite: true,
            trailing_newline: false,
            buffer_size: 64 * 1024,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new()
            .with_overwrite(config.overwrite)
            .with_trailing_newline(config.trailing_newline)
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096);
        self
    }

    fn payload<'c>(&self, content: &'c str) -> std::borrow::Cow<'c, str> {
        if self.trailing_newline && !content.is_empty() && !content.ends_with('\n') {
            format!("{}\n", content).into()
        } else {
            content.into()
        }
    }

    /// Preview of a run. Reads nothing but existence checks and writes
    /// nothing.
    pub fn plan(&self, candidates: &[FileCandidate], root: &Path) -> MaterializePlan {
        let mut directories = BTreeSet::new();
        let mut files = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();

        for candidate in candidates {
            let relative = match paths::relative_destination(&candidate.path) {
                Ok(relative) => relative,
                Err(err) => {
                    rejected.push(WriteError {
                        path: candidate.path.clone(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            directories.extend(parent_directories(&relative));
            files.push(PlannedFile {
                path: candidate.path.clone(),
                bytes: self.payload(&candidate.content).len() as u64,
                exists: root.join(&relative).exists(),
                origin: candidate.origin.clone(),
            });
        }

        MaterializePlan {
            root: root.to_path_buf(),
            directories: directories.into_iter().collect(),
            files,
            rejected,
        }
    }

    /// Create parent directories, then write every candidate. Per-file
    /// failures are recorded in the report and do not stop the run.
    pub fn materialize(
        &self,
        candidates: &[FileCandidate],
        root: &Path,
        progress_callback: Option<&dyn Fn(&WriteProgress)>,
        shutdown: Option<&GracefulShutdown>,
    ) -> Result<MaterializeReport> {
        let start = Instant::now();
        let mut report = MaterializeReport::new(root);

        fs::create_dir_all(root).map_err(|e| io_error(e, root))?;

        let mut directories = BTreeSet::new();
        for candidate in candidates {
            if let Ok(relative) = paths::relative_destination(&candidate.path) {
                directories.extend(parent_directories(&relative));
            }
        }
        for directory in directories {
            let target = root.join(&directory);
            if target.is_dir() {
                continue;
            }
            match fs::create_dir_all(&target) {
                Ok(()) => {
                    log::debug!("created directory {}", target.display());
                    report.directories_created.push(directory);
                }
                Err(e) => report.errors.push(WriteError {
                    path: directory,
                    message: e.to_string(),
                }),
            }
        }

        let total_bytes = candidates.iter().map(|c| c.content.len() as u64).sum();
        let mut progress = WriteProgress::new(candidates.len(), total_bytes);

        self.write_files(
            candidates,
            root,
            &mut progress,
            &mut report,
            progress_callback,
            shutdown,
        )?;

        report.duration = start.elapsed();
        report.completed_at = Utc::now();
        Ok(report)
    }

    #[cfg(not(feature = "parallel"))]
    fn write_files(
        &self,
        candidates: &[FileCandidate],
        root: &Path,
        progress: &mut WriteProgress,
        report: &mut MaterializeReport,
        progress_callback: Option<&dyn Fn(&WriteProgress)>,
        shutdown: Option<&GracefulShutdown>,
    ) -> Result<()> {
        for candidate in candidates {
            if let Some(shutdown) = shutdown {
                shutdown.check_shutdown()?;
            }

            let outcome = self.write_candidate(candidate, root);
            record(report, progress, candidate, outcome);

            if let Some(callback) = progress_callback {
                callback(progress);
            }
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn write_files(
        &self,
        candidates: &[FileCandidate],
        root: &Path,
        progress: &mut WriteProgress,
        report: &mut MaterializeReport,
        progress_callback: Option<&dyn Fn(&WriteProgress)>,
        shutdown: Option<&GracefulShutdown>,
    ) -> Result<()> {
        use rayon::prelude::*;

        let is_running = || shutdown.map_or(true, GracefulShutdown::is_running);

        // paths are unique, so no two writes share a destination
        let outcomes: Vec<Option<Result<WriteOutcome>>> = candidates
            .par_iter()
            .map(|candidate| is_running().then(|| self.write_candidate(candidate, root)))
            .collect();

        let mut cancelled = false;
        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Some(outcome) => record(report, progress, candidate, outcome),
                None => cancelled = true,
            }
            if let Some(callback) = progress_callback {
                callback(progress);
            }
        }

        if cancelled {
            return Err(Md2ProjectError::Cancelled);
        }
        Ok(())
    }

    fn write_candidate(&self, candidate: &FileCandidate, root: &Path) -> Result<WriteOutcome> {
        let destination = root.join(paths::relative_destination(&candidate.path)?);
        paths::check_path_length(&destination)?;

        if destination.is_dir() {
            return Err(Md2ProjectError::InvalidPath {
                path: format!("{} is a directory", destination.display()),
            });
        }
        if destination.exists() && !self.overwrite {
            log::info!("keeping existing {}", destination.display());
            return Ok(WriteOutcome::Skipped);
        }

        let payload = self.payload(&candidate.content);
        let file = fs::File::create(&destination).map_err(|e| io_error(e, &destination))?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);
        writer.write_all(payload.as_bytes())?;
        writer.flush()?;

        log::debug!("wrote {} ({} bytes)", destination.display(), payload.len());
        Ok(WriteOutcome::Written(payload.len() as u64))
    }
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new()
    }
}

fn record(
    report: &mut MaterializeReport,
    progress: &mut WriteProgress,
    candidate: &FileCandidate,
    outcome: Result<WriteOutcome>,
) {
    match outcome {
        Ok(WriteOutcome::Written(bytes)) => {
            report.files_written.push(candidate.path.clone());
            report.bytes_written += bytes;
            progress.update_file(&candidate.path, bytes);
        }
        Ok(WriteOutcome::Skipped) => {
            report.files_skipped.push(candidate.path.clone());
            progress.update_file(&candidate.path, 0);
        }
        Err(err) => {
            log::warn!("failed to write {}: {}", candidate.path, err);
            report.errors.push(WriteError {
                path: candidate.path.clone(),
                message: err.to_string(),
            });
            progress.update_file(&candidate.path, 0);
        }
    }
}

/// Every ancestor directory of a relative file path, as forward-slash
/// strings: `a/b/c.ts` yields `a` and `a/b`.
fn parent_directories(relative: &Path) -> Vec<String> {
    let mut directories = Vec::new();
    let mut current = PathBuf::new();

    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            current.push(component);
            directories.push(current.to_string_lossy().replace('\\', "/"));
        }
    }

    directories
}

fn io_error(error: std::io::Error, path: &Path) -> Md2ProjectError {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => Md2ProjectError::Permission {
            path: path.display().to_string(),
        },
        _ => Md2ProjectError::Io(error),
    }
}
