//! Directory-level analysis of accident files
//!
//! Every file gets its own analyzer and therefore its own lookup table.
//! Workers share only the queue position, a stop flag and the result
//! accumulator. All files in a batch are judged against the same moment.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::logging::{self, codes};
use crate::pipeline::{self, PipelineError, PipelineResult};
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Worker threads, clamped to `1..=MAX_WORKER_THREADS`
    pub max_threads: usize,
    pub recursive: bool,
    /// Stop scheduling files after the first hard failure
    pub fail_fast: bool,
    /// Analysis moment for every file; wall-clock time when unset
    pub now: Option<DateTime<Utc>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            fail_fast: false,
            now: None,
        }
    }
}

impl BatchConfig {
    fn worker_count(&self, file_count: usize) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS).min(file_count.max(1))
    }
}

#[derive(Debug)]
pub struct BatchResults {
    /// Files that produced a report, whatever its status
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    /// Files that could not be analyzed at all
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
    pub analysis_time: Option<DateTime<Utc>>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful_files: Vec::new(),
            failed_files: Vec::new(),
            processing_duration: Duration::new(0, 0),
            files_processed: 0,
            files_discovered: 0,
            analysis_time: None,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    /// Reports with `status: success`
    pub fn clean_report_count(&self) -> usize {
        self.successful_files
            .iter()
            .filter(|(_, result)| result.report.is_success())
            .count()
    }

    /// Reports with `status: error`
    pub fn error_report_count(&self) -> usize {
        self.success_count() - self.clean_report_count()
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    fn sort_by_path(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch analysis completed: {} files processed, {} clean, {} with row errors, {} failed, {:.2}s total",
            self.files_processed,
            self.clean_report_count(),
            self.error_report_count(),
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .csv files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker error: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_INPUT_FILES,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }

    fn logged(self) -> Self {
        log_error!(self.error_code(), "Batch processing failed", "error" => &self);
        self
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Sorted `.csv` files under `dir_path`
pub fn discover_csv_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive).map_err(BatchError::logged)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        }
        .logged());
    }

    files.sort();

    log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(dir_path: &Path, files: &mut Vec<PathBuf>, recursive: bool) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive)?;
            }
        } else if is_csv_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_csv_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn lock(results: &Mutex<BatchResults>) -> MutexGuard<'_, BatchResults> {
    results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Analyze one file with the calling thread's file context set
fn analyze_file(file_path: &Path, file_id: usize, now: DateTime<Utc>) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        pipeline::process_file_in_context(file_path, now)
    })
}

/// Analyze every discovered file with a pool of worker threads
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let now = config.now.unwrap_or_else(Utc::now);

    let files = Arc::new(discover_csv_files(dir_path, config)?);
    let workers = config.worker_count(files.len());

    log_info!("Starting batch analysis",
        "directory" => dir_path.display(),
        "files" => files.len(),
        "workers" => workers,
        "now" => now.to_rfc3339()
    );

    let results = Arc::new(Mutex::new(BatchResults::new()));
    let next_file = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(AtomicBool::new(false));
    let fail_fast = config.fail_fast;

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let files = Arc::clone(&files);
        let results = Arc::clone(&results);
        let next_file = Arc::clone(&next_file);
        let stop = Arc::clone(&stop);

        handles.push(thread::spawn(move || loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            let file_id = next_file.fetch_add(1, Ordering::SeqCst);
            let Some(file_path) = files.get(file_id) else {
                break;
            };

            match analyze_file(file_path, file_id, now) {
                Ok(result) => lock(&results).add_success(file_path.clone(), result),
                Err(error) => {
                    lock(&results).add_failure(file_path.clone(), error);
                    if fail_fast {
                        stop.store(true, Ordering::SeqCst);
                    }
                }
            }
        }));
    }

    let mut panicked = 0;
    for handle in handles {
        if handle.join().is_err() {
            panicked += 1;
        }
    }
    if panicked > 0 {
        return Err(BatchError::WorkerFailure {
            message: format!("{} worker thread(s) panicked", panicked),
        }
        .logged());
    }

    let mut results = Arc::try_unwrap(results)
        .map_err(|_| {
            BatchError::WorkerFailure {
                message: "Failed to collect results from workers".to_string(),
            }
            .logged()
        })?
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if fail_fast && stop.load(Ordering::SeqCst) {
        log_warning!(
            codes::batch::WORKER_FAILURE,
            "Fail-fast mode stopped batch analysis early",
            "files_processed" => results.files_processed,
            "files_discovered" => files.len()
        );
    }

    results.sort_by_path();
    results.files_discovered = files.len();
    results.analysis_time = Some(now);
    results.processing_duration = start_time.elapsed();

    log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch analysis completed",
        "files_processed" => results.files_processed,
        "clean_reports" => results.clean_report_count(),
        "error_reports" => results.error_report_count(),
        "failed" => results.failure_count(),
        "workers" => workers,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

/// Analyze a directory with the default configuration
pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use tempfile::tempdir;

    const HEADER: &str = "id,fecha,hora,gravedad,victimas\n";

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            now: Some(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()),
            ..BatchConfig::default()
        }
    }

    fn write(dir: &Path, name: &str, rows: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("{}{}", HEADER, rows)).unwrap();
        path
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("nested")).unwrap();

        write(root, "b.csv", "ACC-2024-000001,2023-05-01,10:00,leve,1\n");
        write(root, "a.CSV", "ACC-2024-000001,2023-05-01,10:00,leve,1\n");
        write(&root.join("nested"), "c.csv", "ACC-2024-000001,2023-05-01,10:00,leve,1\n");
        fs::write(root.join("notes.txt"), "not csv").unwrap();

        let files = discover_csv_files(root, &config(1)).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));

        let shallow = BatchConfig {
            recursive: false,
            ..config(1)
        };
        assert_eq!(discover_csv_files(root, &shallow).unwrap().len(), 2);
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();

        let result = discover_csv_files(&temp_dir.path().join("missing"), &config(1));
        assert_matches!(result, Err(BatchError::DirectoryNotFound { .. }));

        let result = discover_csv_files(temp_dir.path(), &config(1));
        assert_matches!(result, Err(BatchError::NoFilesFound { .. }));
    }

    #[test]
    fn test_files_are_analyzed_independently() {
        let _ = crate::logging::init_global_logging();
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        let clean = write(root, "clean.csv", "ACC-2024-000001,2023-05-01,10:00,leve,2\n");
        let same_id = write(root, "same_id.csv", "ACC-2024-000001,2023-05-02,11:00,grave,3\n");
        let broken = write(root, "broken.csv", "BAD-ID,2023-05-01,10:00,leve,1\n");
        let empty = write(root, "empty.csv", "");

        let results = process_directory_with_config(root, &config(3)).unwrap();

        assert_eq!(results.files_discovered, 4);
        assert_eq!(results.files_processed, 4);
        assert_eq!(results.clean_report_count(), 2);
        assert_eq!(results.error_report_count(), 1);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failed_files[0].0, empty);
        assert_matches!(results.failed_files[0].1, PipelineError::EmptyInput);

        let report_for = |path: &Path| {
            results
                .successful_files
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, r)| &r.report)
                .unwrap()
        };
        assert!(report_for(&clean).is_success());
        assert!(report_for(&same_id).is_success());
        assert!(!report_for(&broken).is_success());
        assert_eq!(
            report_for(&same_id).detailed_data.as_ref().unwrap().total_casualties,
            3
        );
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        for i in 0..6 {
            write(root, &format!("f{}.csv", i), "ACC-2024-000001,2023-05-01,10:00,leve,1\n");
        }

        let sequential = process_directory_with_config(root, &config(1)).unwrap();
        let parallel = process_directory_with_config(root, &config(4)).unwrap();

        let paths = |r: &BatchResults| r.successful_files.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>();
        assert_eq!(paths(&sequential), paths(&parallel));
        assert_eq!(sequential.clean_report_count(), 6);
        assert_eq!(sequential.analysis_time, parallel.analysis_time);
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "a_empty.csv", "");
        write(root, "b.csv", "ACC-2024-000001,2023-05-01,10:00,leve,1\n");

        let fail_fast = BatchConfig {
            fail_fast: true,
            ..config(1)
        };
        let results = process_directory_with_config(root, &fail_fast).unwrap();

        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.files_processed, 1);
    }

    #[test]
    fn test_worker_count_is_bounded() {
        assert_eq!(config(0).worker_count(5), 1);
        assert_eq!(config(4).worker_count(2), 2);
        assert_eq!(config(usize::MAX).worker_count(usize::MAX), MAX_WORKER_THREADS);
    }
}
