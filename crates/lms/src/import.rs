//! SIS CSV import orchestration.
//!
//! The importer keeps an LMS instance up to date with data received from a
//! university Student Information System: it submits a CSV to the SIS import
//! endpoint, optionally polls the job until it reaches a terminal state, and
//! aggregates per-file processing warnings and errors so batch callers can
//! make one pass/fail decision at the end.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use registrar_core::error::{RegistrarError, Result};

use crate::api::LmsApi;
use crate::status::{ImportJob, ImportStatus};

/// Default wall-clock budget for one import: two hours.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 2);

/// Submit options sent with every import unless overridden.
pub fn default_import_params() -> Vec<(String, String)> {
    vec![
        ("import_type".to_string(), "instructure_csv".to_string()),
        ("override_sis_stickiness".to_string(), "true".to_string()),
    ]
}

/// Poll intervals as a pure function of the attempt count.
///
/// The first few polls are quick so small imports finish promptly; from
/// `steady_after` onward the interval stretches to let the API recover
/// between subsequent retries of long-running jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    pub initial_delay: Duration,
    pub steady_delay: Duration,
    /// 1-based attempt number at which the steady delay takes over.
    pub steady_after: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            steady_delay: Duration::from_secs(30),
            steady_after: 5,
        }
    }
}

impl PollSchedule {
    /// Delay before the next poll, given the 1-based attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt < self.steady_after {
            self.initial_delay
        } else {
            self.steady_delay
        }
    }
}

/// Drives SIS CSV imports end to end.
///
/// One importer may run several imports; warnings and errors accumulate per
/// submitted path across calls, and [`SisImporter::check_errors`] gives the
/// aggregate verdict. The importer holds no interior synchronization: callers
/// sharing one instance across threads must synchronize externally.
pub struct SisImporter<C: LmsApi> {
    api: C,
    account_id: String,
    timeout: Option<Duration>,
    dryrun: bool,
    wait_for_completion: bool,
    import_params: Vec<(String, String)>,
    schedule: PollSchedule,
    warnings: HashMap<String, Vec<String>>,
    errors: HashMap<String, Vec<String>>,
}

impl<C: LmsApi> SisImporter<C> {
    /// Create an importer for the given account with default settings:
    /// two-hour timeout, wait for completion, no dry run.
    pub fn new(api: C, account_id: &str) -> Self {
        Self {
            api,
            account_id: account_id.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            dryrun: false,
            wait_for_completion: true,
            import_params: default_import_params(),
            schedule: PollSchedule::default(),
            warnings: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    /// Set the wall-clock budget for one import; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Suppress all network calls, recording empty results per path.
    pub fn with_dryrun(mut self, dryrun: bool) -> Self {
        self.dryrun = dryrun;
        self
    }

    /// Whether to poll the job until it reaches a terminal state.
    pub fn with_wait_for_completion(mut self, wait_for_completion: bool) -> Self {
        self.wait_for_completion = wait_for_completion;
        self
    }

    /// Replace the default submit options.
    pub fn with_import_params(mut self, import_params: Vec<(String, String)>) -> Self {
        self.import_params = import_params;
        self
    }

    /// Replace the default poll schedule.
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Warnings collected so far, keyed by submitted path.
    pub fn warnings(&self) -> &HashMap<String, Vec<String>> {
        &self.warnings
    }

    /// Errors collected so far, keyed by submitted path.
    pub fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    /// Import a CSV file, optionally waiting for the job to complete.
    ///
    /// Returns the final decoded status, or `None` in dry-run mode.
    /// Processing errors found in the final status are recorded, not raised;
    /// call [`SisImporter::check_errors`] for the aggregate verdict.
    pub async fn import_csv(&mut self, csv_path: &Path) -> Result<Option<ImportStatus>> {
        let path_key = csv_path.display().to_string();
        if self.dryrun {
            warn!(path = %path_key, "not importing: running in dryrun mode");
            self.warnings.entry(path_key.clone()).or_default();
            self.errors.entry(path_key).or_default();
            return Ok(None);
        }

        let job = self.start_import(csv_path).await?;
        if self.wait_for_completion {
            self.wait_for_completion(&job.id).await?;
            info!(import_id = %job.id, "SIS import 100% complete");
        }
        let status = self.finalize(&job.id, &path_key).await?;
        Ok(Some(status))
    }

    /// Fail with [`RegistrarError::SisImport`] if any imported path recorded
    /// processing errors. A silent no-op when `exit_on_error` is false.
    pub fn check_errors(&self, exit_on_error: bool) -> Result<()> {
        if !exit_on_error {
            return Ok(());
        }
        let mut failed: Vec<String> = self
            .errors
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(path, _)| path.clone())
            .collect();
        if failed.is_empty() {
            return Ok(());
        }
        failed.sort();
        Err(RegistrarError::SisImport { files: failed })
    }

    async fn start_import(&self, csv_path: &Path) -> Result<ImportJob> {
        info!(path = %csv_path.display(), "starting SIS import");
        let response = self
            .api
            .import_sis_data(&self.account_id, csv_path, &self.import_params)
            .await?;
        let job = ImportJob::from_value(&response)?;
        info!(import_id = %job.id, "SIS import submitted");
        // Submission-time errors surface problems the vendor detected
        // synchronously (e.g. malformed CSV headers); the job may still run
        // asynchronously, so log and continue.
        for message in &job.errors {
            error!(import_id = %job.id, "{message}");
        }
        Ok(job)
    }

    /// Wait until the SIS import is complete.
    async fn wait_for_completion(&self, import_id: &str) -> Result<()> {
        let start = Instant::now();
        let mut attempt: u32 = 0;
        while !self.is_import_complete(import_id).await? {
            if let Some(limit) = self.timeout {
                let elapsed = start.elapsed();
                if elapsed > limit {
                    return Err(RegistrarError::ImportTimeout {
                        elapsed_secs: elapsed.as_secs(),
                        limit_secs: limit.as_secs(),
                    });
                }
            }
            attempt += 1;
            sleep(self.schedule.delay_for(attempt)).await;
        }
        Ok(())
    }

    async fn is_import_complete(&self, import_id: &str) -> Result<bool> {
        let status = self.fetch_status(import_id).await?;
        info!(import_id = %import_id, progress = status.progress(), "SIS import progress");
        Ok(status.is_complete())
    }

    async fn fetch_status(&self, import_id: &str) -> Result<ImportStatus> {
        let response = self
            .api
            .get_sis_import_status(&self.account_id, import_id)
            .await?;
        ImportStatus::from_value(&response)
    }

    async fn finalize(&mut self, import_id: &str, path_key: &str) -> Result<ImportStatus> {
        let status = self.fetch_status(import_id).await?;
        debug!(import_id = %import_id, response = %status, "SIS import final response");

        let mut warnings = Vec::new();
        for warning in status.processing_warnings() {
            warn!(
                file = %warning.filename,
                "warning occurred while importing: {}", warning.message
            );
            warnings.push(warning.message.clone());
        }
        let mut errors = Vec::new();
        for processing_error in status.processing_errors() {
            error!(
                file = %processing_error.filename,
                "error occurred while importing: {}", processing_error.message
            );
            errors.push(processing_error.message.clone());
        }

        self.warnings
            .entry(path_key.to_string())
            .or_default()
            .extend(warnings);
        self.errors
            .entry(path_key.to_string())
            .or_default()
            .extend(errors);
        Ok(status)
    }
}
