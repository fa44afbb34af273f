//! Backup Use Case
//!
//! Orchestrates one run:
//! 1. Open and lock the job directory (if any)
//! 2. Load the saved tree, or scan the source
//! 3. Let the user choose what to include (unless quiet)
//! 4. Save the tree to the job directory
//! 5. Copy the included part and write the summary and manifest (unless dry run)

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::export::{self, SummaryInfo};
use crate::config::Config;
use crate::domain::ports::{CopyError, SelectionOutcome, TreeCopier, TreeSelector};
use crate::domain::tree::DirTree;
use crate::error::TreepickResult;
use crate::infrastructure::persistence::JobRepository;
use crate::infrastructure::scan::Scanner;

use super::options::BackupOptions;
use super::result::{BackupReport, TreeOrigin};

/// Run-level failures that are not owned by a lower layer
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup aborted by user")]
    Aborted,

    #[error("a destination directory is required unless --dry-run is given")]
    MissingDestination,

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Backup use case - orchestrates scan-or-load, selection, save and copy
pub struct BackupUseCase {
    config: Config,
    scanner: Scanner,
}

impl BackupUseCase {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scanner: Scanner::new(),
        }
    }

    /// Use a preconfigured scanner (e.g. one with a cancel flag)
    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Execute the backup use case
    pub fn execute<S, C>(
        &self,
        options: &BackupOptions,
        selector: &mut S,
        copier: &C,
    ) -> TreepickResult<BackupReport>
    where
        S: TreeSelector + ?Sized,
        C: TreeCopier + ?Sized,
    {
        if !options.dry_run && options.destination.is_none() {
            return Err(BackupError::MissingDestination.into());
        }

        let job = options
            .job_dir
            .as_deref()
            .map(|dir| JobRepository::open(dir, &self.config.job))
            .transpose()?;

        let (mut tree, origin) = self.obtain_tree(&options.source, job.as_ref())?;

        if !options.quiet {
            let outcome = timed("Choosing files", || selector.select(&mut tree))?;
            if outcome == SelectionOutcome::Aborted {
                return Err(BackupError::Aborted.into());
            }
        }

        let root = &tree[tree.root()];
        let mut report = BackupReport::new(origin, root.size(), root.filtered_size());

        if let Some(job) = &job {
            timed("Saving directory tree", || job.save(&tree))?;
            report.saved = true;
        }

        if let Some(destination) = options.destination.as_deref().filter(|_| !options.dry_run) {
            timed("Copying files", || {
                self.copy(&mut tree, options, destination, job.as_ref(), copier, &mut report)
            })?;
        }

        Ok(report)
    }

    fn obtain_tree(
        &self,
        source: &Path,
        job: Option<&JobRepository>,
    ) -> TreepickResult<(DirTree, TreeOrigin)> {
        if let Some(job) = job {
            match timed("Loading directory tree", || job.load()) {
                Ok(Some(tree)) => {
                    if let Err(violation) = tree.verify_filters() {
                        warn!("saved tree is inconsistent, keeping stored states: {violation}");
                    }
                    return Ok((tree, TreeOrigin::Loaded));
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        "ignoring unreadable tree file {}: {error}",
                        job.tree_path().display()
                    );
                }
            }
        }

        let tree = timed("Scanning directory", || self.scanner.scan(source))?;
        Ok((tree, TreeOrigin::Scanned))
    }

    fn copy<C>(
        &self,
        tree: &mut DirTree,
        options: &BackupOptions,
        destination: &Path,
        job: Option<&JobRepository>,
        copier: &C,
        report: &mut BackupReport,
    ) -> TreepickResult<()>
    where
        C: TreeCopier + ?Sized,
    {
        if tree[tree.root()].filter().is_excluded() {
            warn!("everything is excluded, nothing to copy");
            return Ok(());
        }

        fs::create_dir_all(destination).map_err(|source| CopyError::Destination {
            path: destination.to_path_buf(),
            source,
        })?;

        tree.sort_by_name();

        // Without a job directory the exclusion list only lives for this run
        let scratch;
        let exclusions_path = match job {
            Some(job) => job.exclusions_path().to_path_buf(),
            None => {
                scratch = tempfile::tempdir()?;
                scratch.path().join(&self.config.job.exclusions_file)
            }
        };
        report.exclusions = write_file(&exclusions_path, |out| export::write_exclusions(tree, out))?;

        info!("copying with {}", copier.name());
        copier.copy(&options.source, destination, &exclusions_path)?;
        report.copied = true;

        let summary_path = destination.join(&self.config.output.summary_name);
        let info = SummaryInfo {
            generated_at: chrono::Local::now().naive_local(),
            source: fs::canonicalize(&options.source).unwrap_or_else(|_| options.source.clone()),
            manifest_name: self.config.output.manifest_name.clone(),
        };
        write_file(&summary_path, |out| export::write_summary(tree, &info, out))?;
        report.reports.push(summary_path);

        let manifest_path = destination.join(&self.config.output.manifest_name);
        write_file(&manifest_path, |out| export::write_manifest(tree, out))?;
        report.reports.push(manifest_path);

        Ok(())
    }
}

fn write_file<T, F>(path: &Path, write: F) -> Result<T, BackupError>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<T>,
{
    let to_error = |source| BackupError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(to_error)?;
    let mut out = BufWriter::new(file);
    write(&mut out).map_err(to_error)
}

/// Run one phase and log how long it took
fn timed<T>(phase: &str, run: impl FnOnce() -> T) -> T {
    info!("{phase} ...");
    let started = Instant::now();
    let result = run();
    info!(
        "{phase}: completed in {:.1} seconds",
        started.elapsed().as_secs_f64()
    );
    result
}
