//! Backup Use Case Tests

use super::*;
use crate::config::Config;
use crate::domain::ports::{CopyError, SelectionOutcome, TreeCopier, TreeSelector};
use crate::domain::tree::DirTree;
use crate::domain::value_objects::FilterState;
use crate::error::TreepickError;
use crate::infrastructure::persistence::load_tree;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// Mock implementations for testing

/// Excludes the given relative paths, then confirms
struct ExcludingSelector {
    exclude: Vec<&'static str>,
    outcome: SelectionOutcome,
    calls: usize,
}

impl ExcludingSelector {
    fn new(exclude: Vec<&'static str>) -> Self {
        Self {
            exclude,
            outcome: SelectionOutcome::Confirmed,
            calls: 0,
        }
    }

    fn aborting() -> Self {
        Self {
            exclude: Vec::new(),
            outcome: SelectionOutcome::Aborted,
            calls: 0,
        }
    }
}

impl TreeSelector for ExcludingSelector {
    fn select(&mut self, tree: &mut DirTree) -> std::io::Result<SelectionOutcome> {
        self.calls += 1;
        for path in &self.exclude {
            if let Some(id) = tree.find(path) {
                tree.exclude_all(id);
            }
        }
        Ok(self.outcome)
    }
}

#[derive(Default)]
struct RecordingCopier {
    fail: bool,
    exclusions: RefCell<Vec<String>>,
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl TreeCopier for RecordingCopier {
    fn name(&self) -> &str {
        "recording"
    }

    fn copy(&self, source: &Path, destination: &Path, exclusions: &Path) -> Result<(), CopyError> {
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf()));
        self.exclusions
            .borrow_mut()
            .push(fs::read_to_string(exclusions).unwrap());
        if self.fail {
            return Err(CopyError::Failed {
                program: "recording".to_string(),
                code: Some(23),
            });
        }
        Ok(())
    }
}

/// src/{A/{a1(10), a2(20)}, b(5)}
fn source_tree(root: &Path) -> PathBuf {
    let source = root.join("src");
    fs::create_dir_all(source.join("A")).unwrap();
    fs::write(source.join("A/a1"), vec![0u8; 10]).unwrap();
    fs::write(source.join("A/a2"), vec![0u8; 20]).unwrap();
    fs::write(source.join("b"), vec![0u8; 5]).unwrap();
    source
}

#[test]
fn copy_run_writes_exclusions_then_reports() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let dest = dir.path().join("dest");
    let options = BackupOptions::new(&source).with_destination(&dest);
    let mut selector = ExcludingSelector::new(vec!["A/a1"]);
    let copier = RecordingCopier::default();

    let report = BackupUseCase::new(Config::default())
        .execute(&options, &mut selector, &copier)
        .unwrap();

    assert_eq!(selector.calls, 1);
    assert_eq!(report.origin, TreeOrigin::Scanned);
    assert_eq!(report.total_size, 35);
    assert_eq!(report.included_size, 25);
    assert!(report.copied);
    assert!(!report.saved);
    assert_eq!(report.exclusions, 1);
    assert_eq!(copier.exclusions.borrow().as_slice(), ["/A/a1\n"]);
    assert_eq!(copier.calls.borrow()[0], (source.clone(), dest.clone()));

    let manifest = fs::read_to_string(dest.join("FILES.csv")).unwrap();
    assert!(manifest.starts_with("path,is_directory,size\n,true,25\n"));
    assert!(!manifest.contains("a1"));
    let summary = fs::read_to_string(dest.join("README.txt")).unwrap();
    assert!(summary.contains("Total size: 25 bytes"));
    assert_eq!(report.reports.len(), 2);
}

#[test]
fn dry_run_skips_copy() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let options = BackupOptions::new(&source).with_dry_run(true);
    let copier = RecordingCopier::default();

    let report = BackupUseCase::new(Config::default())
        .execute(&options, &mut ExcludingSelector::new(vec![]), &copier)
        .unwrap();

    assert!(!report.copied);
    assert!(copier.calls.borrow().is_empty());
}

#[test]
fn missing_destination_is_rejected() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let options = BackupOptions::new(&source);

    let err = BackupUseCase::new(Config::default())
        .execute(
            &options,
            &mut ExcludingSelector::new(vec![]),
            &RecordingCopier::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        TreepickError::Backup(BackupError::MissingDestination)
    ));
}

#[test]
fn quiet_run_does_not_ask() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let options = BackupOptions::new(&source)
        .with_dry_run(true)
        .with_quiet(true);
    let mut selector = ExcludingSelector::new(vec!["b"]);

    let report = BackupUseCase::new(Config::default())
        .execute(&options, &mut selector, &RecordingCopier::default())
        .unwrap();

    assert_eq!(selector.calls, 0);
    assert_eq!(report.included_size, 35);
}

#[test]
fn aborted_selection_saves_and_copies_nothing() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let job = dir.path().join("job");
    let dest = dir.path().join("dest");
    let options = BackupOptions::new(&source)
        .with_destination(&dest)
        .with_job_dir(&job);
    let copier = RecordingCopier::default();

    let err = BackupUseCase::new(Config::default())
        .execute(&options, &mut ExcludingSelector::aborting(), &copier)
        .unwrap_err();

    assert!(matches!(err, TreepickError::Backup(BackupError::Aborted)));
    assert!(!job.join("tree.dat").exists());
    assert!(copier.calls.borrow().is_empty());
    assert!(!dest.exists());
}

#[test]
fn job_directory_persists_selection_between_runs() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let job = dir.path().join("job");
    let options = BackupOptions::new(&source)
        .with_job_dir(&job)
        .with_dry_run(true);
    let use_case = BackupUseCase::new(Config::default());

    let first = use_case
        .execute(
            &options,
            &mut ExcludingSelector::new(vec!["A"]),
            &RecordingCopier::default(),
        )
        .unwrap();
    assert!(first.saved);
    assert_eq!(first.origin, TreeOrigin::Scanned);

    // A new file would show up in a rescan, but the saved tree wins
    fs::write(source.join("late"), vec![0u8; 100]).unwrap();
    let second = use_case
        .execute(
            &options.clone().with_quiet(true),
            &mut ExcludingSelector::new(vec![]),
            &RecordingCopier::default(),
        )
        .unwrap();

    assert_eq!(second.origin, TreeOrigin::Loaded);
    assert_eq!(second.total_size, 35);
    assert_eq!(second.included_size, 5);

    let saved = load_tree(&job.join("tree.dat")).unwrap();
    let a = saved.find("A").unwrap();
    assert_eq!(saved[a].filter(), FilterState::ExcludeAll);
}

#[test]
fn corrupt_tree_file_falls_back_to_scan() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let job = dir.path().join("job");
    fs::create_dir_all(&job).unwrap();
    fs::write(job.join("tree.dat"), "not a tree\n").unwrap();
    let options = BackupOptions::new(&source)
        .with_job_dir(&job)
        .with_dry_run(true)
        .with_quiet(true);

    let report = BackupUseCase::new(Config::default())
        .execute(
            &options,
            &mut ExcludingSelector::new(vec![]),
            &RecordingCopier::default(),
        )
        .unwrap();

    assert_eq!(report.origin, TreeOrigin::Scanned);
    assert!(load_tree(&job.join("tree.dat")).is_ok());
}

#[test]
fn failed_copy_writes_no_reports() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let dest = dir.path().join("dest");
    let options = BackupOptions::new(&source).with_destination(&dest);
    let copier = RecordingCopier {
        fail: true,
        ..RecordingCopier::default()
    };

    let err = BackupUseCase::new(Config::default())
        .execute(&options, &mut ExcludingSelector::new(vec![]), &copier)
        .unwrap_err();

    assert!(matches!(
        err,
        TreepickError::Copy(CopyError::Failed { code: Some(23), .. })
    ));
    assert!(!dest.join("README.txt").exists());
    assert!(!dest.join("FILES.csv").exists());
}

#[test]
fn fully_excluded_tree_is_not_copied() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let dest = dir.path().join("dest");
    let options = BackupOptions::new(&source).with_destination(&dest);
    let copier = RecordingCopier::default();

    let report = BackupUseCase::new(Config::default())
        .execute(&options, &mut ExcludingSelector::new(vec![""]), &copier)
        .unwrap();

    assert!(!report.copied);
    assert_eq!(report.included_size, 0);
    assert!(copier.calls.borrow().is_empty());
}

#[test]
fn job_directory_keeps_exclusion_list() {
    let dir = tempdir().unwrap();
    let source = source_tree(dir.path());
    let job = dir.path().join("job");
    let options = BackupOptions::new(&source)
        .with_destination(dir.path().join("dest"))
        .with_job_dir(&job);

    BackupUseCase::new(Config::default())
        .execute(
            &options,
            &mut ExcludingSelector::new(vec!["b"]),
            &RecordingCopier::default(),
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(job.join("exclusions.txt")).unwrap(),
        "/b\n"
    );
}
