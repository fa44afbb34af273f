//! Treepick CLI - interactive selective backup
//!
//! Usage: treepick [OPTIONS] <SOURCE> [DEST]
//!
//! Scans SOURCE (or loads the tree saved in `--job`), lets you pick what to
//! keep, then copies the included files to DEST with rsync.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use treepick::application::{BackupOptions, BackupReport, BackupUseCase, TreeOrigin};
use treepick::config::Config;
use treepick::domain::value_objects::ByteSize;
use treepick::infrastructure::{RsyncCopier, Scanner};
use treepick::ui::TreeChooser;

/// Treepick - pick subtrees, annotate them, copy with rsync
#[derive(Parser, Debug)]
#[command(name = "treepick")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to back up
    source: PathBuf,

    /// Backup destination (created if missing; not needed with --dry-run)
    dest: Option<PathBuf>,

    /// Job directory that keeps the tree and exclusion list between runs
    #[arg(long, value_name = "DIR")]
    job: Option<PathBuf>,

    /// Choose and save, but do not copy
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip the interactive chooser
    #[arg(short, long)]
    quiet: bool,

    /// Config file (default: <config dir>/treepick/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("treepick: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        if let Err(err) = ctrlc::set_handler(move || cancelled.store(true, Ordering::SeqCst)) {
            warn!("cannot install Ctrl-C handler: {err}");
        }
    }

    let mut options = BackupOptions::new(&cli.source)
        .with_dry_run(cli.dry_run)
        .with_quiet(cli.quiet);
    if let Some(dest) = &cli.dest {
        options = options.with_destination(dest);
    }
    if let Some(job) = &cli.job {
        options = options.with_job_dir(job);
    }

    let mut copier = RsyncCopier::from_config(&config.copy);
    if cli.quiet {
        copier = copier.quiet();
    }
    if !cli.dry_run && !copier.check_available() {
        warn!("'{}' does not answer --version; the copy may fail", config.copy.program);
    }

    let mut chooser = TreeChooser::new().with_ascii(config.ui.ascii);
    let use_case = BackupUseCase::new(config).with_scanner(Scanner::new().with_cancel_flag(cancelled));

    let report = use_case.execute(&options, &mut chooser, &copier)?;
    print_report(&report, cli.quiet);
    Ok(())
}

fn print_report(report: &BackupReport, quiet: bool) {
    if quiet {
        return;
    }

    let origin = match report.origin {
        TreeOrigin::Scanned => "scanned",
        TreeOrigin::Loaded => "loaded from job",
    };
    println!(
        "Tree {origin}: {} of {} included",
        ByteSize(report.included_size),
        ByteSize(report.total_size)
    );
    if report.saved {
        println!("Tree saved to job directory");
    }
    if report.copied {
        println!("Copied with {} exclusion(s)", report.exclusions);
    }
    for path in &report.reports {
        println!("Wrote {}", path.display());
    }
}
