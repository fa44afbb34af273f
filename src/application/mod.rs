//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (tree, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `BackupUseCase` - Orchestrates a run (scan or load, choose, save, copy, report)
//!
//! ## Services
//!
//! - `export` - Manifest, summary and exclusion list writers

pub mod backup;
pub mod export;

pub use backup::{BackupError, BackupOptions, BackupReport, BackupUseCase, TreeOrigin};
pub use export::{
    included_entries, write_exclusions, write_manifest, write_summary, ManifestEntry, SummaryInfo,
};
