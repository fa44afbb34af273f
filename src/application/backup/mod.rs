//! Backup Module
//!
//! Orchestrates one backup run.
//!
//! ## Structure
//!
//! - `options` - Run options (`BackupOptions`)
//! - `result` - Result types (`BackupReport`, `TreeOrigin`)
//! - `use_case` - Core use case logic (`BackupUseCase`, `BackupError`)
//!
//! ## Usage
//!
//! ```ignore
//! use treepick::application::backup::{BackupOptions, BackupUseCase};
//!
//! let use_case = BackupUseCase::new(config);
//! let report = use_case.execute(&BackupOptions::new(source), &mut chooser, &copier)?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::BackupOptions;
pub use result::{BackupReport, TreeOrigin};
pub use use_case::{BackupError, BackupUseCase};

#[cfg(test)]
mod tests;
