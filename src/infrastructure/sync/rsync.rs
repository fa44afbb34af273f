//! Rsync Copier
//!
//! Copies the contents of the source into the destination, skipping the
//! paths listed in an rsync exclusion file.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::CopyConfig;
use crate::domain::ports::{CopyError, TreeCopier};

/// Copier running rsync (or a compatible program)
///
/// Invoked as `<program> <args...> --exclude-from=<file> <source>/ <destination>/`.
/// The trailing slashes make rsync copy the source's contents rather than
/// the directory itself.
#[derive(Debug, Clone)]
pub struct RsyncCopier {
    program: String,
    args: Vec<String>,
    show_output: bool,
}

impl RsyncCopier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            show_output: true,
        }
    }

    pub fn from_config(config: &CopyConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Discard the program's output instead of passing it through
    pub fn quiet(mut self) -> Self {
        self.show_output = false;
        self
    }

    /// Check if the program is installed and runnable
    pub fn check_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn command(&self, source: &Path, destination: &Path, exclusions: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(format!("--exclude-from={}", exclusions.display()))
            .arg(with_trailing_slash(source))
            .arg(with_trailing_slash(destination))
            .stdin(Stdio::null());

        if self.show_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }
}

impl Default for RsyncCopier {
    fn default() -> Self {
        Self::from_config(&CopyConfig::default())
    }
}

impl TreeCopier for RsyncCopier {
    fn name(&self) -> &str {
        &self.program
    }

    fn copy(&self, source: &Path, destination: &Path, exclusions: &Path) -> Result<(), CopyError> {
        let mut cmd = self.command(source, destination, exclusions);
        debug!(?cmd, "running copy program");

        let status = cmd.status().map_err(|source| CopyError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(CopyError::Failed {
                program: self.program.clone(),
                code: status.code(),
            });
        }

        info!("{} finished", self.program);
        Ok(())
    }
}

fn with_trailing_slash(path: &Path) -> String {
    let text = path.display().to_string();
    if text.ends_with('/') {
        text
    } else {
        format!("{text}/")
    }
}
