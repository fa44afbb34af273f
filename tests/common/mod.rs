//! Test environment for driving the treepick binary.
//!
//! `TestEnv` owns a temp directory holding the source tree, an empty config
//! home and room for destinations and job directories.

#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running the treepick CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Isolated environment with a sample source tree:
/// `src/{A/{a1(10), a2(20)}, b(5)}`
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let source = root.path().join("src");
        fs::create_dir_all(source.join("A")).unwrap();
        fs::write(source.join("A/a1"), vec![0u8; 10]).unwrap();
        fs::write(source.join("A/a2"), vec![0u8; 20]).unwrap();
        fs::write(source.join("b"), vec![0u8; 5]).unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        Self { root }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn source(&self) -> PathBuf {
        self.path("src")
    }

    /// Run treepick with the given arguments and extra environment
    pub fn run<I, S>(&self, args: I, env_vars: &[(&str, &str)]) -> TestResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_treepick"));
        cmd.current_dir(self.root.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("HOME", self.root.path())
            .env_remove("RUST_LOG")
            .env_remove("TREEPICK_COPY_PROGRAM")
            .env_remove("TREEPICK_COPY_ARGS")
            .env_remove("TREEPICK_ASCII");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        TestResult::from_output(cmd.output().expect("failed to execute treepick"))
    }
}
