#![allow(dead_code)]

pub mod fixtures;
pub mod sources;

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Helper struct to run pagewise commands with an isolated config file
pub struct PagewiseTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl PagewiseTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        PagewiseTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_pagewise"),
        }
    }

    /// Path the binary is told to read its config from
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("PAGEWISE_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("PAGEWISE_LOG")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute pagewise command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config file");
    }
}

impl Default for PagewiseTest {
    fn default() -> Self {
        Self::new()
    }
}
