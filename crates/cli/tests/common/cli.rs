//! CLI command execution helpers with automatic timing
//!
//! This module provides a wrapper around the `stackview` binary that
//! measures execution time, isolates configuration per test and provides
//! convenient assertion methods.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// CLI command builder with timing
pub struct SvCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    stdin_data: Option<String>,
}

impl SvCommand {
    /// Create a new command in the given working directory
    ///
    /// The config file is pointed into the working directory so tests never
    /// read or write the real user configuration.
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let mut env = HashMap::new();
        env.insert(
            "STACKVIEW_CONFIG".to_string(),
            working_dir.join("config.toml").display().to_string(),
        );
        env.insert("NO_COLOR".to_string(), "1".to_string());

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_stackview")),
            working_dir,
            args: Vec::new(),
            env,
            stdin_data: None,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    #[allow(dead_code)]
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Provide stdin data
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = Some(data.to_string());
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = if let Some(stdin_str) = &self.stdin_data {
            let mut child = command
                .stdin(Stdio::piped())
                .spawn()
                .context("Failed to spawn command")?;

            if let Some(mut stdin) = child.stdin.take() {
                use std::io::Write;
                stdin.write_all(stdin_str.as_bytes())?;
            }

            child.wait_with_output().context("Failed to wait for command")?
        } else {
            command
                .stdin(Stdio::null())
                .output()
                .context("Failed to execute command")?
        };

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[allow(dead_code)]
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Branch label of every drawn row, skipping detail lines
    ///
    /// Row lines carry a node glyph; commit and file lines do not.
    pub fn row_labels(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter_map(|line| {
                let idx = line.find(['◯', '◉', '◌'])?;
                let rest = &line[idx..];
                let label = rest.split_once(' ').map(|(_, tail)| tail)?;
                Some(label.trim_start_matches(['─', '┘', '┴', '┤', '┼', '│', ' ']).to_string())
            })
            .collect()
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```
/// sv!(dir, "render", "--input", "stack.json").assert_success()?;
/// ```
#[macro_export]
macro_rules! sv {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::SvCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_labels() {
        let result = CommandResult {
            stdout: "◉   feature-2\n│     abc1234 wip\n│ ◯ feature-b\n◯─┘ main\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            duration: Duration::from_millis(10),
        };

        assert_eq!(result.row_labels(), vec!["feature-2", "feature-b", "main"]);
    }
}
