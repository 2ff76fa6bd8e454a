//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a command and return trimmed stdout.
///
/// Failures are reported as `vcs.command_failed` under `tool`, with stderr
/// (or stdout when stderr is empty) as the cause.
pub fn run(tool: &str, program: &str, args: &[&str]) -> Result<String> {
    execute(tool, Command::new(program).args(args), program, args)
}

/// Run a command in a specific directory.
pub fn run_in(dir: &Path, tool: &str, program: &str, args: &[&str]) -> Result<String> {
    execute(
        tool,
        Command::new(program).args(args).current_dir(dir),
        program,
        args,
    )
}

/// Run a command in a directory, returning None on failure instead of error.
pub fn run_in_optional(dir: &Path, program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

fn execute(tool: &str, command: &mut Command, program: &str, args: &[&str]) -> Result<String> {
    let display = display_command(program, args);
    let output = command
        .output()
        .map_err(|e| Error::vcs_command_failed(tool, &display, e.to_string()))?;

    if !output.status.success() {
        return Err(Error::vcs_command_failed(tool, &display, error_text(&output)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn run_succeeds_with_valid_command() {
        let result = run("shell", "echo", &["hello"]);
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn missing_program_is_command_failure() {
        let err = run("git", "nonexistent_command_xyz", &["clone"]).unwrap_err();
        assert_eq!(err.code, ErrorCode::VcsCommandFailed);
        assert_eq!(err.details["vcs"], "git");
        assert_eq!(err.details["command"], "nonexistent_command_xyz clone");
    }

    #[test]
    fn run_in_optional_returns_none_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_in_optional(dir.path(), "false", &[]).is_none());
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = Output {
            status: std::process::ExitStatus::default(),
            stdout: b"stdout content".to_vec(),
            stderr: b"stderr content".to_vec(),
        };
        assert_eq!(error_text(&output), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = Output {
            status: std::process::ExitStatus::default(),
            stdout: b"stdout content".to_vec(),
            stderr: b"".to_vec(),
        };
        assert_eq!(error_text(&output), "stdout content");
    }
}
