//! External fuzzy-finder integration used by the `list` subcommand.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::task::RemoteTask;

#[derive(Debug, Error)]
pub enum FuzzyError {
    #[error("failed to launch {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program} I/O failed: {source}")]
    Io { program: String, source: io::Error },
}

/// An external program that reads candidate lines on stdin and prints the
/// chosen one on stdout.
#[derive(Debug, Clone)]
pub struct FuzzyFinder {
    program: String,
    args: Vec<String>,
}

impl Default for FuzzyFinder {
    fn default() -> Self {
        Self::new("fzf", Vec::<String>::new())
    }
}

impl FuzzyFinder {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Let the user pick one of `lines`. `None` means the pick was cancelled.
    pub fn select(&self, lines: &[String]) -> Result<Option<String>, FuzzyError> {
        let io_err = |source| FuzzyError::Io {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| FuzzyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = lines.join("\n");
            match stdin.write_all(input.as_bytes()) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(io_err(e)),
                _ => {}
            }
        }

        let output = child.wait_with_output().map_err(io_err)?;
        if !output.status.success() {
            debug!(status = ?output.status.code(), "selection cancelled");
            return Ok(None);
        }
        let choice = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!choice.is_empty()).then_some(choice))
    }
}

/// Candidate line for a task: `[<id>] <name>`.
pub fn task_line(task: &RemoteTask) -> String {
    format!("[{}] {}", task.id, task.name)
}

/// Extract the task id from a line produced by [`task_line`].
pub fn parse_task_id(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_line_round_trip() {
        let task = RemoteTask { id: "86abc".into(), name: "Fix [urgent] bug".into(), ..RemoteTask::default() };
        let line = task_line(&task);
        assert_eq!(line, "[86abc] Fix [urgent] bug");
        assert_eq!(parse_task_id(&line), Some("86abc"));
        assert_eq!(parse_task_id("no brackets"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_select_reads_program_output() {
        let finder = FuzzyFinder::new("head", ["-n", "1"]);
        let lines = vec!["[1] first".to_string(), "[2] second".to_string()];
        assert_eq!(finder.select(&lines).unwrap(), Some("[1] first".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_program_means_cancelled() {
        let finder = FuzzyFinder::new("false", Vec::<String>::new());
        assert_eq!(finder.select(&["x".to_string()]).unwrap(), None);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let finder = FuzzyFinder::new("clup-no-such-finder", Vec::<String>::new());
        assert!(matches!(finder.select(&[]), Err(FuzzyError::Spawn { .. })));
    }
}
