// MegaCLI process execution
//
// Spawns the tool, captures its output as lines and normalises the exit
// status. Each call owns its child process; `Command::output` waits for it
// and reaps it on every path before returning.

use crate::{RaidError, RaidResult};
use std::process::{Command, ExitStatus, Stdio};

/// Normalised exit of one tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Normal exit with a nonzero code
    Failed(i32),
    /// Killed by a signal or otherwise not a normal exit
    Abnormal,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failed(code)
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::from_code(code),
            None => ExitOutcome::Abnormal,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }
}

/// How a call site interprets the exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Any nonzero exit fails the query
    Strict,
    /// The exit code carries payload (`-adpCount`, `-LDGetNum`) and is not
    /// an error signal
    IgnoreExit,
}

impl ExitPolicy {
    /// Apply the policy to a finished query. Abnormal termination fails
    /// under both policies.
    pub fn check(&self, command: &str, outcome: ExitOutcome) -> RaidResult<()> {
        match (self, outcome) {
            (_, ExitOutcome::Abnormal) => Err(RaidError::ExecutionFailed(format!(
                "`{}` terminated abnormally",
                command
            ))),
            (ExitPolicy::IgnoreExit, _) | (ExitPolicy::Strict, ExitOutcome::Success) => Ok(()),
            (ExitPolicy::Strict, ExitOutcome::Failed(code)) => Err(RaidError::QueryFailed {
                command: command.to_string(),
                code,
            }),
        }
    }
}

/// Captured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// stdout lines followed by stderr lines, without line terminators
    pub lines: Vec<String>,
    pub outcome: ExitOutcome,
}

impl ToolOutput {
    pub fn new(text: &str, outcome: ExitOutcome) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            outcome,
        }
    }

    pub fn success(text: &str) -> Self {
        Self::new(text, ExitOutcome::Success)
    }

    pub fn failed(text: &str, code: i32) -> Self {
        Self::new(text, ExitOutcome::from_code(code))
    }
}

/// Seam between the parsing layer and the real MegaCLI binary
#[cfg_attr(test, mockall::automock)]
pub trait ToolRunner {
    /// Run the tool with `args` and capture its output. Fails only when
    /// the process cannot be spawned; exit status is reported in the
    /// returned [`ToolOutput`].
    fn run(&self, args: &[String]) -> RaidResult<ToolOutput>;
}

/// Runs the configured MegaCLI binary through [`std::process::Command`]
#[derive(Debug, Clone)]
pub struct SystemRunner {
    binary: String,
    extra_args: Vec<String>,
}

impl SystemRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn from_config(config: &crate::ToolConfig) -> Self {
        Self::new(config.binary.clone()).with_extra_args(config.extra_args.clone())
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, args: &[String]) -> RaidResult<ToolOutput> {
        tracing::debug!(binary = %self.binary, args = ?args, "Running MegaCLI");

        let output = Command::new(&self.binary)
            .args(args)
            .args(&self.extra_args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                RaidError::ExecutionFailed(format!("failed to spawn {}: {}", self.binary, e))
            })?;

        let outcome = ExitOutcome::from_status(output.status);
        if outcome == ExitOutcome::Abnormal {
            tracing::warn!(
                binary = %self.binary,
                signal = %describe_signal(output.status),
                "MegaCLI terminated abnormally"
            );
        } else {
            tracing::debug!(outcome = ?outcome, "MegaCLI exited");
        }

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string),
        );

        Ok(ToolOutput { lines, outcome })
    }
}

#[cfg(unix)]
fn describe_signal(status: ExitStatus) -> String {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(raw) => match Signal::try_from(raw) {
            Ok(signal) => signal.as_str().to_string(),
            Err(_) => format!("signal {}", raw),
        },
        None => "unknown".to_string(),
    }
}

#[cfg(not(unix))]
fn describe_signal(_status: ExitStatus) -> String {
    "unknown".to_string()
}

/// Render an argument list the way it would be typed, for errors and logs
pub fn display_command(args: &[String]) -> String {
    args.join(" ")
}
