// Ordered mutating commands
//
// MegaCLI has no transactions. A plan runs its steps in order and stops at
// the first failure; steps that already ran stay applied and nothing is
// compensated.

use crate::tool::{display_command, ExitOutcome, ToolRunner};
use crate::{RaidError, RaidResult};

/// One mutating MegaCLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationStep {
    pub label: String,
    pub args: Vec<String>,
    /// Nonzero exit codes that still mean success for this command
    pub success_codes: Vec<i32>,
}

impl MutationStep {
    pub fn new(label: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            label: label.into(),
            args,
            success_codes: Vec::new(),
        }
    }

    /// Treat `code` as success for this step
    pub fn accept_code(mut self, code: i32) -> Self {
        self.success_codes.push(code);
        self
    }

    /// Map the raw outcome through this step's success codes
    pub fn interpret(&self, outcome: ExitOutcome) -> ExitOutcome {
        match outcome {
            ExitOutcome::Failed(code) if self.success_codes.contains(&code) => {
                tracing::warn!(
                    step = %self.label,
                    code,
                    "Treating known MegaCLI exit quirk as success"
                );
                ExitOutcome::Success
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationPlan {
    steps: Vec<MutationStep>,
}

impl MutationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: MutationStep) {
        self.steps.push(step);
    }

    pub fn with_step(mut self, step: MutationStep) -> Self {
        self.push(step);
        self
    }

    /// Run every step in order. Returns the number of steps applied.
    ///
    /// The first nonzero exit ends the plan with `MutationFailed` for that
    /// step; abnormal termination ends it with `ExecutionFailed`. Later
    /// steps are never run.
    pub fn execute<R: ToolRunner + ?Sized>(&self, runner: &R) -> RaidResult<usize> {
        for (index, step) in self.steps.iter().enumerate() {
            let output = runner.run(&step.args)?;

            match step.interpret(output.outcome) {
                ExitOutcome::Success => {
                    tracing::info!(step = %step.label, "Applied");
                }
                ExitOutcome::Failed(code) => {
                    tracing::warn!(
                        step = %step.label,
                        code,
                        skipped = self.steps.len() - index - 1,
                        "Mutation failed, remaining steps not run"
                    );
                    return Err(RaidError::MutationFailed {
                        step: step.label.clone(),
                        code,
                    });
                }
                ExitOutcome::Abnormal => {
                    return Err(RaidError::ExecutionFailed(format!(
                        "`{}` terminated abnormally during step {}",
                        display_command(&step.args),
                        step.label
                    )));
                }
            }
        }

        Ok(self.steps.len())
    }
}
