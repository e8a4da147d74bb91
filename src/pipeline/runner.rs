//! Step runner
//!
//! Drives an ordered list of steps to a terminal pipeline state. The runner
//! holds exclusive authority over abort/continue decisions; steps only
//! report success or failure.

use is_terminal::IsTerminal;

use crate::pipeline::step::{Step, StepState};

/// Terminal pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step reached a terminal state without a fatal failure
    Completed,
    /// A mandatory step failed; later steps never left `Pending`
    Aborted,
}

/// Label and terminal state of one step, for the end-of-run summary
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub label: String,
    pub state: StepState,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn warned(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::Warned)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Injectable confirmation capability.
///
/// Keeping the decision behind a trait lets the runner execute headlessly
/// under test with a scripted responder.
pub trait Prompter {
    /// Ask a yes/no question; `default` is the answer on empty input.
    fn confirm(&mut self, prompt: &str, default: bool) -> bool;
}

/// Prompts on the attached terminal. Without a terminal on stdin every
/// question resolves to its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> bool {
        if !std::io::stdin().is_terminal() {
            return default;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .unwrap_or(default)
    }
}

/// Answers every question with its default. Used for `--yes` and `--json`
/// runs where prompting would break machine consumption.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn confirm(&mut self, _prompt: &str, default: bool) -> bool {
        default
    }
}

/// Executes steps strictly in declared order
pub struct StepRunner<'p> {
    prompter: &'p mut dyn Prompter,
    quiet: bool,
}

impl<'p> StepRunner<'p> {
    pub fn new(prompter: &'p mut dyn Prompter) -> Self {
        Self {
            prompter,
            quiet: false,
        }
    }

    /// Suppress banners and outcome lines (machine-readable runs)
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Run every step, stopping after the first unrecovered mandatory
    /// failure. Steps after an abort stay `Pending`.
    pub fn run(&mut self, steps: &mut [Step<'_>]) -> RunReport {
        let total = steps.len();
        let mut outcome = RunOutcome::Completed;

        for (idx, step) in steps.iter_mut().enumerate() {
            if outcome == RunOutcome::Aborted {
                break;
            }

            if !self.quiet {
                println!("\n[{}/{}] {}...", idx + 1, total, step.label);
            }
            step.state = StepState::Running;

            if let Some(checkpoint) = &step.checkpoint {
                if !self
                    .prompter
                    .confirm(&checkpoint.prompt, checkpoint.default_accept)
                {
                    step.state = StepState::Skipped;
                    if !self.quiet {
                        println!("- skipped: {}", step.label);
                    }
                    continue;
                }
            }

            match (step.action)() {
                Ok(()) => {
                    step.state = StepState::Succeeded;
                    if !self.quiet {
                        println!("✓ {}", step.label);
                    }
                }
                Err(err) => {
                    if !self.quiet {
                        eprintln!("✗ {}: {err}", step.label);
                    }

                    let continue_anyway = if !step.mandatory {
                        true
                    } else if step.recoverable {
                        self.prompter
                            .confirm("Continue despite the failure?", false)
                    } else {
                        false
                    };

                    if continue_anyway {
                        step.state = StepState::Warned;
                        if !self.quiet {
                            println!("⚠ continuing past failed step: {}", step.label);
                        }
                    } else {
                        step.state = StepState::Failed;
                        outcome = RunOutcome::Aborted;
                    }
                }
            }
        }

        RunReport {
            outcome,
            steps: steps
                .iter()
                .map(|s| StepRecord {
                    label: s.label.clone(),
                    state: s.state,
                })
                .collect(),
        }
    }
}
