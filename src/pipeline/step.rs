//! Step domain model

use crate::error::DeployResult;

/// Per-step lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Not reached yet
    Pending,
    /// Action in progress
    Running,
    /// Action finished cleanly
    Succeeded,
    /// Action failed but the run continues
    Warned,
    /// Action failed and ended the run
    Failed,
    /// Checkpoint declined; action never ran
    Skipped,
}

impl StepState {
    /// Short glyph used in progress and summary output
    pub fn glyph(&self) -> &'static str {
        match self {
            StepState::Pending => "·",
            StepState::Running => "…",
            StepState::Succeeded => "✓",
            StepState::Warned => "⚠",
            StepState::Failed => "✗",
            StepState::Skipped => "-",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "pending",
            StepState::Running => "running",
            StepState::Succeeded => "succeeded",
            StepState::Warned => "warned",
            StepState::Failed => "failed",
            StepState::Skipped => "skipped",
        }
    }
}

/// Interactive gate asked before a step's action runs.
///
/// `default_accept` is the answer taken on empty input or when no terminal
/// is attached.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub prompt: String,
    pub default_accept: bool,
}

/// A single pipeline step: a label, a failure policy, and an action.
///
/// Actions print their own detail lines; the runner owns banners, outcome
/// glyphs, and all abort/continue decisions.
pub struct Step<'a> {
    pub label: String,
    /// Failure aborts the remainder of the run
    pub mandatory: bool,
    /// Asked before the action runs; declining skips the step
    pub checkpoint: Option<Checkpoint>,
    /// On mandatory failure, ask the operator whether to continue anyway
    pub recoverable: bool,
    pub state: StepState,
    pub(crate) action: Box<dyn FnMut() -> DeployResult<()> + 'a>,
}

impl<'a> Step<'a> {
    /// Step whose failure aborts the run
    pub fn mandatory(
        label: impl Into<String>,
        action: impl FnMut() -> DeployResult<()> + 'a,
    ) -> Self {
        Self {
            label: label.into(),
            mandatory: true,
            checkpoint: None,
            recoverable: false,
            state: StepState::Pending,
            action: Box::new(action),
        }
    }

    /// Step whose failure is reported but does not halt the run
    pub fn optional(
        label: impl Into<String>,
        action: impl FnMut() -> DeployResult<()> + 'a,
    ) -> Self {
        Self {
            label: label.into(),
            mandatory: false,
            checkpoint: None,
            recoverable: false,
            state: StepState::Pending,
            action: Box::new(action),
        }
    }

    /// Gate the step behind a yes/no confirmation
    pub fn with_checkpoint(mut self, prompt: impl Into<String>, default_accept: bool) -> Self {
        self.checkpoint = Some(Checkpoint {
            prompt: prompt.into(),
            default_accept,
        });
        self
    }

    /// Allow the operator to continue past a failure of this mandatory step
    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

impl std::fmt::Debug for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("label", &self.label)
            .field("mandatory", &self.mandatory)
            .field("checkpoint", &self.checkpoint)
            .field("recoverable", &self.recoverable)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
