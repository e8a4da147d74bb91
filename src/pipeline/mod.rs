//! Sequential step pipeline with mandatory/optional failure semantics

pub mod runner;
pub mod step;

pub use runner::{DefaultsPrompter, Prompter, RunOutcome, RunReport, StepRunner, TermPrompter};
pub use step::{Checkpoint, Step, StepState};
