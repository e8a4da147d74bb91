//! shipwright - interactive deployment pipeline for Django projects on
//! shared hosting
//!
//! One run auto-detects the project layout, installs dependencies into a
//! virtual environment, patches an idempotent production-settings block,
//! applies schema migrations behind an interactive checkpoint, collects
//! static assets, and generates the WSGI entry-point descriptor the hosting
//! platform starts the application from.

pub mod config;
pub mod deploy;
pub mod descriptor;
pub mod error;
pub mod exec;
pub mod layout;
pub mod pipeline;
pub mod settings;

// Re-exports for convenience
pub use config::{ConfigFile, DeployConfig};
pub use deploy::Deployment;
pub use error::{DeployError, DeployResult};
pub use exec::{CommandRunner, ExecOutput, Invocation, ShellRunner};
pub use layout::{Candidate, ProjectLayout};
pub use pipeline::{DefaultsPrompter, Prompter, RunOutcome, RunReport, Step, StepRunner, TermPrompter};
pub use settings::{ProductionBlock, BLOCK_BEGIN, BLOCK_END};
