//! Happy-path deployment: every command succeeds, checkpoint defaults
//! accepted.

use crate::common::*;
use shipwright::deploy::Deployment;
use shipwright::descriptor::DESCRIPTOR_NAME;
use shipwright::pipeline::{DefaultsPrompter, RunOutcome, StepState};

#[test]
fn full_run_completes_and_produces_artifacts() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(healthy_behavior);

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    let mut prompter = DefaultsPrompter;
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(report
        .steps
        .iter()
        .all(|s| s.state != StepState::Failed && s.state != StepState::Pending));

    // Settings patched exactly once
    let settings = fixture.settings_content();
    assert_eq!(block_count(&settings), 1);
    assert!(settings.contains("alice.pythonanywhere.com"));
    assert!(settings.starts_with(BASE_SETTINGS.trim_end()));

    // Descriptor generated in the project root
    let descriptor = fixture.work.join(DESCRIPTOR_NAME);
    assert_file_contains(&descriptor, "backend.settings");
    assert_file_contains(&descriptor, &fixture.work.display().to_string());

    // Migrations applied; admin-account creation skipped by default
    assert!(runner.called_with("migrate --noinput"));
    assert!(runner.called_with("collectstatic --noinput"));
    assert!(!runner.called_with("createsuperuser"));
}

#[test]
fn second_run_is_idempotent() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(healthy_behavior);

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    let mut prompter = DefaultsPrompter;

    deployment.execute(&mut prompter);
    let first = fixture.settings_content();
    deployment.execute(&mut prompter);
    let second = fixture.settings_content();

    assert_eq!(first, second);
    assert_eq!(block_count(&second), 1);
}

#[test]
fn admin_account_checkpoint_accepted_runs_subprocess() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(healthy_behavior);

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    // Migration checkpoint accepted, admin-account checkpoint accepted.
    let mut prompter = Script::new(&[true, true]);
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(runner.called_with("createsuperuser"));
}

#[test]
fn migration_checkpoint_declined_skips_apply() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(healthy_behavior);

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    // Decline migrations, decline admin account.
    let mut prompter = Script::new(&[false, false]);
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(!runner.called_with("migrate --noinput"));
    let apply = report
        .steps
        .iter()
        .find(|s| s.label.contains("Applying database migrations"))
        .unwrap();
    assert_eq!(apply.state, StepState::Skipped);
}
