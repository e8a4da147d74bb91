//! Failure-policy scenarios: mandatory aborts, optional warns, operator
//! decides after a failed migration apply.

use crate::common::*;
use shipwright::deploy::Deployment;
use shipwright::descriptor::DESCRIPTOR_NAME;
use shipwright::exec::Invocation;
use shipwright::pipeline::{DefaultsPrompter, RunOutcome, StepState};

fn behavior_failing_on(needle: &'static str) -> impl Fn(&Invocation) -> shipwright::ExecOutput {
    move |invocation| {
        let line = invocation.display_line();
        if line.contains(needle) {
            failed_output("simulated failure")
        } else {
            healthy_behavior(invocation)
        }
    }
}

#[test]
fn failed_dependency_install_aborts_before_any_mutation() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(behavior_failing_on("install -r"));

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    let mut prompter = DefaultsPrompter;
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Aborted);
    // Settings untouched, descriptor never generated.
    assert_eq!(block_count(&fixture.settings_content()), 0);
    assert!(!fixture.work.join(DESCRIPTOR_NAME).exists());
    // Everything after the failed step stayed pending.
    let failed_idx = report
        .steps
        .iter()
        .position(|s| s.state == StepState::Failed)
        .unwrap();
    assert!(report.steps[failed_idx + 1..]
        .iter()
        .all(|s| s.state == StepState::Pending));
}

#[test]
fn failed_migration_declined_continue_aborts_run() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(behavior_failing_on("migrate --noinput"));

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    // Accept the migration checkpoint, decline continuing past the failure.
    let mut prompter = Script::new(&[true, false]);
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Aborted);
    assert!(!runner.called_with("collectstatic"));
    assert!(!fixture.work.join(DESCRIPTOR_NAME).exists());

    let apply = report
        .steps
        .iter()
        .find(|s| s.label.contains("Applying database migrations"))
        .unwrap();
    assert_eq!(apply.state, StepState::Failed);
}

#[test]
fn failed_migration_accepted_continue_completes_with_warning() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(behavior_failing_on("migrate --noinput"));

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    // Accept the checkpoint, accept continuing, skip the admin account.
    let mut prompter = Script::new(&[true, true, false]);
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(runner.called_with("collectstatic"));
    assert!(fixture.work.join(DESCRIPTOR_NAME).exists());

    let apply = report
        .steps
        .iter()
        .find(|s| s.label.contains("Applying database migrations"))
        .unwrap();
    assert_eq!(apply.state, StepState::Warned);
}

#[test]
fn failed_static_collection_warns_and_completes() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(behavior_failing_on("collectstatic"));

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    let mut prompter = DefaultsPrompter;
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    let collect = report
        .steps
        .iter()
        .find(|s| s.label.contains("Collecting static files"))
        .unwrap();
    assert_eq!(collect.state, StepState::Warned);
    // The run still finished: descriptor exists.
    assert!(fixture.work.join(DESCRIPTOR_NAME).exists());
}

#[test]
fn failed_database_probe_does_not_stop_the_run() {
    let fixture = ProjectFixture::new();
    let config = fixture.config();
    let runner = FakeRunner::new(behavior_failing_on("check --database"));

    let deployment =
        Deployment::resolve(&config, &runner, &fixture.work, &fixture.home).unwrap();
    let mut prompter = DefaultsPrompter;
    let report = deployment.execute(&mut prompter);

    assert_eq!(report.outcome, RunOutcome::Completed);
    let probe = report
        .steps
        .iter()
        .find(|s| s.label.contains("Checking database connection"))
        .unwrap();
    assert_eq!(probe.state, StepState::Warned);
}
