//! shipwright CLI - deploy a Django project on shared hosting
//!
//! Usage: shipwright [OPTIONS]
//!
//! A single interactive run; everything is auto-detected or asked at two
//! checkpoints (migration apply, admin-account creation).

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use shipwright::config::{detect_username, ConfigFile, DeployConfig};
use shipwright::deploy::Deployment;
use shipwright::exec::ShellRunner;
use shipwright::pipeline::{DefaultsPrompter, Prompter, RunReport, TermPrompter};

const CONFIG_FILE: &str = "shipwright.toml";
const DEFAULT_PROJECT: &str = "myproject";
const DEFAULT_RUNTIME: &str = "3.10";

/// shipwright - deployment pipeline for Django projects on shared hosting
#[derive(Parser, Debug)]
#[command(name = "shipwright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project folder name (overrides shipwright.toml)
    #[arg(long)]
    project: Option<String>,

    /// Hosting account username (default: detected from the environment)
    #[arg(long)]
    username: Option<String>,

    /// Python runtime version, e.g. 3.10
    #[arg(long)]
    runtime: Option<String>,

    /// Accept every checkpoint default without prompting
    #[arg(short, long)]
    yes: bool,

    /// Machine-readable final summary; prompts resolve to their defaults
    #[arg(long)]
    json: bool,
}

fn main() {
    // An operating-system interrupt becomes a cancellation notice and a
    // nonzero exit, not a raw panic trace.
    let handler = ctrlc::set_handler(|| {
        eprintln!("\nDeployment cancelled by user");
        std::process::exit(1);
    });
    if let Err(e) = handler {
        eprintln!("warning: could not install interrupt handler: {e}");
    }

    match run() {
        Ok(report) if report.is_success() => std::process::exit(0),
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("✗ Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<RunReport> {
    let cli = Cli::parse();

    let invocation_dir = std::env::current_dir().context("cannot determine current directory")?;
    let home = dirs::home_dir().context("cannot determine home directory")?;

    let config = build_config(&cli, &invocation_dir)?;

    if !config.json {
        println!("==================================================");
        println!("  shipwright - automated deployment");
        println!("==================================================");
        println!();
        println!("Configuration:");
        println!("  Project:  {}", config.project_name);
        println!("  Username: {}", config.username);
        println!("  Runtime:  python {}", config.runtime_version);
        println!("  Host:     {}", config.host());
    }

    let runner = ShellRunner::new();
    let deployment = Deployment::resolve(&config, &runner, &invocation_dir, &home)?;

    let mut term = TermPrompter;
    let mut defaults = DefaultsPrompter;
    let prompter: &mut dyn Prompter = if config.assume_defaults || config.json {
        &mut defaults
    } else {
        &mut term
    };

    let report = deployment.execute(prompter);

    if config.json {
        print_json_summary(&config, &report);
    } else {
        print_summary(&config, &deployment, &report);
    }

    Ok(report)
}

fn build_config(cli: &Cli, invocation_dir: &Path) -> Result<DeployConfig> {
    let file = ConfigFile::load(&invocation_dir.join(CONFIG_FILE))
        .with_context(|| format!("malformed {CONFIG_FILE}"))?;

    Ok(DeployConfig {
        project_name: cli
            .project
            .clone()
            .or(file.project)
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
        username: cli
            .username
            .clone()
            .or(file.username)
            .unwrap_or_else(detect_username),
        runtime_version: cli
            .runtime
            .clone()
            .or(file.runtime)
            .unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
        assume_defaults: cli.yes,
        json: cli.json,
    })
}

fn print_json_summary(config: &DeployConfig, report: &RunReport) {
    let output = serde_json::json!({
        "event": "deploy",
        "status": if report.is_success() { "completed" } else { "aborted" },
        "host": config.host(),
        "warned": report.warned(),
        "steps": report
            .steps
            .iter()
            .map(|s| serde_json::json!({ "label": s.label, "state": s.state.as_str() }))
            .collect::<Vec<_>>(),
    });
    println!("{output}");
}

fn print_summary(config: &DeployConfig, deployment: &Deployment<'_>, report: &RunReport) {
    println!();
    if !report.is_success() {
        println!("✗ Deployment aborted");
        println!();
        for step in &report.steps {
            println!("  {} {}", step.state.glyph(), step.label);
        }
        return;
    }

    println!("==================================================");
    println!("  Deployment setup complete");
    println!("==================================================");
    println!();
    for step in &report.steps {
        println!("  {} {}", step.state.glyph(), step.label);
    }
    if report.warned() > 0 {
        println!();
        println!("⚠ {} step(s) finished with warnings", report.warned());
    }

    let root = deployment.layout().root.display();
    println!();
    println!("Next steps (manual, in the hosting dashboard):");
    println!("  1. Create a web app with manual configuration, Python {}", config.runtime_version);
    println!("  2. Copy the content of {root}/{} into the WSGI file", shipwright::descriptor::DESCRIPTOR_NAME);
    println!("  3. Map /static/ to {root}/staticfiles");
    println!("  4. Map /media/ to {root}/media (if used)");
    println!("  5. Reload the web app");
    println!();
    println!("The application will be served at https://{}", config.host());
}
