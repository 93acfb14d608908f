//! prun — run shell commands through the parallel runner and report each
//! command's result in the order given.

use clap::Parser;
use parallel_runner::config::{RunnerConfig, with_limit, with_ticket};
use parallel_runner::telemetry::{TelemetryConfig, init_telemetry};
use parallel_runner::{Outcome, Runner};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "prun", about = "Run shell commands in parallel, report results in order")]
struct Cli {
    /// Maximum commands running at once
    #[arg(long)]
    limit: Option<usize>,
    /// Maximum commands started per second
    #[arg(long)]
    ticket: Option<usize>,
    /// TOML file with a [runner] table
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run commands one at a time, in order
    #[arg(long)]
    serial: bool,
    /// Print one JSON object per command
    #[arg(long)]
    json: bool,
    /// Commands to run, each passed to `sh -c`
    #[arg(required = true, num_args = 1..)]
    commands: Vec<String>,
}

/// What a successful command produced.
#[derive(Debug)]
struct CommandOutput {
    stdout: String,
}

/// One line of the report.
#[derive(Debug, Serialize)]
struct Report<'a> {
    index: usize,
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _guard = init_telemetry(TelemetryConfig::from_env("prun"))?;

    let config = runner_config(&cli)?;
    let mut runner: Runner<CommandOutput, String> = Runner::with_config(config);
    for command in &cli.commands {
        let command = command.clone();
        runner.add(move || run_command(&command));
    }

    let outcomes = if cli.serial {
        tokio::task::spawn_blocking(move || runner.run_serial()).await?
    } else {
        runner.run().await
    };

    let failed = print_report(&cli, &outcomes)?;
    if failed > 0 {
        anyhow::bail!("{failed} of {} commands failed", outcomes.len());
    }
    Ok(())
}

/// File, then environment, then flags; later sources win.
fn runner_config(cli: &Cli) -> anyhow::Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    config = config.merge(RunnerConfig::from_env()?);
    if let Some(n) = cli.limit {
        config.apply(with_limit(n))?;
    }
    if let Some(n) = cli.ticket {
        config.apply(with_ticket(n))?;
    }
    Ok(config)
}

fn run_command(command: &str) -> Outcome<CommandOutput, String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| format!("failed to spawn: {e}"))?;

    if output.status.success() {
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        })
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("{}: {}", output.status, stderr.trim_end()))
    }
}

fn print_report(cli: &Cli, outcomes: &[Outcome<CommandOutput, String>]) -> anyhow::Result<usize> {
    let mut failed = 0;
    for (index, (command, outcome)) in cli.commands.iter().zip(outcomes).enumerate() {
        let report = match outcome {
            Ok(output) => Report {
                index,
                command,
                ok: true,
                stdout: Some(output.stdout.as_str()),
                error: None,
            },
            Err(error) => {
                failed += 1;
                Report {
                    index,
                    command,
                    ok: false,
                    stdout: None,
                    error: Some(error.as_str()),
                }
            }
        };

        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else if let Some(error) = report.error {
            println!("[{index}] {command}\n  error: {error}");
        } else {
            println!("[{index}] {command}\n{}", report.stdout.unwrap_or_default());
        }
    }
    Ok(failed)
}
