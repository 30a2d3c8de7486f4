//! Guided skill-practice coach.
//!
//! Validates step plans and runs scripted practice attempts against the
//! step-validation engine, journaling every remote call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use skillcoach::attempt::{AttemptError, AttemptLifecycleManager};
use skillcoach::core::action_monitor::ActionMonitor;
use skillcoach::exit_codes;
use skillcoach::io::config::load_config;
use skillcoach::io::journal::JournalService;
use skillcoach::io::plan::load_plan;
use skillcoach::io::script::{Timeline, load_script};
use skillcoach::io::telemetry::TelemetryReporter;
use skillcoach::logging;
use skillcoach::sequencer::StepView;
use skillcoach::session::{
    SessionError, SessionOptions, SessionOutcome, SessionRequest, SessionStop, run_session,
};

const DEFAULT_CONFIG: &str = "coach.toml";

#[derive(Parser)]
#[command(name = "coach", version, about = "Step-validation coach for guided skill practice")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a step plan against the schema, invariants and action catalog.
    Validate {
        #[arg(long)]
        plan: PathBuf,
        /// Engine config (TOML). Defaults apply when the file is missing.
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Run one attempt, driving actions from a scripted press timeline.
    Run {
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        script: PathBuf,
        /// JSONL file receiving every remote call.
        #[arg(long)]
        journal: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        #[arg(long, default_value = "local")]
        subject: String,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { plan, config } => cmd_validate(&plan, &config),
        Command::Run {
            plan,
            script,
            journal,
            config,
            subject,
        } => cmd_run(&plan, &script, &journal, &config, subject),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let backend_down = matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::Attempt(AttemptError::BackendUnavailable { .. }))
    );
    if backend_down {
        exit_codes::BACKEND_UNAVAILABLE
    } else {
        exit_codes::INVALID
    }
}

fn cmd_validate(plan_path: &Path, config_path: &Path) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let plan = load_plan(plan_path, &cfg.action_names())?;
    println!("ok: {} ({} steps)", plan.skill_id, plan.steps.len());
    Ok(exit_codes::OK)
}

fn cmd_run(
    plan_path: &Path,
    script_path: &Path,
    journal_path: &Path,
    config_path: &Path,
    subject_id: String,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let known = cfg.action_names();
    let plan = load_plan(plan_path, &known)?;
    let script = load_script(script_path, &known)?;
    let options = SessionOptions::from_config(&cfg);
    let request = SessionRequest {
        subject_id,
        skill_id: plan.skill_id,
        steps: plan.steps,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let outcome = runtime.block_on(async {
        let service = Arc::new(JournalService::new(journal_path));
        let (reporter, worker) = TelemetryReporter::spawn(service.clone(), None);
        let mut manager =
            AttemptLifecycleManager::new(service, reporter.clone(), cfg.start_timeout());

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });

        let (view_tx, view_rx) = watch::channel(StepView::default());
        let printer = tokio::spawn(print_views(view_rx));

        let monitor = ActionMonitor::new(cfg.known_actions(), Timeline::starting_now(script));
        let result = run_session(
            &mut manager,
            request,
            monitor,
            &options,
            &cancel,
            Some(&view_tx),
        )
        .await;

        drop(view_tx);
        let _ = printer.await;
        reporter.flush().await;
        drop(manager);
        drop(reporter);
        worker.join().await;
        result
    })?;

    print_outcome(&outcome);
    Ok(match outcome.stop {
        SessionStop::Finished(ref finished) if finished.is_success() => exit_codes::OK,
        SessionStop::Finished(_) => exit_codes::FAILED,
        SessionStop::Cancelled { .. } => exit_codes::CANCELLED,
    })
}

/// Print the instruction when the step changes and every new feedback line.
async fn print_views(mut rx: watch::Receiver<StepView>) {
    let mut last_step = None;
    let mut last_feedback = String::new();
    while rx.changed().await.is_ok() {
        let view = rx.borrow_and_update().clone();
        if !view.feedback.is_empty() && view.feedback != last_feedback {
            println!("{}", view.feedback);
            last_feedback = view.feedback.clone();
        }
        if view.step_number != last_step {
            if let Some(number) = view.step_number {
                println!(
                    "[{}/{}] {} ({})",
                    number, view.total_steps, view.instruction, view.input_hint
                );
                if let Some(cue) = &view.cue {
                    println!("      {}", cue);
                }
            }
            last_step = view.step_number;
        }
    }
    debug!("view publisher closed");
}

fn print_outcome(outcome: &SessionOutcome) {
    let result = match &outcome.stop {
        SessionStop::Finished(finished) if finished.is_success() => "completed".to_string(),
        SessionStop::Finished(finished) => format!("failed ({:?})", finished),
        SessionStop::Cancelled { step_number } => match step_number {
            Some(step) => format!("cancelled at step {}", step),
            None => "cancelled".to_string(),
        },
    };
    println!(
        "attempt {} {}: {} steps completed, {} errors",
        outcome.attempt.id(),
        result,
        outcome.steps_completed,
        outcome.errors_count
    );
}
