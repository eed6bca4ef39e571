use std::time::Duration;

use clap::Subcommand;
use pomocycle_core::storage::{
    AnalyticsSink, Config, Database, FileSettingsStore, NotificationsConfig, SettingsStore,
};
use pomocycle_core::{CompletedPhase, Event, Phase, PhaseCycleEngine, TickOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the cycle in the foreground, one JSON event per line.
    ///
    /// While running, stdin accepts: `p` pause/resume, `r` reset session,
    /// `R` reset cycle, `q` quit. During active recall any other line is
    /// submitted as the summary.
    Run {
        /// Milliseconds per timer second
        #[arg(long, default_value = "1000")]
        tick_ms: u64,
        /// Stop after this many completed phases
        #[arg(long)]
        max_phases: Option<u32>,
    },
    /// Print a fresh timer snapshot for the saved settings
    Status,
    /// Print the progress timeline for the saved settings
    Steps,
    /// Validate, apply and save new timer settings
    Apply {
        #[arg(long)]
        pomodoro: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        until_long_break: Option<u32>,
        #[arg(long)]
        active_recall: Option<bool>,
        #[arg(long)]
        recall_timed: Option<bool>,
        #[arg(long)]
        recall_duration: Option<u32>,
    },
}

fn emit(event: &Event) -> CliResult<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn load_engine(store: &FileSettingsStore) -> CliResult<PhaseCycleEngine> {
    Ok(PhaseCycleEngine::new(store.load_or_default()?)?)
}

pub fn run(action: TimerAction) -> CliResult<()> {
    let mut store = FileSettingsStore::open_default()?;

    match action {
        TimerAction::Run {
            tick_ms,
            max_phases,
        } => {
            let engine = load_engine(&store)?;
            let config = Config::read(store.path())?.unwrap_or_default();
            let mut db = Database::open()?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(drive(
                engine,
                &mut db,
                Duration::from_millis(tick_ms.max(1)),
                max_phases,
                &config,
            ));
            // A blocking stdin read cannot be cancelled.
            runtime.shutdown_background();
            result?;
        }
        TimerAction::Status => {
            let engine = load_engine(&store)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Steps => {
            let engine = load_engine(&store)?;
            let out = serde_json::json!({
                "steps": engine.progress_steps(),
                "current_step_index": engine.current_step_index(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        TimerAction::Apply {
            pomodoro,
            short_break,
            long_break,
            until_long_break,
            active_recall,
            recall_timed,
            recall_duration,
        } => {
            let mut engine = load_engine(&store)?;
            let mut settings = engine.settings().clone();
            if let Some(v) = pomodoro {
                settings.pomodoro_duration_min = v;
            }
            if let Some(v) = short_break {
                settings.short_break_duration_min = v;
            }
            if let Some(v) = long_break {
                settings.long_break_duration_min = v;
            }
            if let Some(v) = until_long_break {
                settings.pomodoros_until_long_break = v;
            }
            if let Some(v) = active_recall {
                settings.active_recall_enabled = v;
            }
            if let Some(v) = recall_timed {
                settings.active_recall_timed = v;
            }
            if let Some(v) = recall_duration {
                settings.active_recall_duration_min = v;
            }
            engine.apply_settings(settings)?;
            store.save(engine.settings())?;
            emit(&Event::settings_applied(engine.settings().clone()))?;
        }
    }
    Ok(())
}

/// Wall-clock driver: one `tick()` per interval, stdin for commands.
async fn drive(
    mut engine: PhaseCycleEngine,
    sink: &mut impl AnalyticsSink,
    period: Duration,
    max_phases: Option<u32>,
    config: &Config,
) -> CliResult<()> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut phases_done = 0u32;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    engine.toggle_running();
    emit(&engine.snapshot())?;
    emit(&Event::phase_started(engine.phase(), engine.phase_duration_secs()))?;

    loop {
        let ticking = engine.is_running() && engine.is_timed();
        if !stdin_open && !ticking {
            tracing::warn!(phase = %engine.phase(), "timer stalled with stdin closed, stopping");
            break;
        }

        let completed = tokio::select! {
            _ = interval.tick(), if ticking => Some(engine.tick()),
            line = lines.next_line(), if stdin_open => match line? {
                None => {
                    stdin_open = false;
                    None
                }
                Some(line) => match handle_line(&mut engine, line.trim())? {
                    LineResult::Quit => break,
                    LineResult::Resumed => {
                        interval.reset();
                        None
                    }
                    LineResult::Submitted(out) => Some(out),
                    LineResult::Handled => None,
                },
            },
            _ = &mut ctrl_c => break,
        };

        let Some(done) = completed.and_then(|out| out.completed) else {
            continue;
        };
        sink.record(&done);
        emit(&Event::phase_completed(
            &done,
            engine.state().completed_pomodoros_total,
        ))?;
        emit(&Event::phase_started(engine.phase(), engine.phase_duration_secs()))?;
        notify(&config.notifications, &done);

        phases_done += 1;
        if max_phases.is_some_and(|max| phases_done >= max) {
            break;
        }
        if !config.auto_start_next && engine.is_running() {
            engine.toggle_running();
            emit(&Event::timer_toggled(false, engine.remaining_secs()))?;
        }
        if engine.phase() == Phase::ActiveRecall {
            eprintln!(
                "Active recall: enter a summary on {}",
                engine.state().recall_topic
            );
        }
    }

    emit(&engine.snapshot())?;
    Ok(())
}

/// Phase-change notice on stderr, so stdout stays one JSON event per line.
fn notify(notifications: &NotificationsConfig, done: &CompletedPhase) {
    if !notifications.enabled {
        return;
    }
    let bell = if notifications.bell { "\x07" } else { "" };
    let next = if done.next_phase.is_break() {
        format!("time for a {}", done.next_phase.label().to_lowercase())
    } else {
        format!("{} starts now", done.next_phase.label())
    };
    eprintln!("{bell}{} complete, {next}", done.phase.label());
}

enum LineResult {
    Quit,
    Resumed,
    Submitted(TickOutcome),
    Handled,
}

fn handle_line(engine: &mut PhaseCycleEngine, line: &str) -> CliResult<LineResult> {
    if line == "q" {
        return Ok(LineResult::Quit);
    }

    if engine.phase() == Phase::ActiveRecall {
        engine.set_recall_draft(line);
        return match engine.submit_active_recall(line) {
            Ok(out) => {
                emit(&Event::recall_submitted(line))?;
                Ok(LineResult::Submitted(out))
            }
            Err(e) => {
                eprintln!("error: {e}");
                Ok(LineResult::Handled)
            }
        };
    }

    match line {
        "" | "p" => {
            let running = engine.toggle_running();
            emit(&Event::timer_toggled(running, engine.remaining_secs()))?;
            Ok(if running {
                LineResult::Resumed
            } else {
                LineResult::Handled
            })
        }
        "r" => {
            engine.reset_session();
            emit(&Event::session_reset(engine.phase(), engine.remaining_secs()))?;
            Ok(LineResult::Handled)
        }
        "R" => {
            engine.reset_cycle();
            emit(&Event::cycle_reset())?;
            Ok(LineResult::Handled)
        }
        other => {
            tracing::warn!(command = other, "unknown command");
            Ok(LineResult::Handled)
        }
    }
}
