//! Integration tests for the phase-cycle engine.
//!
//! Drives full cycles second by second, the way a 1 Hz wall-clock driver
//! would, and checks the counters and phases at every boundary.

use pomocycle_core::{
    AnalyticsSink, MemoryAnalytics, Phase, PhaseCycleEngine, TickOutcome, TimerSettings,
    ValidationError,
};

fn classic() -> TimerSettings {
    TimerSettings {
        pomodoro_duration_min: 25,
        short_break_duration_min: 5,
        long_break_duration_min: 15,
        pomodoros_until_long_break: 4,
        active_recall_enabled: false,
        ..TimerSettings::default()
    }
}

fn started(settings: TimerSettings) -> PhaseCycleEngine {
    let mut engine = PhaseCycleEngine::new(settings).unwrap();
    engine.toggle_running();
    engine
}

/// Tick until the current phase completes, forwarding to `sink`.
fn finish_phase(engine: &mut PhaseCycleEngine, sink: &mut impl AnalyticsSink) -> TickOutcome {
    loop {
        let out = engine.tick();
        if let Some(done) = out.completed {
            sink.record(&done);
            return out;
        }
    }
}

#[test]
fn first_pomodoro_after_1500_ticks() {
    let mut engine = started(classic());
    assert_eq!(engine.phase(), Phase::Pomodoro);
    assert_eq!(engine.remaining_secs(), 1500);

    let mut out = engine.tick();
    for _ in 1..1500 {
        out = engine.tick();
    }

    assert_eq!(out.phase, Phase::ShortBreak);
    assert_eq!(engine.remaining_secs(), 300);
    assert_eq!(engine.state().pomodoro_count_in_cycle, 1);
    assert_eq!(engine.state().completed_pomodoros_total, 1);
}

#[test]
fn fourth_pomodoro_leads_to_long_break() {
    let mut engine = started(classic());
    let mut sink = MemoryAnalytics::new();

    for round in 1..=3 {
        let out = finish_phase(&mut engine, &mut sink);
        assert_eq!(out.phase, Phase::ShortBreak);
        assert_eq!(engine.state().pomodoro_count_in_cycle, round);
        let out = finish_phase(&mut engine, &mut sink);
        assert_eq!(out.phase, Phase::Pomodoro);
    }

    let out = finish_phase(&mut engine, &mut sink);
    assert_eq!(out.phase, Phase::LongBreak);
    assert_eq!(engine.remaining_secs(), 900);
    assert_eq!(engine.state().pomodoro_count_in_cycle, 0);
    assert_eq!(engine.state().completed_pomodoros_total, 4);

    assert_eq!(sink.count(Phase::Pomodoro), 4);
    assert_eq!(sink.count(Phase::ShortBreak), 3);
    assert_eq!(sink.minutes(Phase::Pomodoro), 100);
}

#[test]
fn cycle_repeats_after_long_break() {
    let mut engine = started(classic());
    let mut sink = MemoryAnalytics::new();

    // 4 pomodoros + 3 short breaks + 1 long break
    for _ in 0..8 {
        finish_phase(&mut engine, &mut sink);
    }
    assert_eq!(engine.phase(), Phase::Pomodoro);
    assert_eq!(engine.phase_title(), "Pomodoro 1 of 4");
    assert_eq!(engine.state().completed_pomodoros_total, 4);
    assert_eq!(sink.count(Phase::LongBreak), 1);

    finish_phase(&mut engine, &mut sink);
    assert_eq!(engine.state().completed_pomodoros_total, 5);
    assert_eq!(engine.phase(), Phase::ShortBreak);
}

#[test]
fn untimed_active_recall_flow() {
    let mut engine = started(TimerSettings {
        active_recall_enabled: true,
        active_recall_timed: false,
        ..classic()
    });
    let mut sink = MemoryAnalytics::new();

    for _ in 0..7 {
        finish_phase(&mut engine, &mut sink);
    }
    assert_eq!(engine.phase(), Phase::LongBreak);

    let out = finish_phase(&mut engine, &mut sink);
    assert_eq!(out.phase, Phase::ActiveRecall);
    assert_eq!(out.remaining_secs, 0);
    assert_eq!(engine.progress_fraction(), 0.0);
    assert_eq!(engine.current_step_index(), 8);

    assert_eq!(
        engine.submit_active_recall(""),
        Err(ValidationError::EmptyRecallSummary)
    );
    assert_eq!(engine.phase(), Phase::ActiveRecall);

    let out = engine.submit_active_recall("valid text").unwrap();
    assert_eq!(out.phase, Phase::Pomodoro);
    assert_eq!(engine.state().pomodoro_count_in_cycle, 0);
    assert_eq!(engine.remaining_secs(), 1500);
}

#[test]
fn pausing_mid_phase_freezes_countdown() {
    let mut engine = started(classic());
    for _ in 0..100 {
        engine.tick();
    }
    engine.toggle_running();
    for _ in 0..5000 {
        engine.tick();
    }
    assert_eq!(engine.phase(), Phase::Pomodoro);
    assert_eq!(engine.remaining_secs(), 1400);
}

#[test]
fn invalid_settings_keep_running_cycle() {
    let mut engine = started(classic());
    let mut sink = MemoryAnalytics::new();
    finish_phase(&mut engine, &mut sink);
    let state_before = engine.state().clone();

    let err = engine
        .apply_settings(TimerSettings {
            pomodoro_duration_min: 0,
            ..classic()
        })
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSettings { .. }));
    assert_eq!(engine.state(), &state_before);
    assert_eq!(engine.settings(), &classic());
}
