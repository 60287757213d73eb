use super::*;
use crate::recorder::fake::FakeRecorder;
use anyhow::bail;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Directory listing backed by a shared set so tests can add files mid-session.
#[derive(Clone, Default)]
struct FakeNames {
    names: Arc<Mutex<HashSet<String>>>,
    fail: Arc<AtomicBool>,
}

impl FakeNames {
    fn with(items: &[&str]) -> Self {
        let fake = Self::default();
        for item in items {
            fake.insert(item);
        }
        fake
    }

    fn insert(&self, name: &str) {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string());
    }
}

impl NameSource for FakeNames {
    fn existing_names(&self) -> Result<HashSet<String>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("failed to list directory '/fake'");
        }
        Ok(self
            .names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }
}

fn session_with(recorder: &FakeRecorder, names: &FakeNames) -> Session {
    Session::new(Box::new(recorder.clone()), Box::new(names.clone()), ".mkv")
        .expect("session should build")
}

fn start(session: &mut Session) -> Tick {
    match session.toggle().expect("toggle start") {
        Toggle::Started { first_tick } => first_tick,
        other => panic!("expected start, got {other:?}"),
    }
}

fn advance(session: &mut Session, tick: Tick) -> Tick {
    match session.tick(tick) {
        TickOutcome::Advanced { next } => next,
        TickOutcome::Ignored => panic!("tick unexpectedly ignored"),
    }
}

#[test]
fn new_session_is_idle_with_first_free_label() {
    let recorder = FakeRecorder::new();
    let session = session_with(&recorder, &FakeNames::with(&["A.mkv", "notes.txt"]));
    let state = session.state();
    assert!(!state.is_running());
    assert_eq!(state.label(), "B.mkv");
    assert_eq!(state.frame_index(), 0);
    assert_eq!(state.elapsed(), Duration::ZERO);
    assert_eq!(session.extension(), ".mkv");
    assert!(recorder.log.launched().is_empty());
}

#[test]
fn listing_failure_is_fatal_at_construction() {
    let names = FakeNames::default();
    names.fail.store(true, Ordering::SeqCst);
    let result = Session::new(Box::new(FakeRecorder::new()), Box::new(names), ".mkv");
    assert!(result.is_err());
}

#[test]
fn end_to_end_start_tick_stop() {
    let names = FakeNames::default();
    let recorder = FakeRecorder::new().writing_into(Arc::clone(&names.names));
    let mut session = session_with(&recorder, &names);
    assert_eq!(session.state().label(), "A.mkv");

    let mut tick = start(&mut session);
    assert!(session.is_running());
    assert_eq!(session.state().frame_index(), 0);
    assert_eq!(session.state().elapsed(), Duration::ZERO);
    assert_eq!(recorder.log.launched(), vec!["A.mkv".to_string()]);

    for _ in 0..5 {
        tick = advance(&mut session, tick);
    }
    assert_eq!(session.state().elapsed(), Duration::from_secs(5));
    assert_eq!(session.state().frame_index(), 5);

    let outcome = session.toggle().expect("toggle stop");
    assert_eq!(
        outcome,
        Toggle::Stopped {
            exit: Some(ProcessExit { code: Some(0) })
        }
    );
    let state = session.state();
    assert!(!state.is_running());
    assert_eq!(state.elapsed(), Duration::ZERO);
    assert_eq!(state.frame_index(), 0);
    assert_eq!(state.label(), "B.mkv");
    assert_eq!(recorder.log.interrupts(), 1);
    assert_eq!(recorder.log.live(), 0);
}

#[test]
fn frame_index_wraps_after_nine() {
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &FakeNames::default());
    let mut tick = start(&mut session);

    let mut seen = Vec::new();
    for _ in 0..10 {
        tick = advance(&mut session, tick);
        seen.push(session.state().frame_index());
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
    assert_eq!(session.state().elapsed(), Duration::from_secs(10));
    session.shutdown();
}

#[test]
fn ticks_while_idle_are_ignored() {
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &FakeNames::default());
    let tick = start(&mut session);
    advance(&mut session, tick);
    session.toggle().expect("toggle stop");

    assert_eq!(session.tick(tick), TickOutcome::Ignored);
    assert_eq!(session.state().elapsed(), Duration::ZERO);
    assert_eq!(session.state().frame_index(), 0);
}

#[test]
fn stale_tick_from_previous_session_is_ignored() {
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &FakeNames::default());
    let old_tick = start(&mut session);
    session.toggle().expect("toggle stop");
    let new_tick = start(&mut session);

    assert_ne!(old_tick, new_tick);
    assert_eq!(session.tick(old_tick), TickOutcome::Ignored);
    assert_eq!(session.state().elapsed(), Duration::ZERO);
    advance(&mut session, new_tick);
    assert_eq!(session.state().elapsed(), Duration::from_secs(1));
    session.shutdown();
}

#[test]
fn toggling_never_overlaps_recorders() {
    let names = FakeNames::default();
    let recorder = FakeRecorder::new()
        .with_exit_delay(Duration::from_millis(20))
        .writing_into(Arc::clone(&names.names));
    let mut session = session_with(&recorder, &names);

    for _ in 0..4 {
        start(&mut session);
        assert_eq!(recorder.log.live(), 1);
        session.toggle().expect("toggle stop");
        // Stop returns only after the recorder finalized its file.
        assert_eq!(recorder.log.live(), 0);
    }
    assert_eq!(recorder.log.max_live(), 1);
    assert_eq!(recorder.log.exits(), 4);
    assert_eq!(
        recorder.log.launched(),
        vec!["A.mkv", "B.mkv", "C.mkv", "D.mkv"]
    );
    assert_eq!(session.state().label(), "E.mkv");
}

#[test]
fn launch_failure_is_reported_and_leaves_session_idle() {
    let recorder = FakeRecorder::failing();
    let mut session = session_with(&recorder, &FakeNames::default());
    let err = session.toggle().unwrap_err();
    assert!(format!("{err:#}").contains("failed to launch recorder"));
    assert!(!session.is_running());
    assert_eq!(session.state().label(), "A.mkv");
}

#[test]
fn listing_failure_after_stop_is_fatal_but_recorder_is_joined() {
    let names = FakeNames::default();
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &names);
    start(&mut session);
    names.fail.store(true, Ordering::SeqCst);

    assert!(session.toggle().is_err());
    assert!(!session.is_running());
    assert_eq!(recorder.log.live(), 0);
}

#[test]
fn recorder_crash_keeps_session_running_until_toggle() {
    let recorder = FakeRecorder::crashing();
    let mut session = session_with(&recorder, &FakeNames::default());
    let tick = start(&mut session);
    advance(&mut session, tick);
    assert!(session.is_running());

    let outcome = session.toggle().expect("toggle stop");
    assert_eq!(
        outcome,
        Toggle::Stopped {
            exit: Some(ProcessExit { code: Some(1) })
        }
    );
    assert!(!session.is_running());
}

#[test]
fn idle_is_reported_only_after_unpollable_recorder_exits() {
    let recorder = FakeRecorder::unpollable();
    let mut session = session_with(&recorder, &FakeNames::default());
    start(&mut session);

    session.toggle().expect("toggle stop");
    assert!(!session.is_running());
    assert_eq!(recorder.log.interrupts(), 1);
    assert_eq!(recorder.log.live(), 0);
}

#[test]
fn shutdown_interrupts_and_joins_active_recording() {
    let recorder = FakeRecorder::new().with_exit_delay(Duration::from_millis(20));
    let mut session = session_with(&recorder, &FakeNames::default());
    let tick = start(&mut session);
    advance(&mut session, tick);

    session.shutdown();
    assert!(!session.is_running());
    assert_eq!(recorder.log.interrupts(), 1);
    assert_eq!(recorder.log.live(), 0);
    // Exit keeps the label and display state untouched.
    assert_eq!(session.state().label(), "A.mkv");
    assert_eq!(session.state().elapsed(), Duration::from_secs(1));
}

#[test]
fn shutdown_when_idle_does_nothing() {
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &FakeNames::default());
    session.shutdown();
    assert_eq!(recorder.log.interrupts(), 0);
    assert!(recorder.log.launched().is_empty());
}

#[test]
fn dropping_a_running_session_joins_the_recorder() {
    let recorder = FakeRecorder::new();
    let mut session = session_with(&recorder, &FakeNames::default());
    start(&mut session);
    drop(session);
    assert_eq!(recorder.log.interrupts(), 1);
    assert_eq!(recorder.log.live(), 0);
}
