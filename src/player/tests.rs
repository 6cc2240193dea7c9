use super::state::Player;
use super::*;
use crate::audio::testing::{EngineCall, SharedLog, ScriptedEngine, engine_log};
use crate::config::BoundaryPolicy;
use crate::library::fixtures;
use proptest::prelude::*;

fn player(titles: &[&str], boundary: BoundaryPolicy) -> (Player, SharedLog) {
    let log = engine_log();
    let p = Player::new(
        fixtures::store(titles),
        Box::new(ScriptedEngine::new(log.clone())),
        boundary,
        "test.now-playing".to_string(),
    );
    (p, log)
}

fn abc() -> (Player, SharedLog) {
    player(&["A", "B", "C"], BoundaryPolicy::Wrap)
}

fn at(index: usize, status: PlaybackStatus) -> Snapshot {
    Snapshot { index, status }
}

fn loads(log: &SharedLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .calls
        .iter()
        .filter_map(|c| match c {
            EngineCall::Load(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn starts_idle_at_first_track() {
    let (p, log) = abc();
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Idle));
    assert!(log.lock().unwrap().calls.is_empty());
}

#[test]
fn play_wrap_pause_then_previous_from_idle() {
    let (mut p, log) = abc();

    let np = p.play().unwrap().expect("first play announces A");
    assert_eq!(np.index, 0);
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));

    assert_eq!(p.next().unwrap().map(|n| n.index), Some(1));
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
    assert_eq!(p.next().unwrap().map(|n| n.index), Some(2));
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
    assert_eq!(p.next().unwrap().map(|n| n.index), Some(0));
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));

    assert!(p.pause().unwrap().is_none());
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Paused));

    let np = p.previous().unwrap().expect("leaving pause for C announces it");
    assert_eq!(np.index, 2);
    assert_eq!(np.title, "C");
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
    assert!(log.lock().unwrap().playing);

    assert!(matches!(
        p.select_by_index(-1),
        Err(PlayerError::OutOfRange { index: -1, len: 3 })
    ));
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
    assert_eq!(loads(&log), ["A", "B", "C", "A", "C"]);
}

#[test]
fn select_then_step_through_playlist() {
    let (mut p, log) = abc();

    let np = p.select_by_index(1).unwrap().expect("announces B");
    assert_eq!(np.index, 1);
    assert_eq!(np.title, "B");
    assert_eq!(np.comment, "about B");
    assert_eq!(np.notification_id, "test.now-playing");
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));

    p.next().unwrap();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));

    p.next().unwrap();
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));

    p.previous().unwrap();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));

    assert_eq!(loads(&log), ["B", "C", "A", "C"]);
    assert!(log.lock().unwrap().playing);
}

#[test]
fn previous_from_first_wraps_to_last() {
    let (mut p, _log) = abc();
    p.previous().unwrap();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
}

#[test]
fn select_out_of_range_leaves_state_alone() {
    let (mut p, log) = abc();
    p.select_by_index(2).unwrap();
    let calls_before = log.lock().unwrap().calls.len();

    for bad in [-1, 3, 100, i64::MIN] {
        match p.select_by_index(bad) {
            Err(PlayerError::OutOfRange { index, len }) => {
                assert_eq!(index, bad);
                assert_eq!(len, 3);
            }
            other => panic!("expected OutOfRange for {bad}, got {other:?}"),
        }
    }
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
    assert_eq!(log.lock().unwrap().calls.len(), calls_before);
}

#[test]
fn play_from_idle_loads_current_track() {
    let (mut p, log) = abc();
    let np = p.play().unwrap().expect("first play announces");
    assert_eq!(np.index, 0);
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));
    assert_eq!(loads(&log), ["A"]);
}

#[test]
fn play_while_playing_is_a_no_op() {
    let (mut p, log) = abc();
    p.select_by_index(1).unwrap();
    let calls_before = log.lock().unwrap().calls.len();

    assert!(p.play().unwrap().is_none());
    assert!(p.play().unwrap().is_none());
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
    assert_eq!(log.lock().unwrap().calls.len(), calls_before);
}

#[test]
fn pause_then_play_resumes_without_reloading() {
    let (mut p, log) = abc();
    p.select_by_index(1).unwrap();

    p.pause().unwrap();
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Paused));
    assert!(!log.lock().unwrap().playing);

    assert!(p.play().unwrap().is_none());
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
    assert_eq!(loads(&log), ["B"]);
    assert_eq!(log.lock().unwrap().calls.last(), Some(&EngineCall::Start));
}

#[test]
fn pause_requires_playing() {
    let (mut p, _log) = abc();
    assert!(matches!(
        p.pause(),
        Err(PlayerError::InvalidTransition {
            action: "pause",
            status: PlaybackStatus::Idle
        })
    ));

    p.play().unwrap();
    p.pause().unwrap();
    assert!(matches!(
        p.pause(),
        Err(PlayerError::InvalidTransition {
            status: PlaybackStatus::Paused,
            ..
        })
    ));
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Paused));
}

#[test]
fn stop_works_from_every_status() {
    let (mut p, log) = abc();

    p.stop();
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Stopped));

    p.select_by_index(2).unwrap();
    p.stop();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Stopped));
    assert!(!log.lock().unwrap().playing);

    p.play().unwrap();
    p.pause().unwrap();
    p.stop();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Stopped));

    p.stop();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Stopped));
}

#[test]
fn play_after_stop_reloads_and_reannounces() {
    let (mut p, log) = abc();
    p.select_by_index(1).unwrap();
    p.stop();

    let np = p.play().unwrap().expect("re-announced after stop");
    assert_eq!(np.index, 1);
    assert_eq!(loads(&log), ["B", "B"]);
}

#[test]
fn reselecting_the_playing_track_restarts_it_quietly() {
    let (mut p, log) = abc();
    assert!(p.select_by_index(1).unwrap().is_some());
    assert!(p.select_by_index(1).unwrap().is_none());
    assert_eq!(loads(&log), ["B", "B"]);
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
}

#[test]
fn engine_failure_keeps_previous_index() {
    let (mut p, log) = abc();
    log.lock().unwrap().fail_titles.insert("B".to_string());
    p.select_by_index(0).unwrap();

    match p.select_by_index(1) {
        Err(PlayerError::EngineFailure { index, source }) => {
            assert_eq!(index, 1);
            assert!(matches!(source, crate::audio::EngineError::Open { .. }));
        }
        other => panic!("expected EngineFailure, got {other:?}"),
    }
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Stopped));
    assert!(!log.lock().unwrap().playing);

    // Still usable afterwards.
    let np = p.select_by_index(2).unwrap().expect("announces C");
    assert_eq!(np.index, 2);
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));
}

#[test]
fn engine_failure_on_next_does_not_move() {
    let (mut p, log) = abc();
    log.lock().unwrap().fail_titles.insert("B".to_string());
    p.play().unwrap();

    assert!(matches!(
        p.next(),
        Err(PlayerError::EngineFailure { index: 1, .. })
    ));
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Stopped));
}

#[test]
fn clamp_stays_put_at_the_ends() {
    let (mut p, log) = player(&["A", "B", "C"], BoundaryPolicy::Clamp);

    assert!(p.previous().unwrap().is_none());
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Idle));

    p.select_by_index(2).unwrap();
    assert!(p.next().unwrap().is_none());
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Playing));

    p.previous().unwrap();
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
    assert_eq!(loads(&log), ["C", "B"]);
}

#[test]
fn single_track_playlist_wraps_onto_itself() {
    let (mut p, log) = player(&["Solo"], BoundaryPolicy::Wrap);
    p.next().unwrap();
    p.previous().unwrap();
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));
    assert_eq!(loads(&log), ["Solo", "Solo"]);
}

#[test]
fn track_end_advances_when_auto_advance_is_on() {
    let (mut p, log) = abc();
    p.play().unwrap();
    assert!(p.poll_track_end(true).is_none());

    log.lock().unwrap().finished = true;
    let np = p
        .poll_track_end(true)
        .expect("track end handled")
        .unwrap()
        .expect("next track announced");
    assert_eq!(np.index, 1);
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Playing));
}

#[test]
fn track_end_stops_without_auto_advance() {
    let (mut p, log) = abc();
    p.select_by_index(1).unwrap();
    log.lock().unwrap().finished = true;

    assert!(matches!(p.poll_track_end(false), Some(Ok(None))));
    assert_eq!(p.snapshot(), at(1, PlaybackStatus::Stopped));
}

#[test]
fn track_end_on_last_track_wraps_or_stops_by_policy() {
    let (mut wrap, wrap_log) = abc();
    wrap.select_by_index(2).unwrap();
    wrap_log.lock().unwrap().finished = true;
    wrap.poll_track_end(true).unwrap().unwrap();
    assert_eq!(wrap.snapshot(), at(0, PlaybackStatus::Playing));

    let (mut clamp, clamp_log) = player(&["A", "B", "C"], BoundaryPolicy::Clamp);
    clamp.select_by_index(2).unwrap();
    clamp_log.lock().unwrap().finished = true;
    assert!(matches!(clamp.poll_track_end(true), Some(Ok(None))));
    assert_eq!(clamp.snapshot(), at(2, PlaybackStatus::Stopped));
}

#[test]
fn track_end_is_ignored_unless_playing() {
    let (mut p, log) = abc();
    p.play().unwrap();
    p.pause().unwrap();
    log.lock().unwrap().finished = true;
    assert!(p.poll_track_end(true).is_none());
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Paused));
}

#[test]
fn shutdown_fades_only_when_playing() {
    let (mut p, log) = abc();
    p.play().unwrap();
    p.shutdown(std::time::Duration::from_millis(300));
    let calls = log.lock().unwrap().calls.clone();
    assert!(calls.contains(&EngineCall::FadeOut(std::time::Duration::from_millis(300))));
    assert_eq!(calls.last(), Some(&EngineCall::Halt));
    assert_eq!(p.snapshot().status, PlaybackStatus::Stopped);

    let (mut idle, idle_log) = abc();
    idle.shutdown(std::time::Duration::from_millis(300));
    assert_eq!(idle_log.lock().unwrap().calls, [EngineCall::Halt]);
}

#[test]
fn apply_routes_controls() {
    let (mut p, _log) = abc();
    p.apply(Control::Select(2)).unwrap();
    p.apply(Control::Pause).unwrap();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Paused));
    p.apply(Control::Play).unwrap();
    p.apply(Control::Next).unwrap();
    assert_eq!(p.snapshot(), at(0, PlaybackStatus::Playing));
    p.apply(Control::Previous).unwrap();
    p.apply(Control::Stop).unwrap();
    assert_eq!(p.snapshot(), at(2, PlaybackStatus::Stopped));
}

#[test]
fn errors_read_well() {
    let e = PlayerError::OutOfRange { index: -1, len: 3 };
    assert_eq!(
        e.to_string(),
        "track index -1 is out of range (playlist has 3 tracks)"
    );
    let e = PlayerError::InvalidTransition {
        action: "pause",
        status: PlaybackStatus::Stopped,
    };
    assert_eq!(e.to_string(), "cannot pause while stopped");
}

fn any_control() -> impl Strategy<Value = Control> {
    prop_oneof![
        Just(Control::Play),
        Just(Control::Pause),
        Just(Control::Stop),
        Just(Control::Next),
        Just(Control::Previous),
        (-3i64..12).prop_map(Control::Select),
    ]
}

fn any_boundary() -> impl Strategy<Value = BoundaryPolicy> {
    prop_oneof![Just(BoundaryPolicy::Wrap), Just(BoundaryPolicy::Clamp)]
}

proptest! {
    /// Whatever happens, the index points into the playlist.
    #[test]
    fn index_always_in_range(
        len in 1usize..8,
        boundary in any_boundary(),
        controls in prop::collection::vec(any_control(), 0..40),
    ) {
        let log = engine_log();
        let mut p = Player::new(
            fixtures::numbered(len),
            Box::new(ScriptedEngine::new(log.clone())),
            boundary,
            "prop".to_string(),
        );
        for c in controls {
            let _ = p.apply(c);
            prop_assert!(p.snapshot().index < len);
        }
    }

    /// A valid selection always lands on the requested track, playing.
    #[test]
    fn valid_select_lands_on_target(
        len in 1usize..8,
        pick in 0usize..8,
        warmup in prop::collection::vec(any_control(), 0..10),
    ) {
        let pick = pick % len;
        let log = engine_log();
        let mut p = Player::new(
            fixtures::numbered(len),
            Box::new(ScriptedEngine::new(log.clone())),
            BoundaryPolicy::Wrap,
            "prop".to_string(),
        );
        for c in warmup {
            let _ = p.apply(c);
        }
        p.select_by_index(pick as i64).unwrap();
        prop_assert_eq!(p.snapshot(), Snapshot { index: pick, status: PlaybackStatus::Playing });
        prop_assert!(log.lock().unwrap().playing);
    }

    /// A rejected selection changes nothing.
    #[test]
    fn invalid_select_changes_nothing(
        len in 1usize..8,
        offset in 0i64..100,
        negative in any::<bool>(),
        warmup in prop::collection::vec(any_control(), 0..10),
    ) {
        let log = engine_log();
        let mut p = Player::new(
            fixtures::numbered(len),
            Box::new(ScriptedEngine::new(log.clone())),
            BoundaryPolicy::Wrap,
            "prop".to_string(),
        );
        for c in warmup {
            let _ = p.apply(c);
        }
        let before = p.snapshot();
        let bad = if negative { -1 - offset } else { len as i64 + offset };
        let rejected = matches!(p.select_by_index(bad), Err(PlayerError::OutOfRange { .. }));
        prop_assert!(rejected);
        prop_assert_eq!(p.snapshot(), before);
    }

    /// Wrapping next and previous undo each other.
    #[test]
    fn next_then_previous_returns_home(len in 1usize..8, start in 0usize..8) {
        let start = start % len;
        let log = engine_log();
        let mut p = Player::new(
            fixtures::numbered(len),
            Box::new(ScriptedEngine::new(log)),
            BoundaryPolicy::Wrap,
            "prop".to_string(),
        );
        p.select_by_index(start as i64).unwrap();
        p.next().unwrap();
        prop_assert_eq!(p.snapshot().index, (start + 1) % len);
        p.previous().unwrap();
        prop_assert_eq!(p.snapshot().index, start);
    }
}
