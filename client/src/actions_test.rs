use rectviz_shared::{Point, Rect, ServerMessage, Update, WorkerReport};

use super::*;
use crate::config::ClientConfig;
use crate::state::ConnectionStatus;

fn state(cores: usize) -> SessionState {
    let mut state = SessionState::new(&ClientConfig {
        cores,
        ..ClientConfig::default()
    });
    state.max_cores = 8;
    state.connection = ConnectionStatus::Connected;
    state
}

fn seed_best_worker(state: &mut SessionState) {
    state.apply(ServerMessage::Update(Update {
        workers: vec![WorkerReport {
            worker_id: 0,
            rect: Rect {
                p1: Point::new(1.0, 1.0),
                p2: Point::new(3.0, 3.0),
            },
            is_contained: true,
            area: 4.0,
        }],
        current_best: 4.0,
        checked_count: 10,
    }));
}

// ===== start =====

#[test]
fn start_sends_speed_and_cores() {
    let mut state = state(2);
    let dispatch = start(&mut state, 2);
    assert_eq!(
        dispatch.outbound,
        Some(ClientMessage::Start {
            speed: state.speed.micros(),
            num_cores: 2,
        })
    );
    assert_eq!(dispatch.repaint, Repaint::All);
    assert_eq!(state.phase, RunPhase::Starting);
    assert_eq!(state.status_message, "Starting...");
}

#[test]
fn start_rebuilds_when_surface_count_changed() {
    let mut state = state(4);
    assert_eq!(start(&mut state, 1).repaint, Repaint::Rebuild);
}

#[test]
fn start_resets_found_best_and_counters() {
    let mut state = state(1);
    seed_best_worker(&mut state);
    assert!(state.found_best(0));
    start(&mut state, 1);
    assert!(!state.found_best(0));
    assert_eq!(state.best_area, 0.0);
    assert_eq!(state.checked_count, 0);
}

#[test]
fn start_while_running_is_a_no_op() {
    let mut state = state(1);
    state.apply_status(true, false);
    seed_best_worker(&mut state);
    let dispatch = start(&mut state, 1);
    assert_eq!(dispatch, Dispatch::none());
    assert!(state.found_best(0));
}

// ===== pause / resume / stop =====

#[test]
fn pause_and_resume_only_forward() {
    assert_eq!(pause().outbound, Some(ClientMessage::Pause));
    assert_eq!(resume().outbound, Some(ClientMessage::Resume));
    assert_eq!(pause().repaint, Repaint::Nothing);
}

#[test]
fn stop_clears_workers_and_repaints() {
    let mut state = state(1);
    state.apply_status(true, false);
    seed_best_worker(&mut state);
    let dispatch = stop(&mut state);
    assert_eq!(dispatch.outbound, Some(ClientMessage::Stop));
    assert_eq!(dispatch.repaint, Repaint::All);
    assert!(state.workers.is_empty());
    assert_eq!(state.status_message, "Stopped");
}

// ===== speed / cores =====

#[test]
fn set_speed_while_stopped_is_stored_only() {
    let mut state = state(1);
    let dispatch = set_speed(&mut state, 3);
    assert_eq!(dispatch.outbound, None);
    assert_eq!(state.speed.micros(), 1_000);
    let started = start(&mut state, 1);
    assert_eq!(
        started.outbound,
        Some(ClientMessage::Start {
            speed: 1_000,
            num_cores: 1,
        })
    );
}

#[test]
fn set_speed_while_running_is_forwarded() {
    let mut state = state(1);
    state.apply_status(true, false);
    let dispatch = set_speed(&mut state, 0);
    assert_eq!(dispatch.outbound, Some(ClientMessage::SetSpeed { speed: 100 }));
}

#[test]
fn set_cores_clamps_to_server_maximum() {
    let mut state = state(1);
    let dispatch = set_cores(&mut state, 32);
    assert_eq!(state.requested_cores, 8);
    assert_eq!(dispatch, Dispatch::none());

    set_cores(&mut state, 0);
    assert_eq!(state.requested_cores, 1);
}

#[test]
fn core_change_while_stopped_rebuilds_on_next_start() {
    let mut state = state(1);
    set_cores(&mut state, 3);
    let dispatch = start(&mut state, 1);
    assert_eq!(dispatch.repaint, Repaint::Rebuild);
    assert_eq!(
        dispatch.outbound,
        Some(ClientMessage::Start {
            speed: state.speed.micros(),
            num_cores: 3,
        })
    );
}

#[test]
fn set_cores_while_running_is_forwarded() {
    let mut state = state(2);
    state.apply_status(true, false);
    let dispatch = set_cores(&mut state, 4);
    assert_eq!(dispatch.outbound, Some(ClientMessage::SetCores { num_cores: 4 }));
    assert_eq!(dispatch.repaint, Repaint::Rebuild);
}

#[test]
fn set_cores_to_current_value_changes_nothing() {
    let mut state = state(3);
    assert_eq!(set_cores(&mut state, 3), Dispatch::none());
}
