#![allow(clippy::float_cmp)]

use rectviz_shared::{BoundingBox, Edge, Point, WorkerReport};

use super::*;

fn square_polygon() -> Polygon {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ];
    Polygon {
        edges: (0..4)
            .map(|i| Edge {
                p1: corners[i],
                p2: corners[(i + 1) % 4],
            })
            .collect(),
        bounding_box: BoundingBox {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 10.0,
        },
    }
}

fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect {
    Rect {
        p1: Point::new(x1, y1),
        p2: Point::new(x2, y2),
    }
}

fn report(worker_id: usize, is_contained: bool, area: f64) -> WorkerReport {
    WorkerReport {
        worker_id,
        rect: rect(1.0, 1.0, 3.0, 3.0),
        is_contained,
        area,
    }
}

fn update(workers: Vec<WorkerReport>, current_best: f64, checked_count: u64) -> ServerMessage {
    ServerMessage::Update(Update {
        workers,
        current_best,
        checked_count,
    })
}

fn state_with_cores(cores: usize) -> SessionState {
    SessionState::new(&ClientConfig {
        cores,
        ..ClientConfig::default()
    })
}

// =============================================================
// init
// =============================================================

#[test]
fn init_installs_polygon_and_rebuilds() {
    let mut state = SessionState::default();
    let repaint = state.apply(ServerMessage::Init {
        polygon: square_polygon(),
        max_cores: 8,
    });
    assert_eq!(repaint, Repaint::Rebuild);
    assert_eq!(state.polygon.as_ref().map(|p| p.edges.len()), Some(4));
    assert_eq!(state.max_cores, 8);
}

#[test]
fn init_clamps_requested_cores() {
    let mut state = state_with_cores(12);
    state.apply(ServerMessage::Init {
        polygon: square_polygon(),
        max_cores: 4,
    });
    assert_eq!(state.requested_cores, 4);

    let mut state = state_with_cores(2);
    state.apply(ServerMessage::Init {
        polygon: square_polygon(),
        max_cores: 4,
    });
    assert_eq!(state.requested_cores, 2);
}

#[test]
fn init_invalidates_every_worker() {
    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 4.0)], 4.0, 1));
    assert!(state.found_best(0));

    state.apply(ServerMessage::Init {
        polygon: square_polygon(),
        max_cores: 2,
    });
    assert!(state.workers.is_empty());
    assert!(!state.found_best(0));
}

// =============================================================
// update
// =============================================================

#[test]
fn update_upserts_and_reports_touched_workers() {
    let mut state = SessionState::default();
    let repaint = state.apply(update(
        vec![report(0, false, 4.0), report(2, true, 9.0)],
        9.0,
        10,
    ));
    assert_eq!(repaint, Repaint::Workers(vec![0, 2]));

    let worker = state.worker(2).expect("worker 2");
    assert_eq!(worker.rect, Some(rect(1.0, 1.0, 3.0, 3.0)));
    assert!(worker.contained);
    assert_eq!(worker.area, Some(9.0));
    assert_eq!(state.checked_count, 10);
}

#[test]
fn found_best_needs_containment_and_matching_positive_best() {
    let mut state = SessionState::default();
    state.apply(update(
        vec![
            report(0, true, 9.0),
            report(1, false, 9.0),
            report(2, true, 4.0),
        ],
        9.0,
        3,
    ));
    assert!(state.found_best(0));
    assert!(!state.found_best(1));
    assert!(!state.found_best(2));

    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 0.0)], 0.0, 1));
    assert!(!state.found_best(0));
}

#[test]
fn best_area_follows_latest_message_in_any_order() {
    let batches = [
        (vec![report(3, true, 6.0)], 6.0),
        (vec![report(0, false, 20.0), report(1, true, 2.0)], 6.0),
        (vec![report(1, true, 12.0)], 12.0),
        (vec![report(3, false, 1.0)], 12.0),
    ];
    let mut state = SessionState::default();
    for (checked, (workers, best)) in batches.into_iter().enumerate() {
        state.apply(update(workers, best, checked as u64));
        assert_eq!(state.best_area, best);
        assert_eq!(state.checked_count, checked as u64);
    }
}

#[test]
fn found_best_survives_later_updates() {
    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 4.0)], 4.0, 1));
    state.apply(update(vec![report(0, false, 1.0)], 16.0, 2));
    state.apply(update(vec![report(1, true, 16.0)], 16.0, 3));
    assert!(state.found_best(0));
    assert!(state.found_best(1));
    assert_eq!(state.worker(0).and_then(|w| w.area), Some(1.0));
}

// =============================================================
// complete
// =============================================================

#[test]
fn complete_keeps_flag_and_clears_live_rect() {
    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 4.0)], 4.0, 10));
    let repaint = state.apply(ServerMessage::Complete {
        result: 4.0,
        checked_count: 20,
    });
    assert_eq!(repaint, Repaint::All);

    let worker = state.worker(0).expect("worker 0");
    assert!(worker.found_best);
    assert_eq!(worker.rect, None);
    assert_eq!(worker.area, None);
    assert!(!worker.contained);
    assert_eq!(state.best_area, 4.0);
    assert_eq!(state.checked_count, 20);
    assert!(!state.running);
    assert_eq!(state.phase, RunPhase::Complete);
    assert_eq!(state.status_message, "Complete! Final answer: 4");
}

#[test]
fn complete_flags_workers_holding_the_final_area() {
    let mut state = SessionState::default();
    // The batch's best lagged behind worker 1's area.
    state.apply(update(vec![report(1, true, 5.0), report(2, false, 5.0)], 3.0, 4));
    assert!(!state.found_best(1));

    state.apply(ServerMessage::Complete {
        result: 5.0,
        checked_count: 4,
    });
    assert!(state.found_best(1));
    assert!(!state.found_best(2));
}

#[test]
fn second_complete_does_not_flag_cleared_workers() {
    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 4.0)], 3.0, 1));
    state.apply(ServerMessage::Complete {
        result: 3.0,
        checked_count: 1,
    });
    state.apply(ServerMessage::Complete {
        result: 4.0,
        checked_count: 1,
    });
    assert!(!state.found_best(0));
}

// =============================================================
// status
// =============================================================

#[test]
fn status_sets_flags_verbatim() {
    let mut state = SessionState::default();
    assert_eq!(
        state.apply(ServerMessage::Status {
            running: true,
            paused: false
        }),
        Repaint::Nothing
    );
    assert!(state.running && !state.paused);
    assert_eq!(state.phase, RunPhase::Running);
    assert_eq!(state.status_message, "Running algorithm...");
    assert_eq!(state.status_class(), "status-running");

    state.apply(ServerMessage::Status {
        running: true,
        paused: true,
    });
    assert_eq!(state.phase, RunPhase::Paused);
    assert_eq!(state.status_message, "Paused");
    assert_eq!(state.status_class(), "status-paused");
}

#[test]
fn stopped_status_reports_progress_when_something_was_found() {
    let mut state = SessionState::default();
    state.apply(ServerMessage::Status {
        running: false,
        paused: false,
    });
    assert_eq!(state.status_message, "Ready to start");
    assert_eq!(state.phase, RunPhase::Idle);

    state.apply(update(vec![report(0, true, 4.0)], 4.0, 12_345));
    state.apply(ServerMessage::Status {
        running: false,
        paused: false,
    });
    assert_eq!(state.status_message, "Stopped at 12,345 checks");
    assert_eq!(state.status_class(), "status-complete");
}

#[test]
fn stopped_status_after_complete_stays_complete() {
    let mut state = SessionState::default();
    state.apply(ServerMessage::Complete {
        result: 4.0,
        checked_count: 1,
    });
    state.apply(ServerMessage::Status {
        running: false,
        paused: false,
    });
    assert_eq!(state.phase, RunPhase::Complete);
}

// =============================================================
// reset / connection
// =============================================================

#[test]
fn reset_run_clears_sticky_flags() {
    let mut state = SessionState::default();
    state.apply(update(vec![report(0, true, 4.0)], 4.0, 1));
    state.reset_run();
    assert!(!state.found_best(0));
    assert_eq!(state.best_area, 0.0);
    assert_eq!(state.checked_count, 0);
}

#[test]
fn disconnect_stops_run_and_backs_off() {
    let mut state = SessionState::default();
    state.connected();
    state.apply(ServerMessage::Status {
        running: true,
        paused: true,
    });

    assert_eq!(state.disconnected(), Some(1000));
    assert!(!state.running);
    assert!(!state.paused);
    assert_eq!(state.phase, RunPhase::Idle);
    assert_eq!(state.connection, ConnectionStatus::Disconnected);
}

#[test]
fn backoff_sequence_ends_in_lost_session() {
    let mut state = SessionState::default();
    let delays: Vec<_> = (0..5).map(|_| state.disconnected()).collect();
    assert_eq!(
        delays,
        vec![Some(1000), Some(2000), Some(4000), Some(8000), Some(10_000)]
    );
    assert_eq!(state.disconnected(), None);
    assert_eq!(state.connection, ConnectionStatus::Lost);
    assert_eq!(
        state.status_message,
        "Connection lost. Please refresh the page."
    );
    assert_eq!(state.disconnected(), None);
}

#[test]
fn reconnect_resets_attempts() {
    let mut state = SessionState::default();
    state.disconnected();
    state.disconnected();
    assert_eq!(state.reconnect.attempts(), 2);
    state.connected();
    assert_eq!(state.reconnect.attempts(), 0);
    assert_eq!(state.disconnected(), Some(1000));
}

#[test]
fn socket_creation_failure_backs_off_like_a_close() {
    let mut state = SessionState::default();
    state.connecting();
    assert_eq!(state.connect_failed(), Some(1000));
    assert_eq!(state.connection, ConnectionStatus::Error);
    assert!(!state.running);

    assert_eq!(state.connect_failed(), Some(2000));
    state.connect_failed();
    state.connect_failed();
    assert_eq!(state.connect_failed(), Some(10_000));
    assert_eq!(state.connect_failed(), None);
    assert_eq!(state.connection, ConnectionStatus::Lost);
    assert_eq!(state.status_message, "Connection lost. Please refresh the page.");
}

#[test]
fn connection_status_styles() {
    assert_eq!(ConnectionStatus::Connected.css_class(), "connected");
    assert_eq!(ConnectionStatus::Lost.css_class(), "disconnected");
    assert_eq!(ConnectionStatus::default().label(), "Connecting...");
}
