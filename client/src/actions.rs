//! User commands turned into outbound messages plus the local state change
//! each one implies. Nothing here touches the socket or the DOM.

use rectviz_shared::ClientMessage;

use crate::speed::Speed;
use crate::state::{Repaint, RunPhase, SessionState};

#[derive(Debug, PartialEq)]
pub struct Dispatch {
    pub outbound: Option<ClientMessage>,
    pub repaint: Repaint,
}

impl Dispatch {
    fn none() -> Self {
        Self {
            outbound: None,
            repaint: Repaint::Nothing,
        }
    }

    fn send(message: ClientMessage) -> Self {
        Self {
            outbound: Some(message),
            repaint: Repaint::Nothing,
        }
    }
}

/// Starts a run with the stored speed and core count. `surface_count` is how
/// many surfaces currently exist; a mismatch asks for a rebuild.
pub fn start(state: &mut SessionState, surface_count: usize) -> Dispatch {
    if state.running {
        log::debug!("start ignored: already running");
        return Dispatch::none();
    }
    state.reset_run();
    state.phase = RunPhase::Starting;
    state.status_message = "Starting...".to_string();
    let repaint = if surface_count != state.requested_cores {
        Repaint::Rebuild
    } else {
        Repaint::All
    };
    Dispatch {
        outbound: Some(ClientMessage::Start {
            speed: state.speed.micros(),
            num_cores: state.requested_cores,
        }),
        repaint,
    }
}

pub fn pause() -> Dispatch {
    Dispatch::send(ClientMessage::Pause)
}

pub fn resume() -> Dispatch {
    Dispatch::send(ClientMessage::Resume)
}

pub fn stop(state: &mut SessionState) -> Dispatch {
    state.reset_run();
    state.status_message = "Stopped".to_string();
    Dispatch {
        outbound: Some(ClientMessage::Stop),
        repaint: Repaint::All,
    }
}

/// Stores the new speed; the server only hears about it mid-run.
pub fn set_speed(state: &mut SessionState, step: usize) -> Dispatch {
    state.speed = Speed::from_step(step);
    if !state.running {
        return Dispatch::none();
    }
    Dispatch::send(ClientMessage::SetSpeed {
        speed: state.speed.micros(),
    })
}

/// Stores the clamped core count. While stopped the surfaces catch up on
/// the next [`start`].
pub fn set_cores(state: &mut SessionState, num_cores: usize) -> Dispatch {
    let clamped = num_cores.clamp(1, state.max_cores.max(1));
    if clamped == state.requested_cores {
        return Dispatch::none();
    }
    state.requested_cores = clamped;
    if !state.running {
        return Dispatch::none();
    }
    Dispatch {
        outbound: Some(ClientMessage::SetCores {
            num_cores: clamped,
        }),
        repaint: Repaint::Rebuild,
    }
}

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;
