use std::collections::BTreeMap;

use rectviz_shared::{Polygon, Rect, ServerMessage, Update};

use crate::config::ClientConfig;
use crate::speed::Speed;
use crate::util::{format_number, group_thousands};
use crate::ws::Backoff;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Error,
    /// Reconnect attempts exhausted; only a page reload recovers.
    Lost,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Error => "Error",
            ConnectionStatus::Lost => "Connection lost",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected | ConnectionStatus::Lost => "disconnected",
            ConnectionStatus::Connecting | ConnectionStatus::Error => "connecting",
        }
    }
}

/// Run control as seen by the client. Only `status` messages move the phase
/// into `Running` or `Paused`; `Starting` is a local guess until then.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Idle,
    Starting,
    Running,
    Paused,
    Complete,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkerState {
    pub rect: Option<Rect>,
    pub contained: bool,
    /// `None` once the live result has been cleared.
    pub area: Option<f64>,
    /// Sticky until the next `start` or `stop`.
    pub found_best: bool,
}

impl WorkerState {
    fn clear_live(&mut self) {
        self.rect = None;
        self.contained = false;
        self.area = None;
    }
}

/// What the surfaces need after a state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Repaint {
    Nothing,
    Workers(Vec<usize>),
    All,
    /// Recreate the surface set for the requested core count, refit the
    /// viewport and repaint everything.
    Rebuild,
}

#[derive(Debug)]
pub struct SessionState {
    pub polygon: Option<Polygon>,
    pub workers: BTreeMap<usize, WorkerState>,
    pub best_area: f64,
    pub checked_count: u64,
    pub running: bool,
    pub paused: bool,
    pub phase: RunPhase,
    pub connection: ConnectionStatus,
    pub reconnect: Backoff,
    pub requested_cores: usize,
    pub max_cores: usize,
    pub speed: Speed,
    pub status_message: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl SessionState {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            polygon: None,
            workers: BTreeMap::new(),
            best_area: 0.0,
            checked_count: 0,
            running: false,
            paused: false,
            phase: RunPhase::Idle,
            connection: ConnectionStatus::Connecting,
            reconnect: Backoff::default(),
            requested_cores: config.cores.max(1),
            max_cores: config.cores.max(1),
            speed: Speed::from_step(config.speed_step),
            status_message: "Ready to start".to_string(),
        }
    }

    pub fn apply(&mut self, message: ServerMessage) -> Repaint {
        match message {
            ServerMessage::Init { polygon, max_cores } => self.apply_init(polygon, max_cores),
            ServerMessage::Update(update) => self.apply_update(&update),
            ServerMessage::Complete {
                result,
                checked_count,
            } => self.apply_complete(result, checked_count),
            ServerMessage::Status { running, paused } => self.apply_status(running, paused),
        }
    }

    pub fn apply_init(&mut self, polygon: Polygon, max_cores: usize) -> Repaint {
        log::info!(
            "polygon initialized edges={} max_cores={max_cores}",
            polygon.edges.len()
        );
        self.polygon = Some(polygon);
        self.max_cores = max_cores.max(1);
        self.requested_cores = self.requested_cores.min(self.max_cores);
        self.workers.clear();
        Repaint::Rebuild
    }

    pub fn apply_update(&mut self, update: &Update) -> Repaint {
        let mut touched = Vec::with_capacity(update.workers.len());
        for report in &update.workers {
            let worker = self.workers.entry(report.worker_id).or_default();
            worker.rect = Some(report.rect);
            worker.contained = report.is_contained;
            worker.area = Some(report.area);
            if report.is_contained
                && report.area == update.current_best
                && update.current_best > 0.0
            {
                worker.found_best = true;
            }
            touched.push(report.worker_id);
        }
        self.best_area = update.current_best;
        self.checked_count = update.checked_count;
        Repaint::Workers(touched)
    }

    pub fn apply_complete(&mut self, result: f64, checked_count: u64) -> Repaint {
        for worker in self.workers.values_mut() {
            if worker.contained && worker.area == Some(result) && result > 0.0 {
                worker.found_best = true;
            }
            worker.clear_live();
        }
        self.best_area = result;
        self.checked_count = checked_count;
        self.running = false;
        self.paused = false;
        self.phase = RunPhase::Complete;
        self.status_message = format!("Complete! Final answer: {}", format_number(result));
        log::info!("search complete result={result} checked={checked_count}");
        Repaint::All
    }

    pub fn apply_status(&mut self, running: bool, paused: bool) -> Repaint {
        self.running = running;
        self.paused = paused;
        self.phase = match (running, paused) {
            (_, true) => RunPhase::Paused,
            (true, false) => RunPhase::Running,
            (false, false) if self.phase == RunPhase::Complete => RunPhase::Complete,
            (false, false) => RunPhase::Idle,
        };
        self.status_message = if running && !paused {
            "Running algorithm...".to_string()
        } else if paused {
            "Paused".to_string()
        } else if self.best_area > 0.0 {
            format!("Stopped at {} checks", group_thousands(self.checked_count))
        } else {
            "Ready to start".to_string()
        };
        log::debug!("status running={running} paused={paused}");
        Repaint::Nothing
    }

    /// Forgets every per-worker entry, found-best flags included, and zeroes
    /// the global counters.
    pub fn reset_run(&mut self) {
        self.workers.clear();
        self.best_area = 0.0;
        self.checked_count = 0;
    }

    pub fn worker(&self, worker_id: usize) -> Option<&WorkerState> {
        self.workers.get(&worker_id)
    }

    #[cfg(test)]
    pub fn found_best(&self, worker_id: usize) -> bool {
        self.worker(worker_id).is_some_and(|worker| worker.found_best)
    }

    pub fn status_class(&self) -> &'static str {
        if self.running && !self.paused {
            "status-running"
        } else if self.paused {
            "status-paused"
        } else if self.best_area > 0.0 {
            "status-complete"
        } else {
            "status-idle"
        }
    }

    // --- Connection lifecycle ---

    pub fn connecting(&mut self) {
        self.connection = ConnectionStatus::Connecting;
    }

    pub fn connected(&mut self) {
        self.connection = ConnectionStatus::Connected;
        self.reconnect.reset();
    }

    pub fn connection_error(&mut self) {
        self.connection = ConnectionStatus::Error;
    }

    /// A socket that could not be created is a failed attempt like a close,
    /// but shows as an error until the next attempt.
    pub fn connect_failed(&mut self) -> Option<u32> {
        let delay = self.disconnected();
        if delay.is_some() {
            self.connection = ConnectionStatus::Error;
        }
        delay
    }

    /// Marks the connection closed and the run stopped. Returns the delay
    /// before the next reconnect attempt, or `None` once attempts are
    /// exhausted, at which point the session is lost for good.
    pub fn disconnected(&mut self) -> Option<u32> {
        self.connection = ConnectionStatus::Disconnected;
        self.running = false;
        self.paused = false;
        if matches!(
            self.phase,
            RunPhase::Starting | RunPhase::Running | RunPhase::Paused
        ) {
            self.phase = RunPhase::Idle;
        }
        let delay = self.reconnect.next_delay();
        if delay.is_none() {
            self.connection = ConnectionStatus::Lost;
            self.status_message = "Connection lost. Please refresh the page.".to_string();
        }
        delay
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
