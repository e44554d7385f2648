//! Coalesces per-worker repaint requests into one paint pass per display
//! refresh.
//!
//! The browser side lives in `app`: it asks for an animation frame whenever
//! [`RenderScheduler::mark_dirty`] returns `true`, and on the frame calls
//! [`RenderScheduler::begin_frame`] to learn which surfaces to paint.

use std::collections::{BTreeSet, VecDeque};

use crate::config::FPS_WINDOW;

#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: BTreeSet<usize>,
    frame: Option<i32>,
    scheduled: bool,
    fps: FpsMeter,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `worker_id` needs a repaint. Returns `true` when the
    /// caller must request a frame; `false` while one is already pending.
    pub fn mark_dirty(&mut self, worker_id: usize) -> bool {
        self.pending.insert(worker_id);
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Remembers the browser's handle for the requested frame so teardown
    /// can cancel it.
    pub fn frame_requested(&mut self, handle: i32) {
        self.frame = Some(handle);
    }

    /// Drains the pending set for the frame firing at `now_ms` and unschedules
    /// itself, so the next `mark_dirty` requests a fresh frame.
    pub fn begin_frame(&mut self, now_ms: f64) -> Vec<usize> {
        self.fps.record(now_ms);
        self.scheduled = false;
        self.frame = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Drops any pending work and hands back the frame handle to cancel.
    pub fn cancel(&mut self) -> Option<i32> {
        self.pending.clear();
        self.scheduled = false;
        self.frame.take()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }
}

/// Rolling frames-per-second estimate over the last [`FPS_WINDOW`]
/// inter-frame intervals.
#[derive(Debug)]
pub struct FpsMeter {
    intervals: VecDeque<f64>,
    last_frame: Option<f64>,
    window: usize,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::with_window(FPS_WINDOW)
    }
}

impl FpsMeter {
    pub fn with_window(window: usize) -> Self {
        Self {
            intervals: VecDeque::with_capacity(window),
            last_frame: None,
            window: window.max(1),
        }
    }

    pub fn record(&mut self, now_ms: f64) {
        if let Some(last) = self.last_frame {
            let delta = now_ms - last;
            if delta > 0.0 {
                self.intervals.push_back(delta);
                while self.intervals.len() > self.window {
                    self.intervals.pop_front();
                }
            }
        }
        self.last_frame = Some(now_ms);
    }

    pub fn fps(&self) -> u32 {
        if self.intervals.is_empty() {
            return 0;
        }
        let average = self.intervals.iter().sum::<f64>() / self.intervals.len() as f64;
        (1000.0 / average).round() as u32
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
