//! The discrete speed ladder offered by the speed slider.

/// Per-candidate delay in microseconds, slowest last.
pub const SPEED_STEPS_MICROS: [u64; 15] = [
    100, 200, 500, 1_000, 2_000, 5_000, 10_000, 20_000, 50_000, 100_000, 200_000, 500_000,
    1_000_000, 2_000_000, 5_000_000,
];

pub const DEFAULT_SPEED_STEP: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Speed {
    step: usize,
}

impl Default for Speed {
    fn default() -> Self {
        Self::from_step(DEFAULT_SPEED_STEP)
    }
}

impl Speed {
    pub fn from_step(step: usize) -> Self {
        Self {
            step: step.min(SPEED_STEPS_MICROS.len() - 1),
        }
    }

    pub fn step(self) -> usize {
        self.step
    }

    pub fn micros(self) -> u64 {
        SPEED_STEPS_MICROS[self.step]
    }

    pub fn label(self) -> String {
        let micros = self.micros();
        if micros < 1_000 {
            format!("{micros}µs")
        } else if micros < 1_000_000 {
            format!("{}ms", micros as f64 / 1_000.0)
        } else {
            format!("{}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
#[path = "speed_test.rs"]
mod speed_test;
