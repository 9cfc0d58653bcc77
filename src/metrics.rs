use std::time::Duration;

/// Gauge ceiling for typing speed, in codepoints per minute.
pub const DEFAULT_MAX_SPEED: f64 = 1000.0;

/// Live performance figures for a session, recomputed on every input event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub typed: usize,
    pub correct: usize,
    pub progress: f64,
    pub accuracy: f64,
    /// Codepoints per minute.
    pub speed: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            typed: 0,
            correct: 0,
            progress: 0.0,
            accuracy: 1.0,
            speed: 0.0,
        }
    }
}

impl Metrics {
    /// Measure `typed` against `reference` position by position.
    ///
    /// `elapsed` is `None` until the session has started.
    pub fn compute(typed: &str, reference: &str, elapsed: Option<Duration>) -> Self {
        let typed_count = typed.chars().count();
        let reference_len = reference.chars().count();

        let correct = typed
            .chars()
            .zip(reference.chars())
            .filter(|(a, b)| a == b)
            .count();

        let progress = if reference_len > 0 {
            (typed_count as f64 / reference_len as f64).min(1.0)
        } else {
            0.0
        };

        let accuracy = if typed_count > 0 {
            correct as f64 / typed_count as f64
        } else {
            1.0
        };

        let speed = match elapsed {
            Some(elapsed) if elapsed > Duration::ZERO => {
                typed_count as f64 / (elapsed.as_secs_f64() / 60.0)
            }
            _ => 0.0,
        };

        Self {
            typed: typed_count,
            correct,
            progress,
            accuracy,
            speed,
        }
    }

    /// Speed as a fraction of `max`, clamped to `[0, 1]`.
    pub fn speed_ratio(&self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        (self.speed / max).clamp(0.0, 1.0)
    }

    pub fn progress_percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }

    pub fn accuracy_percent(&self) -> u32 {
        (self.accuracy * 100.0).round() as u32
    }
}
