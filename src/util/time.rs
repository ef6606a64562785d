//! Time utilities for the client simulation

use std::time::Duration;

use tokio::time::Instant;

/// Nominal display frame rate the authority's speeds are tuned for
pub const NOMINAL_FPS: u32 = 60;

/// Interval between two simulation ticks at the given frame rate
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(fps.max(1)))
}

/// Monotonic session clock. Effect timers are measured against it, so
/// wall-clock jumps never stretch or cut a disruptive effect. Follows
/// tokio's clock, so paused-time tests control it too.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(60), Duration::from_micros(16_666));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn test_timer_elapsed() {
        let timer = Timer::new();
        let copy = timer;
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5);
        assert!(copy.elapsed_ms() >= timer.elapsed_ms());
    }
}
