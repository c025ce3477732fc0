//! Frame-rate measurement over one-second windows.

use web_time::{Duration, Instant};

/// Frame rate below which the host is considered struggling.
pub const LOW_PERFORMANCE_FPS: u32 = 30;

/// Frame-rate monitor sampling over fixed one-second windows.
///
/// Feed it one timestamp per rendered frame. After each full window the
/// measured FPS is published and the low-performance flag re-evaluated.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Length of a measurement window.
    window: Duration,
    /// Start of the current window.
    window_start: Instant,
    /// Frames counted in the current window.
    frames: u32,
    /// Last published FPS.
    fps: u32,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Monitor whose first window starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            window: Duration::from_secs(1),
            window_start: now,
            frames: 0,
            fps: 60,
            smoothed_fps: 60.0,
            smoothing: 0.25,
        }
    }

    /// Record a rendered frame. Returns the new FPS when a window closed.
    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let fps = (f64::from(self.frames) / elapsed.as_secs_f64()).round() as u32;
        self.fps = fps;
        self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
            + fps as f32 * self.smoothing;
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    /// FPS measured over the last complete window.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Exponentially smoothed FPS across windows.
    pub fn smoothed_fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Whether the last window fell below [`LOW_PERFORMANCE_FPS`].
    pub fn is_low_performance(&self) -> bool {
        self.fps < LOW_PERFORMANCE_FPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(timing: &mut FrameTiming, start: Instant, fps: u64, frames: u64) -> Option<u32> {
        let mut last = None;
        for i in 1..=frames {
            let at = start + Duration::from_micros(i * 1_000_000 / fps);
            if let Some(v) = timing.record_frame(at) {
                last = Some(v);
            }
        }
        last
    }

    #[test]
    fn publishes_after_full_window() {
        let start = Instant::now();
        let mut timing = FrameTiming::new(start);
        assert_eq!(timing.record_frame(start + Duration::from_millis(16)), None);
        assert_eq!(timing.fps(), 60);
    }

    #[test]
    fn detects_low_frame_rate() {
        let start = Instant::now();
        let mut timing = FrameTiming::new(start);
        let fps = feed(&mut timing, start, 20, 20);
        assert_eq!(fps, Some(20));
        assert!(timing.is_low_performance());
        assert!(timing.smoothed_fps() < 60.0);
    }

    #[test]
    fn healthy_frame_rate_is_not_low() {
        let start = Instant::now();
        let mut timing = FrameTiming::new(start);
        let fps = feed(&mut timing, start, 60, 60);
        assert_eq!(fps, Some(60));
        assert!(!timing.is_low_performance());
    }
}
