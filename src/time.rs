//! Frame clock for driving the simulation.
//!
//! [`Time`] produces one [`FrameTime`] per frame, either from the wall clock
//! ([`Time::update`]) or from a caller-supplied delta ([`Time::tick`], for
//! headless runs and tests). Both paths honor pause, time scale and fixed
//! delta the same way.
//!
//! # Example
//!
//! ```ignore
//! use embers::time::Time;
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! loop {
//!     let frame = time.update();
//!     system.advance(&frame, &emitter, &params);
//! }
//! ```

use std::time::{Duration, Instant};

/// Timing for a single frame, as consumed by
/// [`ParticleSystem::advance`](crate::ParticleSystem::advance).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Scaled seconds since the previous frame.
    pub delta: f32,
    /// Scaled seconds since the clock started, excluding pauses.
    pub elapsed: f32,
    /// Frames advanced so far.
    pub frame: u64,
}

/// Wall-clock frame rate, averaged over a short window.
#[derive(Debug)]
struct FpsMeter {
    window_start: Instant,
    frames_in_window: u32,
    value: f32,
}

impl FpsMeter {
    const WINDOW: Duration = Duration::from_millis(500);

    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames_in_window: 0,
            value: 0.0,
        }
    }

    fn record(&mut self, now: Instant) {
        self.frames_in_window += 1;
        let span = now.duration_since(self.window_start);
        if span >= Self::WINDOW {
            self.value = self.frames_in_window as f32 / span.as_secs_f32();
            self.frames_in_window = 0;
            self.window_start = now;
        }
    }
}

/// Frame clock with pause, time scale and fixed delta.
#[derive(Debug)]
pub struct Time {
    last_instant: Instant,
    current: FrameTime,
    fps: FpsMeter,
    paused: bool,
    /// Overrides the measured or supplied delta when set.
    fixed_delta: Option<f32>,
    scale: f32,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_instant: now,
            current: FrameTime::default(),
            fps: FpsMeter::new(now),
            paused: false,
            fixed_delta: None,
            scale: 1.0,
        }
    }

    /// Advance using the wall clock. Call once per frame.
    pub fn update(&mut self) -> FrameTime {
        let now = Instant::now();
        let measured = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        if !self.paused {
            self.fps.record(now);
        }
        self.advance(measured)
    }

    /// Advance by a caller-supplied delta instead of the wall clock.
    pub fn tick(&mut self, delta: f32) -> FrameTime {
        self.advance(delta)
    }

    fn advance(&mut self, delta: f32) -> FrameTime {
        if self.paused {
            self.current.delta = 0.0;
        } else {
            let delta = self.fixed_delta.unwrap_or(delta).max(0.0) * self.scale;
            self.current = FrameTime {
                delta,
                elapsed: self.current.elapsed + delta,
                frame: self.current.frame + 1,
            };
        }
        self.current
    }

    /// The most recent frame.
    pub fn frame_time(&self) -> FrameTime {
        self.current
    }

    /// Total scaled time in seconds, excluding pauses.
    pub fn elapsed(&self) -> f32 {
        self.current.elapsed
    }

    pub fn delta(&self) -> f32 {
        self.current.delta
    }

    pub fn frame(&self) -> u64 {
        self.current.frame
    }

    /// Wall-clock frames per second; zero until the first half second of
    /// [`update`](Self::update) calls has passed.
    pub fn fps(&self) -> f32 {
        self.fps.value
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_scale(&self) -> f32 {
        self.scale
    }

    /// Stop the clock. Frames still come out, with a zero delta and an
    /// unchanged frame counter.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            // Don't count the paused span as one long frame
            self.last_instant = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a constant delta regardless of measured or supplied time.
    /// `None` goes back to real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Speed multiplier; negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }

    /// Back to frame 0 at time 0, keeping scale and fixed delta.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_instant = now;
        self.current = FrameTime::default();
        self.fps = FpsMeter::new(now);
        self.paused = false;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
