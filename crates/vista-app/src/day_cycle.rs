//! Day clock and the sun direction derived from it.
//!
//! Progress runs over `[0, 1)`: 0 is midnight, 0.25 dawn, 0.5 noon and
//! 0.75 dusk. The sun orbits in the XY plane.

use glam::Vec3;
use vista_config::DayConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct DayCycle {
    progress: f64,
    duration_seconds: f64,
    paused: bool,
}

impl DayCycle {
    /// A clock at `start_progress` (wrapped into `[0, 1)`). A non-positive
    /// duration freezes the clock.
    pub fn new(duration_seconds: f64, start_progress: f64) -> Self {
        if duration_seconds <= 0.0 {
            tracing::warn!("Day duration {duration_seconds}s is not positive, clock frozen");
        }
        Self {
            progress: start_progress.rem_euclid(1.0),
            duration_seconds,
            paused: false,
        }
    }

    pub fn from_config(config: &DayConfig) -> Self {
        let mut cycle = Self::new(config.duration_seconds, config.start_progress);
        cycle.paused = config.paused;
        cycle
    }

    /// Advance by `dt` real seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.paused || self.duration_seconds <= 0.0 {
            return;
        }
        self.progress = (self.progress + dt / self.duration_seconds).rem_euclid(1.0);
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.rem_euclid(1.0);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn sun_direction(&self) -> Vec3 {
        sun_direction(self.progress)
    }
}

/// Unit direction toward the sun: straight up at noon, straight down at
/// midnight, on the +X horizon at dawn.
pub fn sun_direction(progress: f64) -> Vec3 {
    let angle = (progress as f32) * std::f32::consts::TAU;
    Vec3::new(angle.sin(), -angle.cos(), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_sun_direction_key_times() {
        assert!(approx(sun_direction(0.0), Vec3::NEG_Y));
        assert!(approx(sun_direction(0.25), Vec3::X));
        assert!(approx(sun_direction(0.5), Vec3::Y));
        assert!(approx(sun_direction(0.75), Vec3::NEG_X));
    }

    #[test]
    fn test_tick_wraps() {
        let mut cycle = DayCycle::new(100.0, 0.9);
        cycle.tick(20.0);
        assert!((cycle.progress() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_paused_and_frozen_clocks_hold() {
        let mut cycle = DayCycle::new(100.0, 0.3);
        cycle.set_paused(true);
        cycle.tick(10.0);
        assert_eq!(cycle.progress(), 0.3);

        let mut frozen = DayCycle::new(0.0, 0.3);
        frozen.tick(10.0);
        assert_eq!(frozen.progress(), 0.3);
    }

    #[test]
    fn test_start_progress_is_wrapped() {
        assert!((DayCycle::new(10.0, 1.25).progress() - 0.25).abs() < 1e-12);
        assert!((DayCycle::new(10.0, -0.25).progress() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_from_config() {
        let config = DayConfig {
            duration_seconds: 60.0,
            start_progress: 0.5,
            paused: true,
        };
        let cycle = DayCycle::from_config(&config);
        assert!(cycle.is_paused());
        assert!(approx(cycle.sun_direction(), Vec3::Y));
    }
}
