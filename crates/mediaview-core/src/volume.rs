//! Volume sub-control
//!
//! A clamped pass-through to the [`AudioService`]. The indicator always shows
//! what the service reports after a change.

use crate::{platform::AudioService, view::VolumeBar};
use std::sync::Arc;
use tracing::debug;

pub struct VolumeControl {
    audio: Arc<dyn AudioService>,
    step_fraction: f64,
    bar: VolumeBar,
}

impl VolumeControl {
    pub fn new(audio: Arc<dyn AudioService>, step_fraction: f64) -> Self {
        let bar = VolumeBar {
            level: audio.level(),
            max: audio.max_level(),
        };
        Self {
            audio,
            step_fraction,
            bar,
        }
    }

    /// Current indicator
    pub fn bar(&self) -> VolumeBar {
        self.bar
    }

    /// Level one button press away: `level + direction * fraction * max`,
    /// truncated toward zero and clamped to `[0, max]`
    fn stepped(&self, direction: f64) -> u32 {
        let max = self.bar.max as f64;
        let level = self.bar.level as f64 + direction * self.step_fraction * max;
        (level.trunc()).clamp(0.0, max) as u32
    }

    pub fn increase(&mut self) -> VolumeBar {
        let level = self.stepped(1.0);
        self.set_level(level)
    }

    pub fn decrease(&mut self) -> VolumeBar {
        let level = self.stepped(-1.0);
        self.set_level(level)
    }

    /// Set an absolute level, clamped to `[0, max]`
    pub fn set_level(&mut self, level: u32) -> VolumeBar {
        let level = level.min(self.bar.max);
        debug!(from = self.bar.level, to = level, "Volume change");
        self.audio.set_level(level);
        self.refresh()
    }

    /// Hardware key: let the platform pick the step size
    pub fn key_up(&mut self) -> VolumeBar {
        self.audio.step_up();
        self.refresh()
    }

    pub fn key_down(&mut self) -> VolumeBar {
        self.audio.step_down();
        self.refresh()
    }

    /// Re-read level and range from the audio service
    pub fn refresh(&mut self) -> VolumeBar {
        self.bar = VolumeBar {
            level: self.audio.level(),
            max: self.audio.max_level(),
        };
        self.bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct TestAudio {
        level: AtomicU32,
        max: u32,
        key_step: u32,
    }

    impl TestAudio {
        fn new(level: u32, max: u32) -> Arc<Self> {
            Arc::new(Self {
                level: AtomicU32::new(level),
                max,
                key_step: 1,
            })
        }
    }

    impl AudioService for TestAudio {
        fn level(&self) -> u32 {
            self.level.load(Ordering::SeqCst)
        }

        fn max_level(&self) -> u32 {
            self.max
        }

        fn set_level(&self, level: u32) {
            self.level.store(level, Ordering::SeqCst);
        }

        fn step_up(&self) {
            let next = (self.level() + self.key_step).min(self.max);
            self.set_level(next);
        }

        fn step_down(&self) {
            self.set_level(self.level().saturating_sub(self.key_step));
        }
    }

    #[test]
    fn test_increase_by_ten_percent() {
        let audio = TestAudio::new(50, 100);
        let mut volume = VolumeControl::new(audio.clone(), 0.1);

        assert_eq!(volume.increase().level, 60);
        assert_eq!(audio.level(), 60);
    }

    #[test]
    fn test_decrease_clamps_at_zero() {
        let audio = TestAudio::new(5, 100);
        let mut volume = VolumeControl::new(audio.clone(), 0.1);

        assert_eq!(volume.decrease().level, 0);
        assert_eq!(volume.decrease().level, 0);
        assert_eq!(audio.level(), 0);
    }

    #[test]
    fn test_increase_clamps_at_max() {
        let audio = TestAudio::new(14, 15);
        let mut volume = VolumeControl::new(audio, 0.1);

        assert_eq!(volume.increase().level, 15);
        assert_eq!(volume.increase().level, 15);
    }

    #[test]
    fn test_fractional_step_truncates_after_adding() {
        // 5 - 1.5 = 3.5 -> 3
        let audio = TestAudio::new(5, 15);
        let mut volume = VolumeControl::new(audio, 0.1);
        assert_eq!(volume.decrease().level, 3);

        // 3 + 0.5 = 3.5 -> 3: small ranges can need several presses
        let audio = TestAudio::new(3, 5);
        let mut volume = VolumeControl::new(audio, 0.1);
        assert_eq!(volume.increase().level, 3);

        let audio = TestAudio::new(7, 15);
        let mut volume = VolumeControl::new(audio, 0.1);
        assert_eq!(volume.increase().level, 8);
        assert_eq!(volume.increase().level, 9);
    }

    #[test]
    fn test_set_level_clamps() {
        let audio = TestAudio::new(0, 15);
        let mut volume = VolumeControl::new(audio, 0.1);

        assert_eq!(volume.set_level(40).level, 15);
        assert_eq!(volume.set_level(3).level, 3);
    }

    #[test]
    fn test_hardware_keys_use_platform_step() {
        let audio = TestAudio::new(7, 15);
        let mut volume = VolumeControl::new(audio, 0.1);

        assert_eq!(volume.key_up().level, 8);
        assert_eq!(volume.key_down().level, 7);
    }

    #[test]
    fn test_zero_range() {
        let audio = TestAudio::new(0, 0);
        let mut volume = VolumeControl::new(audio, 0.1);

        assert_eq!(volume.increase(), VolumeBar { level: 0, max: 0 });
    }
}
