//! Playback descriptors.
//!
//! An [`AnimationPlayable`] bundles an animation with how it should be
//! played. It is a plain value: building one does not start anything.

use serde::{Deserialize, Serialize};

use crate::animation::AnimationRef;
use crate::easing::EasingMode;

/// Direction of playback through an animation's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    Forward,
    Reverse,
}

impl Default for PlayMode {
    fn default() -> Self {
        Self::Forward
    }
}

impl PlayMode {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// +1 for forward, -1 for reverse.
    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Whether the runner's time scale applies to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    Scaled,
    Unscaled,
}

impl Default for TimeMode {
    fn default() -> Self {
        Self::Scaled
    }
}

/// An animation plus the parameters to play it with.
#[derive(Debug, Clone)]
pub struct AnimationPlayable {
    animation: AnimationRef,
    start_time: f32,
    play_mode: PlayMode,
    easing: EasingMode,
    playback_speed: f32,
    time_mode: TimeMode,
}

impl AnimationPlayable {
    /// Forward, linear, normal speed, starting at zero.
    pub fn new(animation: AnimationRef) -> Self {
        Self {
            animation,
            start_time: 0.0,
            play_mode: PlayMode::Forward,
            easing: EasingMode::Linear,
            playback_speed: 1.0,
            time_mode: TimeMode::Scaled,
        }
    }

    /// Set the start time in seconds, clamped to the animation length.
    pub fn with_start_time(mut self, start_time: f32) -> Self {
        self.start_time = start_time.clamp(0.0, self.animation.length());
        self
    }

    /// Set the start time as a fraction of the animation length.
    pub fn with_normalized_start_time(self, normalized: f32) -> Self {
        let length = self.animation.length();
        self.with_start_time(normalized.clamp(0.0, 1.0) * length)
    }

    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    pub fn with_easing(mut self, easing: EasingMode) -> Self {
        self.easing = easing;
        self
    }

    /// Set the playback speed multiplier.
    ///
    /// # Panics
    /// Panics if `speed` is not strictly positive.
    pub fn with_speed(mut self, speed: f32) -> Self {
        assert!(speed > 0.0, "Playback speed must be positive");
        self.playback_speed = speed;
        self
    }

    pub fn with_time_mode(mut self, time_mode: TimeMode) -> Self {
        self.time_mode = time_mode;
        self
    }

    /// Flip the play direction, mirroring the start time so playback resumes
    /// from the same visual point.
    pub fn invert(&mut self) {
        self.play_mode = self.play_mode.reversed();
        self.start_time = (self.animation.length() - self.start_time).max(0.0);
    }

    /// Consuming form of [`invert`](Self::invert).
    pub fn inverted(mut self) -> Self {
        self.invert();
        self
    }

    pub fn animation(&self) -> &AnimationRef {
        &self.animation
    }

    pub fn length(&self) -> f32 {
        self.animation.length()
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn easing(&self) -> EasingMode {
        self.easing
    }

    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    pub fn time_mode(&self) -> TimeMode {
        self.time_mode
    }
}

/// Length rounded to whole milliseconds, used for descriptor equality.
pub fn length_ms(length: f32) -> i64 {
    (length * 1000.0).round() as i64
}

impl PartialEq for AnimationPlayable {
    fn eq(&self, other: &Self) -> bool {
        self.animation == other.animation
            && length_ms(self.length()) == length_ms(other.length())
            && self.easing == other.easing
    }
}
