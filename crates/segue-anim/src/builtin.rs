//! Built-in fade, slide, flip and expand animations.
//!
//! All of them treat normalized time `1.0` as the resting, fully shown state
//! so the same instance serves both entry (forward) and exit (reverse).

use crate::animation::{Animation, AnimationRef, AnimationType};
use crate::surface::SharedSurface;

/// Build the stock animation for `kind` driving `surface`.
pub fn create(kind: AnimationType, surface: SharedSurface, length: f32) -> AnimationRef {
    match kind {
        AnimationType::Fade => AnimationRef::new(FadeAnimation::new(surface, length)),
        AnimationType::SlideLeft => {
            AnimationRef::new(SlideAnimation::new(surface, length, SlideDirection::Left))
        }
        AnimationType::SlideRight => {
            AnimationRef::new(SlideAnimation::new(surface, length, SlideDirection::Right))
        }
        AnimationType::SlideUp => {
            AnimationRef::new(SlideAnimation::new(surface, length, SlideDirection::Up))
        }
        AnimationType::SlideDown => {
            AnimationRef::new(SlideAnimation::new(surface, length, SlideDirection::Down))
        }
        AnimationType::FlipHorizontal => {
            AnimationRef::new(FlipAnimation::new(surface, length, FlipAxis::Horizontal))
        }
        AnimationType::FlipVertical => {
            AnimationRef::new(FlipAnimation::new(surface, length, FlipAxis::Vertical))
        }
        AnimationType::Expand => AnimationRef::new(ExpandAnimation::new(surface, length)),
    }
}

/// Opacity from transparent to opaque.
pub struct FadeAnimation {
    surface: SharedSurface,
    length: f32,
}

impl FadeAnimation {
    pub fn new(surface: SharedSurface, length: f32) -> Self {
        Self { surface, length }
    }
}

impl Animation for FadeAnimation {
    fn length(&self) -> f32 {
        self.length
    }

    fn evaluate(&mut self, normalized_time: f32) {
        let mut surface = self.surface.borrow_mut();
        surface.set_opacity(normalized_time);
        surface.set_visible(normalized_time > 0.0);
    }
}

/// Direction of travel while the surface enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Moves the surface from just off-screen to its resting position.
pub struct SlideAnimation {
    surface: SharedSurface,
    length: f32,
    direction: SlideDirection,
    start_offset: (f32, f32),
}

impl SlideAnimation {
    pub fn new(surface: SharedSurface, length: f32, direction: SlideDirection) -> Self {
        Self {
            surface,
            length,
            direction,
            start_offset: (0.0, 0.0),
        }
    }

    fn offscreen_offset(&self) -> (f32, f32) {
        let (width, height) = self.surface.borrow().size();
        match self.direction {
            SlideDirection::Left => (width, 0.0),
            SlideDirection::Right => (-width, 0.0),
            SlideDirection::Up => (0.0, height),
            SlideDirection::Down => (0.0, -height),
        }
    }
}

impl Animation for SlideAnimation {
    fn length(&self) -> f32 {
        self.length
    }

    fn prepare(&mut self) {
        self.start_offset = self.offscreen_offset();
    }

    fn evaluate(&mut self, normalized_time: f32) {
        let remaining = 1.0 - normalized_time;
        let mut surface = self.surface.borrow_mut();
        surface.set_opacity(1.0);
        surface.set_offset(self.start_offset.0 * remaining, self.start_offset.1 * remaining);
        surface.set_visible(normalized_time > 0.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Scales one axis from edge-on to flat, like a card turning over.
pub struct FlipAnimation {
    surface: SharedSurface,
    length: f32,
    axis: FlipAxis,
}

impl FlipAnimation {
    pub fn new(surface: SharedSurface, length: f32, axis: FlipAxis) -> Self {
        Self { surface, length, axis }
    }
}

impl Animation for FlipAnimation {
    fn length(&self) -> f32 {
        self.length
    }

    fn evaluate(&mut self, normalized_time: f32) {
        let mut surface = self.surface.borrow_mut();
        surface.set_opacity(1.0);
        match self.axis {
            FlipAxis::Horizontal => surface.set_scale(normalized_time, 1.0),
            FlipAxis::Vertical => surface.set_scale(1.0, normalized_time),
        }
        surface.set_visible(normalized_time > 0.0);
    }
}

/// Grows the surface from its center.
pub struct ExpandAnimation {
    surface: SharedSurface,
    length: f32,
}

impl ExpandAnimation {
    pub fn new(surface: SharedSurface, length: f32) -> Self {
        Self { surface, length }
    }
}

impl Animation for ExpandAnimation {
    fn length(&self) -> f32 {
        self.length
    }

    fn evaluate(&mut self, normalized_time: f32) {
        let mut surface = self.surface.borrow_mut();
        surface.set_opacity(normalized_time);
        surface.set_scale(normalized_time, normalized_time);
        surface.set_visible(normalized_time > 0.0);
    }
}
