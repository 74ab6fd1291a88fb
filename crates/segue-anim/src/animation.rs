//! The animation capability and the generic animation types.
//!
//! An [`Animation`] is a stateless evaluator: it knows its length and how to
//! apply a normalized time to whatever it animates. Playback state lives in
//! [`AnimationPlayer`](crate::player::AnimationPlayer).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Time-based visual effect.
///
/// `evaluate` receives eased normalized time where `0.0` is the hidden end
/// state and `1.0` the fully shown one. Closing a window plays the same
/// animation in reverse.
pub trait Animation {
    /// Length in seconds, never negative.
    fn length(&self) -> f32;

    /// Apply the visual state for `normalized_time` in `[0, 1]`.
    fn evaluate(&mut self, normalized_time: f32);

    /// Called before a play starts from idle. Use it to cache
    /// layout-dependent values such as off-screen offsets.
    fn prepare(&mut self) {}
}

/// Shared handle to an [`Animation`].
///
/// Equality is identity: two handles are equal when they point at the same
/// animation instance.
#[derive(Clone)]
pub struct AnimationRef(Rc<RefCell<dyn Animation>>);

impl AnimationRef {
    /// Wrap an animation in a shareable handle.
    pub fn new<A: Animation + 'static>(animation: A) -> Self {
        Self(Rc::new(RefCell::new(animation)))
    }

    pub fn length(&self) -> f32 {
        self.0.borrow().length().max(0.0)
    }

    pub fn evaluate(&self, normalized_time: f32) {
        self.0.borrow_mut().evaluate(normalized_time);
    }

    pub fn prepare(&self) {
        self.0.borrow_mut().prepare();
    }

    /// Whether both handles refer to the same animation instance.
    pub fn ptr_eq(&self, other: &AnimationRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for AnimationRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for AnimationRef {}

impl fmt::Debug for AnimationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRef")
            .field("addr", &self.addr())
            .field("length", &self.length())
            .finish()
    }
}

/// Generic animation kinds that a window may know how to build for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    FlipHorizontal,
    FlipVertical,
    Expand,
}

impl Default for AnimationType {
    fn default() -> Self {
        Self::Fade
    }
}

impl AnimationType {
    pub const ALL: [AnimationType; 8] = [
        Self::Fade,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Expand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
            Self::SlideUp => "slide_up",
            Self::SlideDown => "slide_down",
            Self::FlipHorizontal => "flip_horizontal",
            Self::FlipVertical => "flip_vertical",
            Self::Expand => "expand",
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an animation type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown animation type: {0}")]
pub struct ParseAnimationTypeError(pub String);

impl FromStr for AnimationType {
    type Err = ParseAnimationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseAnimationTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        length: f32,
        calls: Rc<RefCell<Vec<f32>>>,
    }

    impl Animation for Counter {
        fn length(&self) -> f32 {
            self.length
        }

        fn evaluate(&mut self, normalized_time: f32) {
            self.calls.borrow_mut().push(normalized_time);
        }
    }

    #[test]
    fn test_animation_ref_identity() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let a = AnimationRef::new(Counter { length: 1.0, calls: calls.clone() });
        let b = AnimationRef::new(Counter { length: 1.0, calls });
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_animation_ref_forwards_calls() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let anim = AnimationRef::new(Counter { length: 0.5, calls: calls.clone() });
        anim.evaluate(0.25);
        anim.evaluate(1.0);
        assert_eq!(*calls.borrow(), vec![0.25, 1.0]);
        assert_eq!(anim.length(), 0.5);
    }

    #[test]
    fn test_negative_length_reads_as_zero() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let anim = AnimationRef::new(Counter { length: -2.0, calls });
        assert_eq!(anim.length(), 0.0);
    }

    #[test]
    fn test_animation_type_parse() {
        assert_eq!("slide-left".parse::<AnimationType>(), Ok(AnimationType::SlideLeft));
        assert_eq!("Expand".parse::<AnimationType>(), Ok(AnimationType::Expand));
        assert!("spin".parse::<AnimationType>().is_err());
        assert_eq!(AnimationType::default(), AnimationType::Fade);
    }
}
