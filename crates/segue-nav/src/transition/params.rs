//! Transition parameters.

use std::fmt;
use std::rc::Rc;

use segue_anim::playable::length_ms;
use segue_anim::{AnimationRef, AnimationType, EasingMode};
use segue_config::TransitionsConfig;

pub use segue_config::SortPriority;

use crate::window::{Navigable, WindowId};

/// The animation for one side of a transition.
#[derive(Debug, Clone)]
pub enum TransitionAnimation {
    /// A named type the window builds itself, subject to its support list.
    Generic(AnimationType),
    /// A caller-supplied instance, played as is.
    Custom(AnimationRef),
}

impl PartialEq for TransitionAnimation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Generic(a), Self::Generic(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<AnimationType> for TransitionAnimation {
    fn from(kind: AnimationType) -> Self {
        Self::Generic(kind)
    }
}

impl From<AnimationRef> for TransitionAnimation {
    fn from(animation: AnimationRef) -> Self {
        Self::Custom(animation)
    }
}

/// Which sides of a transition animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTargets {
    None,
    Source,
    Target,
    Both,
}

impl AnimationTargets {
    pub fn from_sides(source: bool, target: bool) -> Self {
        match (source, target) {
            (false, false) => Self::None,
            (true, false) => Self::Source,
            (false, true) => Self::Target,
            (true, true) => Self::Both,
        }
    }

    pub fn animates_source(self) -> bool {
        matches!(self, Self::Source | Self::Both)
    }

    pub fn animates_target(self) -> bool {
        matches!(self, Self::Target | Self::Both)
    }
}

/// How to get from one window to another.
///
/// `exit` plays on the source window and `entry` on the target. Equality
/// compares length (to the millisecond), easing and animation identity.
#[derive(Debug, Clone)]
pub struct WindowTransition {
    /// Seconds.
    pub length: f32,
    pub easing: EasingMode,
    pub exit: Option<TransitionAnimation>,
    pub entry: Option<TransitionAnimation>,
    pub sort_priority: SortPriority,
}

impl Default for WindowTransition {
    fn default() -> Self {
        Self::from(&TransitionsConfig::default())
    }
}

impl From<&TransitionsConfig> for WindowTransition {
    fn from(config: &TransitionsConfig) -> Self {
        Self::new(config.default_length, config.default_easing)
            .with_animation(config.default_animation)
            .with_sort_priority(config.sort_priority)
    }
}

impl WindowTransition {
    /// A transition with no animated side.
    pub fn new(length: f32, easing: EasingMode) -> Self {
        Self {
            length: length.max(0.0),
            easing,
            exit: None,
            entry: None,
            sort_priority: SortPriority::Auto,
        }
    }

    /// Swap windows without animating.
    pub fn instant() -> Self {
        Self::new(0.0, EasingMode::Linear)
    }

    /// Use `kind` for both exit and entry.
    pub fn with_animation(self, kind: AnimationType) -> Self {
        self.with_exit(kind).with_entry(kind)
    }

    pub fn with_exit(mut self, exit: impl Into<TransitionAnimation>) -> Self {
        self.exit = Some(exit.into());
        self
    }

    pub fn with_entry(mut self, entry: impl Into<TransitionAnimation>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn with_sort_priority(mut self, sort_priority: SortPriority) -> Self {
        self.sort_priority = sort_priority;
        self
    }

    pub fn animation_targets(&self) -> AnimationTargets {
        AnimationTargets::from_sides(self.exit.is_some(), self.entry.is_some())
    }

    /// Sort orders `(source, target)`; the side on top gets 1.
    pub fn sort_orders(&self) -> (i32, i32) {
        match self.sort_priority {
            SortPriority::Source => (1, 0),
            SortPriority::Target => (0, 1),
            SortPriority::Auto => match self.animation_targets() {
                AnimationTargets::Source => (1, 0),
                _ => (0, 1),
            },
        }
    }
}

impl PartialEq for WindowTransition {
    fn eq(&self, other: &Self) -> bool {
        length_ms(self.length) == length_ms(other.length)
            && self.easing == other.easing
            && self.exit == other.exit
            && self.entry == other.entry
    }
}

/// A transition bound to the two windows it moves between.
///
/// Played forward, `source` closes and `target` opens. Played in reverse
/// the same animations run backwards: `target` closes and `source` opens.
pub struct TransitionRequest<W: ?Sized> {
    pub source: Rc<W>,
    pub target: Rc<W>,
    pub transition: WindowTransition,
}

impl<W: ?Sized> Clone for TransitionRequest<W> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            target: Rc::clone(&self.target),
            transition: self.transition.clone(),
        }
    }
}

impl<W: Navigable + ?Sized> fmt::Debug for TransitionRequest<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRequest")
            .field("source", &self.source.id())
            .field("target", &self.target.id())
            .field("transition", &self.transition)
            .finish()
    }
}

impl<W: Navigable + ?Sized> TransitionRequest<W> {
    pub fn new(source: Rc<W>, target: Rc<W>, transition: WindowTransition) -> Self {
        Self {
            source,
            target,
            transition,
        }
    }

    pub fn source_id(&self) -> WindowId {
        self.source.id()
    }

    pub fn target_id(&self) -> WindowId {
        self.target.id()
    }

    /// The window shown before this step runs.
    pub fn visible_before(&self, reverse: bool) -> WindowId {
        if reverse { self.target_id() } else { self.source_id() }
    }

    /// The window shown once this step has run.
    pub fn visible_after(&self, reverse: bool) -> WindowId {
        if reverse { self.source_id() } else { self.target_id() }
    }

    /// Same windows and equal transition parameters.
    pub fn matches(&self, other: &Self) -> bool {
        self.source_id() == other.source_id()
            && self.target_id() == other.target_id()
            && self.transition == other.transition
    }
}

/// A request waiting behind the active transition.
pub struct QueuedTransition<W: ?Sized> {
    pub request: TransitionRequest<W>,
    pub reverse: bool,
}

impl<W: ?Sized> Clone for QueuedTransition<W> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            reverse: self.reverse,
        }
    }
}

impl<W: Navigable + ?Sized> fmt::Debug for QueuedTransition<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTransition")
            .field("request", &self.request)
            .field("reverse", &self.reverse)
            .finish()
    }
}
