//! Coordinated window transitions.
//!
//! This module provides:
//! - **Parameters**: [`WindowTransition`] and the per-side [`TransitionAnimation`]
//! - **Requests**: [`TransitionRequest`] binding a transition to its two windows
//! - **Manager**: [`TransitionManager`], the state machine that plays, queues,
//!   inverts and finalizes transitions
//! - **Events**: [`TransitionEvent`]s recorded for every state change, keeping
//!   the latest [`EVENT_LOG_CAPACITY`] until drained
//!
//! # Usage
//!
//! ```ignore
//! let manager = TransitionManager::new();
//! let fade = WindowTransition::new(0.5, EasingMode::EaseInOut).with_animation(AnimationType::Fade);
//!
//! manager.handle_new_transition(TransitionRequest::new(home, settings, fade), false)?;
//! runner.tick(dt); // repeated until the transition completes
//! ```

mod events;
mod manager;
mod params;

pub use events::{EVENT_LOG_CAPACITY, TransitionEvent};
pub use manager::{TransitionManager, TransitionOutcome};
pub use params::{
    AnimationTargets, QueuedTransition, SortPriority, TransitionAnimation, TransitionRequest,
    WindowTransition,
};
