//! Time-driven animation primitives for Segue.
//!
//! This crate provides:
//! - **Easing**: named curves over normalized time and their inverses
//! - **Animations**: the [`Animation`] evaluator trait plus stock fade, slide,
//!   flip and expand animations over a [`Surface`]
//! - **Playables**: immutable descriptors of how to play an animation
//! - **Players**: stateful playback with completion listeners
//! - **Runner**: the frame driver that advances active players
//!
//! # Architecture
//!
//! ```text
//! AnimationRunner::tick(dt)
//!   └── AnimationPlayer::update(dt)   (registration order, once per frame)
//!         ├── EasingMode::apply(t)
//!         ├── Animation::evaluate(eased)
//!         └── completion listeners    (after returning to idle)
//! ```
//!
//! Everything is single-threaded: handles are `Rc`-based and not `Send`.

pub mod animation;
pub mod builtin;
pub mod easing;
pub mod playable;
pub mod player;
pub mod runner;
pub mod surface;

pub use animation::{Animation, AnimationRef, AnimationType, ParseAnimationTypeError};
pub use easing::{EasingMode, ParseEasingError, inverse_easing_mode, perform_ease};
pub use playable::{AnimationPlayable, PlayMode, TimeMode};
pub use player::{AnimationPlayer, CompletionCallback, ListenerId, PlaybackData, PlayerId};
pub use runner::AnimationRunner;
pub use surface::{SharedSurface, Surface, VisualState};

static_assertions::assert_impl_all!(EasingMode: Copy, Send, Sync);
static_assertions::assert_impl_all!(AnimationType: Copy, Send, Sync);
static_assertions::assert_not_impl_any!(AnimationPlayer: Send, Sync);
static_assertions::assert_not_impl_any!(AnimationRunner: Send, Sync);
