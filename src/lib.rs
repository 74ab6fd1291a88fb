//! Segue: frame-stepped window navigation and transitions.
//!
//! This facade re-exports the workspace crates:
//! - [`anim`]: easing, animations, players and the frame runner
//! - [`nav`]: history, navigation, transitions and the controller
//! - [`config`]: `segue.toml` and environment configuration
//!
//! The most common types are also available at the crate root.

pub use segue_anim as anim;
pub use segue_config as config;
pub use segue_nav as nav;

pub use segue_anim::{
    AnimationPlayable, AnimationPlayer, AnimationRunner, AnimationType, EasingMode, PlayMode,
    VisualState,
};
pub use segue_config::SegueConfig;
pub use segue_nav::{
    Controller, ControllerError, NavigationEvent, Screen, TransitionEvent, WindowId,
    WindowTransition,
};
