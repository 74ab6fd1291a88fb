//! Window capability contracts.
//!
//! Navigation only needs a window's identity ([`Navigable`]); transitions
//! additionally need to open and close it with an animation ([`Window`]).

use std::fmt;

use serde::Serialize;
use segue_anim::{AnimationPlayable, AnimationPlayer, AnimationRef, AnimationType};

/// Stable identifier of a window inside a navigation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(&'static str);

impl WindowId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Visibility lifecycle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl Default for AccessState {
    fn default() -> Self {
        Self::Closed
    }
}

impl AccessState {
    /// Whether the window is visible or becoming visible.
    pub fn is_shown(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }

    pub fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// One-shot notification fired when an open or close finishes.
pub type AccessCallback = Box<dyn FnOnce()>;

/// Anything that can be the target of navigation.
pub trait Navigable {
    fn id(&self) -> WindowId;

    /// Whether leaving this window records it in history.
    fn supports_history(&self) -> bool {
        true
    }
}

/// A window that transitions can open and close.
///
/// Every method takes `&self`: windows are shared between the navigation
/// registry and an active transition, so implementations use interior
/// mutability.
pub trait Window: Navigable {
    /// Show the window. Without a playable the window opens synchronously.
    ///
    /// Returns `false` when nothing changed.
    fn open(&self, playable: Option<AnimationPlayable>, on_complete: Option<AccessCallback>) -> bool;

    /// Hide the window. Without a playable the window closes synchronously.
    ///
    /// Returns `false` when nothing changed.
    fn close(&self, playable: Option<AnimationPlayable>, on_complete: Option<AccessCallback>)
    -> bool;

    fn sort_order(&self) -> i32;

    fn set_sort_order(&self, order: i32);

    fn is_supported_animation_type(&self, kind: AnimationType) -> bool;

    /// Type used in place of an unsupported one.
    fn fallback_animation_type(&self) -> AnimationType;

    /// Build (or reuse) an animation of `kind` for this window.
    fn create_animation(&self, kind: AnimationType, length: f32) -> AnimationRef;

    /// Jump an in-flight open or close to its end. Returns `false` when idle.
    fn skip_access_animation(&self) -> bool;

    /// The player that drives this window's open and close animations.
    fn animator(&self) -> &AnimationPlayer;

    fn access_state(&self) -> AccessState;
}
