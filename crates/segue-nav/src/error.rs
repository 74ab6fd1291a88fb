//! Error types for navigation and transitions.
//!
//! These errors signal caller contract violations. Expected negative
//! outcomes, such as traveling to the already active window, are reported
//! through failed [`NavigationEvent`](crate::navigation::NavigationEvent)s
//! instead.

use thiserror::Error;

use crate::window::WindowId;

/// Errors raised by [`History`](crate::history::History).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Popped from a history with no entries.
    #[error("history is empty")]
    Empty,
}

/// Errors raised by [`WindowNavigation`](crate::navigation::WindowNavigation).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Navigation was used before `init`.
    #[error("navigation has not been initialized")]
    NotInitialized,

    /// The window is not part of the registry.
    #[error("unknown window: {0}")]
    UnknownWindow(WindowId),

    /// Two registered windows share an identifier.
    #[error("window registered twice: {0}")]
    DuplicateWindow(WindowId),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors raised by [`TransitionManager`](crate::transition::TransitionManager).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Source and target are the same window.
    #[error("transition source and target are both {0}")]
    SameWindow(WindowId),

    /// The request repeats the leading transition exactly.
    #[error("transition {from} -> {to} (reverse: {reverse}) is already the leading transition")]
    Duplicate {
        from: WindowId,
        to: WindowId,
        reverse: bool,
    },

    /// The request does not start where the leading transition ends.
    #[error("transition must start from {expected}, but starts from {found}")]
    InvalidChain { expected: WindowId, found: WindowId },

    /// Inversion was requested for a transition without animated sides.
    #[error("the active transition has no animated side to invert")]
    NothingToInvert,

    /// Inversion was requested while idle.
    #[error("no transition is active")]
    NotActive,
}

/// Errors raised by [`Controller`](crate::controller::Controller).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The controller was used before `init`.
    #[error("controller has no active screen")]
    NoActiveScreen,
}

pub type Result<T, E = ControllerError> = std::result::Result<T, E>;
