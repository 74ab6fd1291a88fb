//! Window navigation and transition orchestration for Segue.
//!
//! This crate provides:
//! - **History**: a grouped back-stack for modal sub-flows
//! - **Navigation**: active-window tracking, travel validation and locking
//! - **Windows**: the [`Window`] capability contract and the concrete [`Screen`]
//! - **Transitions**: the state machine that animates one window out and
//!   another in, with queueing and in-place inversion
//! - **Controller**: the facade application code talks to
//!
//! # Architecture
//!
//! ```text
//! Controller::open_screen(id)
//!   ├── WindowNavigation::travel_with   (validate, push history, emit event)
//!   └── TransitionManager::handle_new_transition
//!         └── Window::open / Window::close(AnimationPlayable)
//!               └── AnimationPlayer (driven by AnimationRunner::tick)
//!                     └── completion -> TransitionManager finalizes, dequeues next
//! ```

pub mod controller;
pub mod error;
pub mod history;
pub mod navigation;
pub mod screen;
pub mod transition;
pub mod window;

pub use controller::Controller;
pub use error::{ControllerError, HistoryError, NavigationError, Result, TransitionError};
pub use history::History;
pub use navigation::{HistoryEntry, NavigationEvent, NavigationListenerId, WindowNavigation};
pub use screen::{Screen, ScreenOptions};
pub use transition::{
    AnimationTargets, EVENT_LOG_CAPACITY, SortPriority, TransitionAnimation, TransitionEvent,
    TransitionManager, TransitionOutcome, TransitionRequest, WindowTransition,
};
pub use window::{AccessCallback, AccessState, Navigable, Window, WindowId};

static_assertions::assert_impl_all!(WindowId: Copy, Send, Sync);
static_assertions::assert_impl_all!(NavigationEvent: Copy);
static_assertions::assert_not_impl_any!(Controller: Send, Sync);
static_assertions::assert_not_impl_any!(TransitionManager<Screen>: Send, Sync);
