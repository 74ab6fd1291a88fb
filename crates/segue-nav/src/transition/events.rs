//! Transition lifecycle events.
//!
//! The [`TransitionManager`](super::TransitionManager) records an event for
//! every state change. Events can be drained after each frame to observe
//! what the state machine did.
//!
//! # Usage
//!
//! ```ignore
//! runner.tick(dt);
//! for event in manager.drain_events() {
//!     if let TransitionEvent::Completed { target, .. } = event {
//!         println!("arrived at {target}");
//!     }
//! }
//! ```

use serde::Serialize;
use std::collections::VecDeque;

use crate::window::WindowId;

/// Event emitted when a transition changes state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionEvent {
    /// A transition began executing.
    Started {
        source: WindowId,
        target: WindowId,
        reverse: bool,
    },
    /// A transition was queued behind the active one.
    Queued {
        source: WindowId,
        target: WindowId,
        reverse: bool,
    },
    /// A queued transition was discarded by an opposing request.
    Cancelled {
        source: WindowId,
        target: WindowId,
        reverse: bool,
    },
    /// The active transition changed direction. `reverse` is the new direction.
    Inverted {
        source: WindowId,
        target: WindowId,
        reverse: bool,
    },
    /// A transition finished.
    Completed {
        source: WindowId,
        target: WindowId,
        reverse: bool,
    },
    /// The active transition was torn down along with `dropped` queued ones.
    Terminated {
        source: WindowId,
        target: WindowId,
        reverse: bool,
        dropped: usize,
    },
}

impl TransitionEvent {
    pub fn source(&self) -> WindowId {
        match self {
            Self::Started { source, .. }
            | Self::Queued { source, .. }
            | Self::Cancelled { source, .. }
            | Self::Inverted { source, .. }
            | Self::Completed { source, .. }
            | Self::Terminated { source, .. } => *source,
        }
    }

    pub fn target(&self) -> WindowId {
        match self {
            Self::Started { target, .. }
            | Self::Queued { target, .. }
            | Self::Cancelled { target, .. }
            | Self::Inverted { target, .. }
            | Self::Completed { target, .. }
            | Self::Terminated { target, .. } => *target,
        }
    }

    pub fn reverse(&self) -> bool {
        match self {
            Self::Started { reverse, .. }
            | Self::Queued { reverse, .. }
            | Self::Cancelled { reverse, .. }
            | Self::Inverted { reverse, .. }
            | Self::Completed { reverse, .. }
            | Self::Terminated { reverse, .. } => *reverse,
        }
    }

    /// Whether `window` is either side of the transition.
    pub fn involves(&self, window: WindowId) -> bool {
        self.source() == window || self.target() == window
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Most events kept between drains. Older events are discarded first.
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Bounded record of transition events, oldest first.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    events: VecDeque<TransitionEvent>,
}

impl EventLog {
    pub(crate) fn record(&mut self, event: TransitionEvent) {
        if self.events.len() == EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = TransitionEvent> + '_ {
        self.events.drain(..)
    }
}
