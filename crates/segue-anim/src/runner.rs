//! Frame driver for active animation players.
//!
//! The runner advances every registered player once per [`tick`]. Players
//! register themselves when they start playing and drop out when they stop
//! or complete.
//!
//! [`tick`]: AnimationRunner::tick

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::player::{AnimationPlayer, PlayerId};

thread_local! {
    static GLOBAL_RUNNER: AnimationRunner = AnimationRunner::new();
}

#[derive(Debug)]
pub(crate) struct RunnerState {
    pub(crate) frame: u64,
    pub(crate) time_scale: f32,
    members: HashSet<PlayerId>,
    active: Vec<AnimationPlayer>,
}

/// Shared handle to the frame driver.
#[derive(Debug, Clone)]
pub struct AnimationRunner {
    state: Rc<RefCell<RunnerState>>,
}

impl Default for AnimationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationRunner {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RunnerState {
                frame: 0,
                time_scale: 1.0,
                members: HashSet::new(),
                active: Vec::new(),
            })),
        }
    }

    /// The default runner for the current thread.
    pub fn global() -> Self {
        GLOBAL_RUNNER.with(Clone::clone)
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.state.borrow().frame
    }

    pub fn time_scale(&self) -> f32 {
        self.state.borrow().time_scale
    }

    /// Scale applied to players in [`TimeMode::Scaled`](crate::playable::TimeMode::Scaled).
    pub fn set_time_scale(&self, time_scale: f32) {
        self.state.borrow_mut().time_scale = time_scale.max(0.0);
    }

    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    pub fn is_registered(&self, player: &AnimationPlayer) -> bool {
        self.state.borrow().members.contains(&player.id())
    }

    /// Advance one frame, updating every registered player in registration
    /// order.
    ///
    /// Players registered while the tick is running (for example from a
    /// completion callback) are first updated on the next tick.
    pub fn tick(&self, delta: f32) {
        let players = {
            let mut state = self.state.borrow_mut();
            state.frame += 1;
            state.active.clone()
        };

        for player in players {
            player.update(delta);
        }
    }

    /// Register a player. Registering twice is a no-op.
    pub(crate) fn register(&self, player: &AnimationPlayer) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.members.insert(player.id()) {
            return false;
        }
        state.active.push(player.clone());
        true
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<RunnerState>> {
        Rc::downgrade(&self.state)
    }
}

pub(crate) fn unregister(state: &RefCell<RunnerState>, id: PlayerId) -> bool {
    let mut state = state.borrow_mut();
    if !state.members.remove(&id) {
        return false;
    }
    state.active.retain(|p| p.id() != id);
    true
}

pub(crate) fn register_weak(state: &Weak<RefCell<RunnerState>>, player: &AnimationPlayer) -> bool {
    match state.upgrade() {
        Some(state) => AnimationRunner { state }.register(player),
        None => false,
    }
}
