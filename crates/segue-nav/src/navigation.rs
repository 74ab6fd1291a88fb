//! Active-window tracking with grouped back history.
//!
//! This module provides:
//! - A fixed registry of windows keyed by [`WindowId`]
//! - Travel validation (unknown, already active, locked)
//! - Back travel through a grouped [`History`]
//! - A nested lock counter for modal flows
//! - Synchronous [`NavigationEvent`] delivery to subscribed listeners
//!
//! Each history entry carries caller metadata of type `M`. The controller
//! stores the transition used to leave a window there, so going back can
//! replay it in reverse.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::info;

use crate::error::NavigationError;
use crate::history::History;
use crate::window::{Navigable, WindowId};

/// Outcome of a navigation call, delivered to listeners and returned to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationEvent {
    pub success: bool,
    /// Active window before the call.
    pub previous: Option<WindowId>,
    /// Active window after the call.
    pub active: Option<WindowId>,
    pub history_count: usize,
    pub is_locked: bool,
}

/// A window left behind, plus the caller's metadata for that step.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<M> {
    pub window: WindowId,
    pub metadata: M,
}

/// Handle returned by [`WindowNavigation::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationListenerId(u64);

type NavigationListener = Box<dyn FnMut(&NavigationEvent)>;

pub struct WindowNavigation<W: Navigable + ?Sized, M = ()> {
    windows: Vec<Rc<W>>,
    index: HashMap<WindowId, usize>,
    active: Option<WindowId>,
    history: History<HistoryEntry<M>>,
    lock_count: u32,
    listeners: Vec<(NavigationListenerId, NavigationListener)>,
    next_listener: u64,
}

impl<W: Navigable + ?Sized, M> WindowNavigation<W, M> {
    /// Build a registry. Identifiers must be unique.
    pub fn new(windows: impl IntoIterator<Item = Rc<W>>) -> Result<Self, NavigationError> {
        let mut registry = Vec::new();
        let mut index = HashMap::new();
        for window in windows {
            let id = window.id();
            if index.insert(id, registry.len()).is_some() {
                return Err(NavigationError::DuplicateWindow(id));
            }
            registry.push(window);
        }

        Ok(Self {
            windows: registry,
            index,
            active: None,
            history: History::new(),
            lock_count: 0,
            listeners: Vec::new(),
            next_listener: 1,
        })
    }

    /// Set the initial active window without recording history.
    pub fn init(&mut self, initial: WindowId) -> Result<NavigationEvent, NavigationError> {
        self.lookup(initial)?;
        let previous = self.active.replace(initial);
        info!(window = %initial, "navigation initialized");
        Ok(self.emit(true, previous))
    }

    /// Travel to `id`, recording the current window in history with
    /// default metadata.
    pub fn travel(&mut self, id: WindowId) -> Result<NavigationEvent, NavigationError>
    where
        M: Default,
    {
        self.travel_with(id, M::default(), false)
    }

    /// Travel to `id`.
    ///
    /// The window being left is recorded with `metadata` unless
    /// `exclude_from_history` is set or the window opts out of history.
    /// Traveling to the active window or while locked yields a failed event.
    pub fn travel_with(
        &mut self,
        id: WindowId,
        metadata: M,
        exclude_from_history: bool,
    ) -> Result<NavigationEvent, NavigationError> {
        let current = self.active.ok_or(NavigationError::NotInitialized)?;
        let target = self.lookup(id)?;

        if current == id {
            info!(window = %id, "travel rejected: already active");
            return Ok(self.emit(false, Some(current)));
        }
        if self.is_locked() {
            info!(window = %id, locks = self.lock_count, "travel rejected: navigation locked");
            return Ok(self.emit(false, Some(current)));
        }

        let records = !exclude_from_history
            && self
                .window(current)
                .is_some_and(|window| window.supports_history());
        if records {
            self.history.push(HistoryEntry {
                window: current,
                metadata,
            });
        }
        self.active = Some(self.windows[target].id());

        info!(from = %current, to = %id, history = self.history.count(), "traveled");
        Ok(self.emit(true, Some(current)))
    }

    /// Return to the most recent history entry.
    ///
    /// Fails (with a failed event and no metadata) when locked or when the
    /// history is empty.
    pub fn back(&mut self) -> Result<(NavigationEvent, Option<M>), NavigationError> {
        let current = self.active.ok_or(NavigationError::NotInitialized)?;

        if self.is_locked() || self.history.is_empty() {
            info!(locked = self.is_locked(), "back rejected");
            return Ok((self.emit(false, Some(current)), None));
        }

        let entry = self.history.pop()?;
        self.active = Some(entry.window);
        info!(from = %current, to = %entry.window, history = self.history.count(), "went back");
        Ok((self.emit(true, Some(current)), Some(entry.metadata)))
    }

    /// Increment the lock counter. Every `lock` needs a matching `unlock`.
    pub fn lock(&mut self) {
        self.lock_count = self.lock_count.saturating_add(1);
    }

    /// Decrement the lock counter. Returns `false` when it was already zero.
    pub fn unlock(&mut self) -> bool {
        if self.lock_count == 0 {
            return false;
        }
        self.lock_count -= 1;
        true
    }

    pub fn is_locked(&self) -> bool {
        self.lock_count > 0
    }

    pub fn lock_count(&self) -> u32 {
        self.lock_count
    }

    /// Forget the active window and all history.
    pub fn clear(&mut self) {
        self.active = None;
        self.history.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Open a history group for a modal sub-flow.
    pub fn start_history_group(&mut self) {
        self.history.start_new_group();
    }

    /// Discard the latest history group. Returns `false` for the base group.
    pub fn clear_history_group(&mut self) -> bool {
        self.history.clear_latest_group()
    }

    pub fn can_go_back(&self) -> bool {
        !self.is_locked() && !self.history.is_empty()
    }

    pub fn history_count(&self) -> usize {
        self.history.count()
    }

    pub fn history(&self) -> &History<HistoryEntry<M>> {
        &self.history
    }

    pub fn active(&self) -> Option<WindowId> {
        self.active
    }

    pub fn active_window(&self) -> Option<&Rc<W>> {
        self.active.and_then(|id| self.window(id))
    }

    pub fn window(&self, id: WindowId) -> Option<&Rc<W>> {
        self.index.get(&id).map(|&i| &self.windows[i])
    }

    pub fn windows(&self) -> impl Iterator<Item = &Rc<W>> {
        self.windows.iter()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.index.contains_key(&id)
    }

    /// Add a listener that receives every navigation event.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&NavigationEvent) + 'static,
    ) -> NavigationListenerId {
        let id = NavigationListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: NavigationListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn lookup(&self, id: WindowId) -> Result<usize, NavigationError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(NavigationError::UnknownWindow(id))
    }

    fn emit(&mut self, success: bool, previous: Option<WindowId>) -> NavigationEvent {
        let event = NavigationEvent {
            success,
            previous,
            active: self.active,
            history_count: self.history.count(),
            is_locked: self.is_locked(),
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
        event
    }
}
