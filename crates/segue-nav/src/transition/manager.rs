//! Transition orchestration.
//!
//! A [`TransitionManager`] plays one transition at a time. A transition
//! drives up to two players: the exit animation on the source window and the
//! entry animation on the target. Requests arriving while a transition is
//! active are compared against the *leading* transition (the queue tail, or
//! the active transition when nothing is queued):
//!
//! ```text
//! same windows, same direction      -> Err(Duplicate)
//! same windows, opposite direction  -> pop the queue tail, or invert the active transition
//! starts where the leading one ends -> queued, started automatically later
//! anything else                     -> Err(InvalidChain)
//! ```
//!
//! The manager subscribes to each animating window's player and only
//! finalizes once every animating side has reported completion. Stale
//! completions from an earlier execution are discarded by epoch.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use segue_anim::{AnimationPlayable, AnimationRef, ListenerId, PlayMode};
use tracing::{debug, warn};

use super::events::{EventLog, TransitionEvent};
use super::params::{AnimationTargets, QueuedTransition, TransitionAnimation, TransitionRequest};
use crate::error::TransitionError;
use crate::window::{Window, WindowId};

/// What a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Executed immediately.
    Started,
    /// Appended to the queue.
    Queued,
    /// Discarded the opposing queued transition.
    Cancelled,
    /// Reversed the active transition in place.
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

struct ActiveTransition<W: ?Sized> {
    request: TransitionRequest<W>,
    reverse: bool,
    exit: Option<AnimationRef>,
    entry: Option<AnimationRef>,
    source_listener: Option<ListenerId>,
    target_listener: Option<ListenerId>,
    epoch: u64,
}

impl<W: Window + ?Sized> ActiveTransition<W> {
    fn targets(&self) -> AnimationTargets {
        AnimationTargets::from_sides(self.exit.is_some(), self.entry.is_some())
    }

    fn window(&self, side: Side) -> &Rc<W> {
        match side {
            Side::Source => &self.request.source,
            Side::Target => &self.request.target,
        }
    }

    fn listener_mut(&mut self, side: Side) -> &mut Option<ListenerId> {
        match side {
            Side::Source => &mut self.source_listener,
            Side::Target => &mut self.target_listener,
        }
    }

    fn is_live(&self) -> bool {
        self.source_listener.is_some() || self.target_listener.is_some()
    }

    /// Forward progress in `[0, 1]`, read from the target side when it
    /// animates.
    fn progress(&self) -> f32 {
        if self.entry.is_some() {
            self.request.target.animator().normalized_time()
        } else {
            1.0 - self.request.source.animator().normalized_time()
        }
    }

    /// Remove this manager's listeners from both players.
    fn unhook(&mut self) {
        for side in [Side::Source, Side::Target] {
            if let Some(id) = self.listener_mut(side).take() {
                self.window(side).animator().unsubscribe(id);
            }
        }
    }

    /// Close the side that is leaving without an animation of its own.
    fn close_static_side(&self) {
        let (closing, animated) = if self.reverse {
            (&self.request.target, self.entry.is_some())
        } else {
            (&self.request.source, self.exit.is_some())
        };
        if !animated {
            closing.close(None, None);
        }
    }

    fn ids(&self) -> (WindowId, WindowId) {
        (self.request.source_id(), self.request.target_id())
    }
}

struct Leading {
    source: WindowId,
    target: WindowId,
    reverse: bool,
    visible_after: WindowId,
    queued: bool,
}

struct ManagerState<W: ?Sized> {
    active: Option<ActiveTransition<W>>,
    queue: VecDeque<QueuedTransition<W>>,
    epoch: u64,
}

struct ManagerCore<W: ?Sized> {
    state: RefCell<ManagerState<W>>,
    events: RefCell<EventLog>,
}

/// Shared handle to the transition state machine. Clones drive the same
/// state.
pub struct TransitionManager<W: Window + ?Sized + 'static> {
    core: Rc<ManagerCore<W>>,
}

impl<W: Window + ?Sized + 'static> Clone for TransitionManager<W> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<W: Window + ?Sized + 'static> Default for TransitionManager<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Window + ?Sized + 'static> TransitionManager<W> {
    pub fn new() -> Self {
        Self {
            core: Rc::new(ManagerCore {
                state: RefCell::new(ManagerState {
                    active: None,
                    queue: VecDeque::new(),
                    epoch: 0,
                }),
                events: RefCell::new(EventLog::default()),
            }),
        }
    }

    /// What [`handle_new_transition`](Self::handle_new_transition) would do
    /// with `request`, without changing any state.
    pub fn check_transition(
        &self,
        request: &TransitionRequest<W>,
        reverse: bool,
    ) -> Result<TransitionOutcome, TransitionError> {
        let source = request.source_id();
        let target = request.target_id();
        if source == target {
            return Err(TransitionError::SameWindow(source));
        }

        let Some(leading) = self.leading() else {
            return Ok(TransitionOutcome::Started);
        };

        if leading.source == source && leading.target == target {
            if leading.reverse == reverse {
                return Err(TransitionError::Duplicate {
                    from: source,
                    to: target,
                    reverse,
                });
            }
            if leading.queued {
                return Ok(TransitionOutcome::Cancelled);
            }
            if self.active_animation_targets() == Some(AnimationTargets::None) {
                return Err(TransitionError::NothingToInvert);
            }
            return Ok(TransitionOutcome::Inverted);
        }

        let starts_from = request.visible_before(reverse);
        if starts_from != leading.visible_after {
            return Err(TransitionError::InvalidChain {
                expected: leading.visible_after,
                found: starts_from,
            });
        }
        Ok(TransitionOutcome::Queued)
    }

    /// Start, queue, cancel or invert according to the leading transition.
    ///
    /// Errors are caller contract violations and leave the state untouched.
    pub fn handle_new_transition(
        &self,
        request: TransitionRequest<W>,
        reverse: bool,
    ) -> Result<TransitionOutcome, TransitionError> {
        let outcome = self.check_transition(&request, reverse)?;
        let source = request.source_id();
        let target = request.target_id();

        match outcome {
            TransitionOutcome::Started => {
                self.push_event(TransitionEvent::Started { source, target, reverse });
                self.execute(request, reverse);
            }
            TransitionOutcome::Cancelled => {
                let cancelled = self.core.state.borrow_mut().queue.pop_back();
                if let Some(cancelled) = cancelled {
                    debug!(%source, %target, "opposing request cancels queued transition");
                    self.push_event(TransitionEvent::Cancelled {
                        source,
                        target,
                        reverse: cancelled.reverse,
                    });
                }
            }
            TransitionOutcome::Inverted => self.invert_active()?,
            TransitionOutcome::Queued => {
                debug!(%source, %target, reverse, "queueing transition");
                self.core
                    .state
                    .borrow_mut()
                    .queue
                    .push_back(QueuedTransition { request, reverse });
                self.push_event(TransitionEvent::Queued { source, target, reverse });
            }
        }
        Ok(outcome)
    }

    /// Reverse the active transition, resuming from its current progress.
    pub fn invert_active(&self) -> Result<(), TransitionError> {
        let active = {
            let mut state = self.core.state.borrow_mut();
            match state.active.as_ref() {
                None => return Err(TransitionError::NotActive),
                Some(active) if active.targets() == AnimationTargets::None => {
                    return Err(TransitionError::NothingToInvert);
                }
                Some(_) => {}
            }
            state.active.take()
        };
        let Some(mut active) = active else {
            return Err(TransitionError::NotActive);
        };

        let progress = active.progress();
        active.unhook();
        let reverse = !active.reverse;
        let (source, target) = active.ids();
        debug!(%source, %target, reverse, progress, "inverting active transition");

        self.push_event(TransitionEvent::Inverted { source, target, reverse });
        let ActiveTransition {
            request,
            exit,
            entry,
            ..
        } = active;
        self.run(request, reverse, exit, entry, progress);
        Ok(())
    }

    /// Tear down the active transition and drop the queue.
    ///
    /// With `end_active_animations` the in-flight players jump to their end
    /// first; otherwise they keep playing unobserved. Returns `false` when
    /// idle.
    pub fn terminate(&self, end_active_animations: bool) -> bool {
        let (active, dropped) = {
            let mut state = self.core.state.borrow_mut();
            let dropped = state.queue.len();
            state.queue.clear();
            (state.active.take(), dropped)
        };
        let Some(mut active) = active else {
            return false;
        };

        let live = [
            (Side::Source, active.source_listener.is_some()),
            (Side::Target, active.target_listener.is_some()),
        ];
        active.unhook();
        if end_active_animations {
            for (side, was_live) in live {
                if was_live {
                    active.window(side).animator().complete();
                }
            }
        }
        active.close_static_side();

        let (source, target) = active.ids();
        debug!(%source, %target, dropped, "transition terminated");
        self.push_event(TransitionEvent::Terminated {
            source,
            target,
            reverse: active.reverse,
            dropped,
        });
        true
    }

    pub fn is_transition_active(&self) -> bool {
        self.core.state.borrow().active.is_some()
    }

    /// The active request and its direction.
    pub fn active_transition(&self) -> Option<(TransitionRequest<W>, bool)> {
        self.core
            .state
            .borrow()
            .active
            .as_ref()
            .map(|active| (active.request.clone(), active.reverse))
    }

    pub fn active_animation_targets(&self) -> Option<AnimationTargets> {
        self.core.state.borrow().active.as_ref().map(ActiveTransition::targets)
    }

    pub fn queued_count(&self) -> usize {
        self.core.state.borrow().queue.len()
    }

    /// Whether an equal request in the same direction is waiting in the queue.
    pub fn contains_transition(&self, request: &TransitionRequest<W>, reverse: bool) -> bool {
        let state = self.core.state.borrow();
        state
            .queue
            .iter()
            .any(|queued| queued.reverse == reverse && queued.request.matches(request))
    }

    /// Take the recorded events, oldest first. Only the latest
    /// [`EVENT_LOG_CAPACITY`](super::EVENT_LOG_CAPACITY) are kept between
    /// drains.
    pub fn drain_events(&self) -> Vec<TransitionEvent> {
        self.core.events.borrow_mut().drain().collect()
    }

    pub fn pending_event_count(&self) -> usize {
        self.core.events.borrow().len()
    }

    fn leading(&self) -> Option<Leading> {
        let state = self.core.state.borrow();
        if let Some(queued) = state.queue.back() {
            return Some(Leading {
                source: queued.request.source_id(),
                target: queued.request.target_id(),
                reverse: queued.reverse,
                visible_after: queued.request.visible_after(queued.reverse),
                queued: true,
            });
        }
        state.active.as_ref().map(|active| Leading {
            source: active.request.source_id(),
            target: active.request.target_id(),
            reverse: active.reverse,
            visible_after: active.request.visible_after(active.reverse),
            queued: false,
        })
    }

    fn execute(&self, request: TransitionRequest<W>, reverse: bool) {
        let length = request.transition.length;
        let exit = request
            .transition
            .exit
            .as_ref()
            .map(|animation| resolve(&*request.source, animation, length));
        let entry = request
            .transition
            .entry
            .as_ref()
            .map(|animation| resolve(&*request.target, animation, length));

        let progress = if reverse { 1.0 } else { 0.0 };
        self.run(request, reverse, exit, entry, progress);
    }

    /// Make `request` the active transition and start its players at
    /// `progress`.
    fn run(
        &self,
        request: TransitionRequest<W>,
        reverse: bool,
        exit: Option<AnimationRef>,
        entry: Option<AnimationRef>,
        progress: f32,
    ) {
        let (source_order, target_order) = request.transition.sort_orders();
        request.source.set_sort_order(source_order);
        request.target.set_sort_order(target_order);

        let epoch = {
            let mut state = self.core.state.borrow_mut();
            state.epoch += 1;
            let epoch = state.epoch;
            state.active = Some(ActiveTransition {
                request: request.clone(),
                reverse,
                exit: exit.clone(),
                entry: entry.clone(),
                source_listener: None,
                target_listener: None,
                epoch,
            });
            epoch
        };

        let (opening, opening_animated) = if reverse {
            (&request.source, exit.is_some())
        } else {
            (&request.target, entry.is_some())
        };
        if !opening_animated {
            opening.open(None, None);
        }

        if exit.is_none() && entry.is_none() {
            debug!(source = %request.source_id(), target = %request.target_id(), "transition has no animated side");
            self.complete_transition();
            return;
        }

        let easing = request.transition.easing;
        if let Some(entry) = entry {
            let listener = self.listen(&request.target, Side::Target, epoch);
            self.store_listener(Side::Target, epoch, listener);

            let playable = AnimationPlayable::new(entry)
                .with_normalized_start_time(progress)
                .with_easing(easing);
            if reverse {
                request
                    .target
                    .close(Some(playable.with_play_mode(PlayMode::Reverse)), None);
            } else {
                request
                    .target
                    .open(Some(playable.with_play_mode(PlayMode::Forward)), None);
            }
        }

        if let Some(exit) = exit {
            let listener = self.listen(&request.source, Side::Source, epoch);
            self.store_listener(Side::Source, epoch, listener);

            let playable = AnimationPlayable::new(exit)
                .with_normalized_start_time(1.0 - progress)
                .with_easing(easing.inverse());
            if reverse {
                request
                    .source
                    .open(Some(playable.with_play_mode(PlayMode::Forward)), None);
            } else {
                request
                    .source
                    .close(Some(playable.with_play_mode(PlayMode::Reverse)), None);
            }
        }
    }

    fn listen(&self, window: &Rc<W>, side: Side, epoch: u64) -> ListenerId {
        let weak = Rc::downgrade(&self.core);
        window.animator().subscribe(move |_| {
            if let Some(core) = weak.upgrade() {
                TransitionManager { core }.on_side_complete(side, epoch);
            }
        })
    }

    fn store_listener(&self, side: Side, epoch: u64, listener: ListenerId) {
        let mut state = self.core.state.borrow_mut();
        if let Some(active) = state.active.as_mut().filter(|active| active.epoch == epoch) {
            *active.listener_mut(side) = Some(listener);
        }
    }

    fn on_side_complete(&self, side: Side, epoch: u64) {
        let completed = {
            let mut state = self.core.state.borrow_mut();
            let Some(active) = state.active.as_mut().filter(|active| active.epoch == epoch) else {
                return;
            };
            let Some(listener) = active.listener_mut(side).take() else {
                return;
            };
            (Rc::clone(active.window(side)), listener, !active.is_live())
        };

        let (window, listener, finished) = completed;
        window.animator().unsubscribe(listener);
        debug!(window = %window.id(), ?side, finished, "transition side complete");
        if finished {
            self.complete_transition();
        }
    }

    /// Finalize the active transition, then start the queue head if any.
    fn complete_transition(&self) {
        let active = self.core.state.borrow_mut().active.take();
        if let Some(mut active) = active {
            active.unhook();
            active.close_static_side();
            let (source, target) = active.ids();
            debug!(%source, %target, reverse = active.reverse, "transition complete");
            self.push_event(TransitionEvent::Completed {
                source,
                target,
                reverse: active.reverse,
            });
        }

        let next = self.core.state.borrow_mut().queue.pop_front();
        if let Some(next) = next {
            self.push_event(TransitionEvent::Started {
                source: next.request.source_id(),
                target: next.request.target_id(),
                reverse: next.reverse,
            });
            self.execute(next.request, next.reverse);
        }
    }

    fn push_event(&self, event: TransitionEvent) {
        self.core.events.borrow_mut().record(event);
    }
}

/// Turn a side's animation into an instance the window can play, falling
/// back when the window cannot render the requested type.
fn resolve<W: Window + ?Sized>(
    window: &W,
    animation: &TransitionAnimation,
    length: f32,
) -> AnimationRef {
    match animation {
        TransitionAnimation::Custom(animation) => animation.clone(),
        TransitionAnimation::Generic(kind) => {
            let kind = if window.is_supported_animation_type(*kind) {
                *kind
            } else {
                let fallback = window.fallback_animation_type();
                warn!(
                    window = %window.id(),
                    requested = %kind,
                    %fallback,
                    "animation type not supported, using fallback"
                );
                fallback
            };
            window.create_animation(kind, length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{Screen, ScreenOptions};
    use crate::transition::params::{SortPriority, WindowTransition};
    use crate::window::AccessState;
    use segue_anim::{AnimationRunner, AnimationType, EasingMode, VisualState};

    const HOME: WindowId = WindowId::new("home");
    const SETTINGS: WindowId = WindowId::new("settings");
    const PROFILE: WindowId = WindowId::new("profile");

    struct Fixture {
        runner: AnimationRunner,
        home: Rc<Screen>,
        settings: Rc<Screen>,
        profile: Rc<Screen>,
        manager: TransitionManager<Screen>,
    }

    impl Fixture {
        fn new() -> Self {
            let runner = AnimationRunner::new();
            let screen = |id| Screen::new(id, VisualState::shared(100.0, 100.0), &runner);
            let home = screen(HOME);
            let settings = screen(SETTINGS);
            let profile = screen(PROFILE);
            home.open(None, None);
            Self {
                runner,
                home,
                settings,
                profile,
                manager: TransitionManager::new(),
            }
        }

        fn request(
            &self,
            source: &Rc<Screen>,
            target: &Rc<Screen>,
            transition: WindowTransition,
        ) -> TransitionRequest<Screen> {
            TransitionRequest::new(source.clone(), target.clone(), transition)
        }

        fn tick_for(&self, seconds: f32) {
            let steps = (seconds / 0.05).round() as usize;
            for _ in 0..steps {
                self.runner.tick(0.05);
            }
        }
    }

    fn fade(length: f32) -> WindowTransition {
        WindowTransition::new(length, EasingMode::Linear).with_animation(AnimationType::Fade)
    }

    #[test]
    fn test_idle_request_starts_and_completes() {
        let f = Fixture::new();
        let outcome = f
            .manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::Started);
        assert!(f.manager.is_transition_active());
        assert_eq!(f.home.access_state(), AccessState::Closing);
        assert_eq!(f.settings.access_state(), AccessState::Opening);
        assert_eq!(f.settings.sort_order(), 1);
        assert_eq!(f.home.sort_order(), 0);

        f.tick_for(0.6);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(
            f.manager.drain_events(),
            vec![
                TransitionEvent::Started { source: HOME, target: SETTINGS, reverse: false },
                TransitionEvent::Completed { source: HOME, target: SETTINGS, reverse: false },
            ]
        );
    }

    #[test]
    fn test_completion_releases_windows_and_listeners() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.2)), false)
            .unwrap();
        assert_eq!(f.settings.animator().listener_count(), 2);
        assert!(Rc::strong_count(&f.settings) > 1);

        f.tick_for(0.3);
        assert_eq!(f.settings.animator().listener_count(), 1);
        assert_eq!(f.home.animator().listener_count(), 1);
        assert_eq!(Rc::strong_count(&f.settings), 1);
        assert_eq!(Rc::strong_count(&f.home), 1);
    }

    #[test]
    fn test_opposing_request_inverts_from_current_progress() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(1.0)), false)
            .unwrap();
        f.runner.tick(0.4);
        assert!((f.settings.animator().normalized_time() - 0.4).abs() < 1e-4);

        let outcome = f
            .manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(1.0)), true)
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::Inverted);
        assert_eq!(f.manager.queued_count(), 0);
        assert!((f.settings.animator().normalized_time() - 0.4).abs() < 1e-4);
        assert_eq!(f.settings.animator().play_mode(), PlayMode::Reverse);
        assert!((f.home.animator().normalized_time() - 0.6).abs() < 1e-4);
        assert_eq!(f.home.animator().play_mode(), PlayMode::Forward);
        assert_eq!(f.settings.access_state(), AccessState::Closing);
        assert_eq!(f.home.access_state(), AccessState::Opening);

        f.runner.tick(0.4);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.home.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert_eq!(
            f.manager.drain_events(),
            vec![
                TransitionEvent::Started { source: HOME, target: SETTINGS, reverse: false },
                TransitionEvent::Inverted { source: HOME, target: SETTINGS, reverse: true },
                TransitionEvent::Completed { source: HOME, target: SETTINGS, reverse: true },
            ]
        );
    }

    #[test]
    fn test_chained_request_runs_after_active() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        let outcome = f
            .manager
            .handle_new_transition(f.request(&f.settings, &f.profile, fade(0.5)), false)
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::Queued);
        assert_eq!(f.manager.queued_count(), 1);
        assert_eq!(f.profile.access_state(), AccessState::Closed);

        f.tick_for(0.5);
        assert!(f.manager.is_transition_active());
        assert_eq!(f.manager.queued_count(), 0);
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Closing);
        assert_eq!(f.profile.access_state(), AccessState::Opening);

        f.tick_for(0.5);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert_eq!(f.profile.access_state(), AccessState::Open);
    }

    #[test]
    fn test_reverse_chain_is_accepted() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        // Settings is visible afterwards, so a reverse step from settings
        // back to profile chains.
        let outcome = f
            .manager
            .handle_new_transition(f.request(&f.profile, &f.settings, fade(0.5)), true)
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::Queued);

        f.tick_for(1.0);
        assert_eq!(f.profile.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_invalid_chain_is_rejected() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        let err = f
            .manager
            .handle_new_transition(f.request(&f.home, &f.profile, fade(0.5)), false)
            .unwrap_err();

        assert_eq!(err, TransitionError::InvalidChain { expected: SETTINGS, found: HOME });
        assert_eq!(f.manager.queued_count(), 0);
    }

    #[test]
    fn test_duplicate_request_is_rejected() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        let err = f
            .manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap_err();

        assert_eq!(err, TransitionError::Duplicate { from: HOME, to: SETTINGS, reverse: false });
    }

    #[test]
    fn test_check_transition_leaves_state_untouched() {
        let f = Fixture::new();
        let first = f.request(&f.home, &f.settings, fade(0.5));
        assert_eq!(f.manager.check_transition(&first, false), Ok(TransitionOutcome::Started));
        assert!(!f.manager.is_transition_active());

        f.manager.handle_new_transition(first.clone(), false).unwrap();
        let events = f.manager.pending_event_count();
        let chained = f.request(&f.settings, &f.profile, fade(0.5));
        assert_eq!(f.manager.check_transition(&chained, false), Ok(TransitionOutcome::Queued));
        assert_eq!(f.manager.check_transition(&first, true), Ok(TransitionOutcome::Inverted));
        assert_eq!(
            f.manager.check_transition(&f.request(&f.home, &f.profile, fade(0.5)), false),
            Err(TransitionError::InvalidChain { expected: SETTINGS, found: HOME })
        );

        assert_eq!(f.manager.queued_count(), 0);
        assert_eq!(f.manager.pending_event_count(), events);
        assert_eq!(f.settings.access_state(), AccessState::Opening);
    }

    #[test]
    fn test_same_window_is_rejected() {
        let f = Fixture::new();
        let err = f
            .manager
            .handle_new_transition(f.request(&f.home, &f.home, fade(0.5)), false)
            .unwrap_err();
        assert_eq!(err, TransitionError::SameWindow(HOME));
        assert!(!f.manager.is_transition_active());
    }

    #[test]
    fn test_opposing_request_cancels_queued_transition() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        f.manager
            .handle_new_transition(f.request(&f.settings, &f.profile, fade(0.5)), false)
            .unwrap();

        let outcome = f
            .manager
            .handle_new_transition(f.request(&f.settings, &f.profile, fade(0.5)), true)
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::Cancelled);
        assert_eq!(f.manager.queued_count(), 0);

        f.tick_for(0.6);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(f.profile.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_unsupported_type_uses_fallback() {
        let runner = AnimationRunner::new();
        let home = Screen::new(HOME, VisualState::shared(10.0, 10.0), &runner);
        let settings = Screen::with_options(
            SETTINGS,
            VisualState::shared(10.0, 10.0),
            &runner,
            ScreenOptions {
                supported_types: vec![AnimationType::Fade],
                ..ScreenOptions::default()
            },
        );
        home.open(None, None);
        let manager = TransitionManager::new();
        let transition =
            WindowTransition::new(0.3, EasingMode::Linear).with_animation(AnimationType::SlideLeft);

        manager
            .handle_new_transition(TransitionRequest::new(home.clone(), settings.clone(), transition), false)
            .unwrap();

        let fallback = settings.create_animation(AnimationType::Fade, 0.3);
        assert_eq!(settings.animator().animation(), fallback);
        assert_eq!(settings.cached_animation_count(), 1);
        assert_eq!(home.animator().animation(), home.create_animation(AnimationType::SlideLeft, 0.3));
    }

    #[test]
    fn test_custom_animation_is_played_as_is() {
        let f = Fixture::new();
        let custom = f.settings.create_animation(AnimationType::Expand, 0.25);
        let transition = WindowTransition::new(0.5, EasingMode::Linear).with_entry(custom.clone());
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, transition), false)
            .unwrap();
        assert_eq!(f.settings.animator().animation(), custom);
    }

    #[test]
    fn test_target_only_closes_source_when_finished() {
        let f = Fixture::new();
        let transition =
            WindowTransition::new(0.3, EasingMode::Linear).with_entry(AnimationType::SlideLeft);
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, transition), false)
            .unwrap();

        assert_eq!(f.manager.active_animation_targets(), Some(AnimationTargets::Target));
        assert_eq!(f.home.access_state(), AccessState::Open);
        assert_eq!(f.settings.sort_order(), 1);

        f.tick_for(0.4);
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Open);
    }

    #[test]
    fn test_source_only_opens_target_immediately() {
        let f = Fixture::new();
        let transition =
            WindowTransition::new(0.3, EasingMode::Linear).with_exit(AnimationType::Fade);
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, transition), false)
            .unwrap();

        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(f.home.access_state(), AccessState::Closing);
        assert_eq!(f.home.sort_order(), 1);
        assert_eq!(f.settings.sort_order(), 0);

        f.tick_for(0.4);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.home.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_explicit_sort_priority_overrides_auto() {
        let f = Fixture::new();
        let transition = fade(0.3).with_sort_priority(SortPriority::Source);
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, transition), false)
            .unwrap();
        assert_eq!(f.home.sort_order(), 1);
        assert_eq!(f.settings.sort_order(), 0);
    }

    #[test]
    fn test_instant_transition_completes_synchronously() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, WindowTransition::instant()), false)
            .unwrap();

        assert!(!f.manager.is_transition_active());
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(f.manager.drain_events().len(), 2);
        assert_eq!(f.manager.invert_active(), Err(TransitionError::NotActive));
    }

    #[test]
    fn test_instant_transition_drains_queue() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.2)), false)
            .unwrap();
        f.manager
            .handle_new_transition(
                f.request(&f.settings, &f.profile, WindowTransition::instant()),
                false,
            )
            .unwrap();

        f.tick_for(0.2);
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert_eq!(f.profile.access_state(), AccessState::Open);
    }

    #[test]
    fn test_terminate_completes_and_clears_queue() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        f.manager
            .handle_new_transition(f.request(&f.settings, &f.profile, fade(0.5)), false)
            .unwrap();
        f.runner.tick(0.1);

        assert!(f.manager.terminate(true));
        assert!(!f.manager.is_transition_active());
        assert_eq!(f.manager.queued_count(), 0);
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(
            f.manager.drain_events().last(),
            Some(&TransitionEvent::Terminated {
                source: HOME,
                target: SETTINGS,
                reverse: false,
                dropped: 1,
            })
        );

        f.tick_for(1.0);
        assert_eq!(f.profile.access_state(), AccessState::Closed);
        assert!(!f.manager.terminate(true));
    }

    #[test]
    fn test_terminate_without_completion_unhooks() {
        let f = Fixture::new();
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();

        assert!(f.manager.terminate(false));
        assert!(f.settings.animator().is_playing());
        assert_eq!(f.settings.animator().listener_count(), 1);
        assert_eq!(f.home.animator().listener_count(), 1);

        f.tick_for(0.6);
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert!(f.manager.drain_events().iter().all(|e| !e.is_completed()));
    }

    #[test]
    fn test_contains_transition() {
        let f = Fixture::new();
        let queued = f.request(&f.settings, &f.profile, fade(0.5));
        assert!(!f.manager.contains_transition(&queued, false));

        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        f.manager.handle_new_transition(queued.clone(), false).unwrap();

        assert!(f.manager.contains_transition(&queued, false));
        assert!(!f.manager.contains_transition(&queued, true));
        assert!(!f.manager.contains_transition(&f.request(&f.settings, &f.profile, fade(0.4)), false));
        assert!(!f.manager.contains_transition(&f.request(&f.home, &f.settings, fade(0.5)), false));
    }

    #[test]
    fn test_active_transition_query() {
        let f = Fixture::new();
        assert!(f.manager.active_transition().is_none());
        f.manager
            .handle_new_transition(f.request(&f.home, &f.settings, fade(0.5)), false)
            .unwrap();
        let (request, reverse) = f.manager.active_transition().unwrap();
        assert_eq!(request.source_id(), HOME);
        assert_eq!(request.target_id(), SETTINGS);
        assert!(!reverse);
    }
}
