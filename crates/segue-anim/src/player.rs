//! Stateful animation playback.
//!
//! An [`AnimationPlayer`] advances one animation's time each frame and fires
//! completion listeners when playback reaches the end of the timeline:
//!
//! ```text
//! Idle --play--> Playing <--pause/resume--> Paused
//!                   |
//!        boundary reached / complete()
//!                   v
//!               Completed (listeners run, player is Idle again)
//! ```
//!
//! Listeners run after the player has returned to idle, so they may call
//! `play` on the same player.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::animation::AnimationRef;
use crate::easing::EasingMode;
use crate::playable::{AnimationPlayable, PlayMode, TimeMode};
use crate::runner::{self, AnimationRunner, RunnerState};

/// Tolerance used when checking whether playback reached a boundary.
pub const TIME_EPSILON: f32 = 1e-4;

/// Unique identifier for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(u64);

impl PlayerId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle returned by [`AnimationPlayer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type CompletionCallback = Rc<dyn Fn(&AnimationRef)>;

struct PlayerState {
    animation: AnimationRef,
    current_time: f32,
    play_mode: PlayMode,
    easing: EasingMode,
    playback_speed: f32,
    time_mode: TimeMode,
    is_playing: bool,
    is_paused: bool,
    last_frame: Option<u64>,
}

impl PlayerState {
    fn length(&self) -> f32 {
        self.animation.length()
    }

    fn terminal_time(&self) -> f32 {
        match self.play_mode {
            PlayMode::Forward => self.length(),
            PlayMode::Reverse => 0.0,
        }
    }

    fn normalized_time(&self) -> f32 {
        let length = self.length();
        if length <= TIME_EPSILON {
            return match self.play_mode {
                PlayMode::Forward => 1.0,
                PlayMode::Reverse => 0.0,
            };
        }
        (self.current_time / length).clamp(0.0, 1.0)
    }
}

pub(crate) struct PlayerCore {
    id: PlayerId,
    state: RefCell<PlayerState>,
    listeners: RefCell<Vec<(ListenerId, CompletionCallback)>>,
    next_listener: Cell<u64>,
    runner: Weak<RefCell<RunnerState>>,
}

/// Shared handle to a player. Clones refer to the same player.
#[derive(Clone)]
pub struct AnimationPlayer {
    core: Rc<PlayerCore>,
}

impl fmt::Debug for AnimationPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.borrow();
        f.debug_struct("AnimationPlayer")
            .field("id", &self.core.id)
            .field("current_time", &state.current_time)
            .field("play_mode", &state.play_mode)
            .field("is_playing", &state.is_playing)
            .field("is_paused", &state.is_paused)
            .finish()
    }
}

impl AnimationPlayer {
    /// Create an idle player bound to `animation`, driven by `runner`.
    pub fn new(animation: AnimationRef, runner: &AnimationRunner) -> Self {
        Self {
            core: Rc::new(PlayerCore {
                id: PlayerId::next(),
                state: RefCell::new(PlayerState {
                    animation,
                    current_time: 0.0,
                    play_mode: PlayMode::Forward,
                    easing: EasingMode::Linear,
                    playback_speed: 1.0,
                    time_mode: TimeMode::Scaled,
                    is_playing: false,
                    is_paused: false,
                    last_frame: None,
                }),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                runner: runner.downgrade(),
            }),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.core.id
    }

    pub fn animation(&self) -> AnimationRef {
        self.core.state.borrow().animation.clone()
    }

    /// Start playing the bound animation.
    ///
    /// `start_time` is clamped to the animation length. The animation is
    /// evaluated immediately at the start time so the visual does not lag a
    /// frame behind. Calling `play` while already playing restarts from the
    /// new parameters without firing completion.
    pub fn play(
        &self,
        start_time: f32,
        play_mode: PlayMode,
        easing: EasingMode,
        time_mode: TimeMode,
        playback_speed: f32,
    ) {
        let needs_prepare = {
            let mut state = self.core.state.borrow_mut();
            let was_playing = state.is_playing;
            state.current_time = start_time.clamp(0.0, state.length());
            state.play_mode = play_mode;
            state.easing = easing;
            state.time_mode = time_mode;
            state.playback_speed = if playback_speed > 0.0 { playback_speed } else { 1.0 };
            state.is_playing = true;
            state.is_paused = false;
            !was_playing
        };

        if needs_prepare {
            self.animation().prepare();
        }
        runner::register_weak(&self.core.runner, self);
        self.evaluate_current();
    }

    /// Play a descriptor, rebinding the player to its animation first.
    pub fn play_playable(&self, playable: &AnimationPlayable) {
        let rebound = {
            let mut state = self.core.state.borrow_mut();
            if state.animation.ptr_eq(playable.animation()) {
                false
            } else {
                state.animation = playable.animation().clone();
                state.is_playing = false;
                true
            }
        };
        if rebound {
            trace!(player = ?self.core.id, "rebinding player to a new animation");
        }

        self.play(
            playable.start_time(),
            playable.play_mode(),
            playable.easing(),
            playable.time_mode(),
            playable.playback_speed(),
        );
    }

    /// Reverse direction in place, keeping the current time.
    pub fn rewind(&self) -> bool {
        let mut state = self.core.state.borrow_mut();
        if !state.is_playing {
            return false;
        }
        state.play_mode = state.play_mode.reversed();
        true
    }

    pub fn pause(&self) -> bool {
        let mut state = self.core.state.borrow_mut();
        if !state.is_playing || state.is_paused {
            return false;
        }
        state.is_paused = true;
        true
    }

    pub fn resume(&self) -> bool {
        let mut state = self.core.state.borrow_mut();
        if !state.is_playing || !state.is_paused {
            return false;
        }
        state.is_paused = false;
        true
    }

    /// Stop without reaching the end. Completion listeners do not run.
    pub fn stop(&self) -> bool {
        {
            let mut state = self.core.state.borrow_mut();
            if !state.is_playing {
                return false;
            }
            state.is_playing = false;
            state.is_paused = false;
        }
        self.unregister();
        true
    }

    /// Jump to the end of the timeline for the current direction and fire
    /// completion.
    pub fn complete(&self) -> bool {
        {
            let mut state = self.core.state.borrow_mut();
            if !state.is_playing {
                return false;
            }
            state.current_time = state.terminal_time();
        }
        self.evaluate_current();
        self.finish();
        true
    }

    /// Seek to `time` seconds. Seeking onto the terminal time completes
    /// playback synchronously.
    pub fn set_current_time(&self, time: f32) -> bool {
        let reached_end = {
            let mut state = self.core.state.borrow_mut();
            if !state.is_playing {
                return false;
            }
            let terminal = state.terminal_time();
            let time = time.clamp(0.0, state.length());
            if (time - terminal).abs() <= TIME_EPSILON {
                state.current_time = terminal;
                true
            } else {
                state.current_time = time;
                false
            }
        };

        self.evaluate_current();
        if reached_end {
            self.finish();
        }
        true
    }

    /// Advance by `delta` seconds.
    ///
    /// Does nothing unless playing, unpaused, and not already updated during
    /// the runner's current frame. Returns whether time advanced.
    pub fn update(&self, delta: f32) -> bool {
        let runner = self.core.runner.upgrade();
        let reached_end = {
            let mut state = self.core.state.borrow_mut();
            if !state.is_playing || state.is_paused {
                return false;
            }

            let mut scale = 1.0;
            if let Some(runner) = runner.as_ref() {
                let runner = runner.borrow();
                if state.last_frame == Some(runner.frame) {
                    return false;
                }
                state.last_frame = Some(runner.frame);
                if state.time_mode == TimeMode::Scaled {
                    scale = runner.time_scale;
                }
            }

            let step = delta.max(0.0) * scale * state.playback_speed * state.play_mode.sign();
            let length = state.length();
            let time = (state.current_time + step).clamp(0.0, length);
            let terminal = state.terminal_time();
            if (time - terminal).abs() <= TIME_EPSILON {
                state.current_time = terminal;
                true
            } else {
                state.current_time = time;
                false
            }
        };

        self.evaluate_current();
        if reached_end {
            self.finish();
        }
        true
    }

    pub fn is_playing(&self) -> bool {
        self.core.state.borrow().is_playing
    }

    pub fn is_paused(&self) -> bool {
        self.core.state.borrow().is_paused
    }

    pub fn current_time(&self) -> f32 {
        self.core.state.borrow().current_time
    }

    /// Current time as a fraction of the animation length.
    pub fn normalized_time(&self) -> f32 {
        self.core.state.borrow().normalized_time()
    }

    pub fn length(&self) -> f32 {
        self.core.state.borrow().length()
    }

    pub fn play_mode(&self) -> PlayMode {
        self.core.state.borrow().play_mode
    }

    pub fn easing(&self) -> EasingMode {
        self.core.state.borrow().easing
    }

    pub fn playback_speed(&self) -> f32 {
        self.core.state.borrow().playback_speed
    }

    pub fn time_mode(&self) -> TimeMode {
        self.core.state.borrow().time_mode
    }

    /// Read-only view that does not keep the player alive.
    pub fn playback_data(&self) -> PlaybackData {
        PlaybackData {
            player: Rc::downgrade(&self.core),
        }
    }

    /// Add a completion listener. Listeners run in subscription order.
    pub fn subscribe(&self, callback: impl Fn(&AnimationRef) + 'static) -> ListenerId {
        let id = ListenerId(self.core.next_listener.get());
        self.core.next_listener.set(id.0 + 1);
        self.core.listeners.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.core.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.core.listeners.borrow().len()
    }

    fn evaluate_current(&self) {
        let (animation, eased) = {
            let state = self.core.state.borrow();
            (state.animation.clone(), state.easing.apply(state.normalized_time()))
        };
        animation.evaluate(eased);
    }

    fn unregister(&self) {
        if let Some(runner) = self.core.runner.upgrade() {
            runner::unregister(&runner, self.core.id);
        }
    }

    /// Return to idle, then notify listeners.
    fn finish(&self) {
        let animation = {
            let mut state = self.core.state.borrow_mut();
            state.is_playing = false;
            state.is_paused = false;
            state.animation.clone()
        };
        self.unregister();
        trace!(player = ?self.core.id, "playback complete");

        let listeners: Vec<(ListenerId, CompletionCallback)> = self.core.listeners.borrow().clone();
        for (id, callback) in listeners {
            // A listener earlier in the list may have removed this one.
            let still_subscribed = self.core.listeners.borrow().iter().any(|(l, _)| *l == id);
            if still_subscribed {
                callback(&animation);
            }
        }
    }
}

/// Non-owning view of a player's progress.
///
/// The view may outlive the player; once the player is dropped, or after
/// [`release`](Self::release), every query reports an idle player.
#[derive(Clone, Default)]
pub struct PlaybackData {
    player: Weak<PlayerCore>,
}

impl fmt::Debug for PlaybackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackData")
            .field("bound", &self.is_bound())
            .field("normalized_time", &self.normalized_time())
            .field("is_playing", &self.is_playing())
            .finish()
    }
}

impl PlaybackData {
    /// Whether the view still observes a live player.
    pub fn is_bound(&self) -> bool {
        self.player.strong_count() > 0
    }

    pub fn is_playing(&self) -> bool {
        self.player
            .upgrade()
            .map(|core| core.state.borrow().is_playing)
            .unwrap_or(false)
    }

    pub fn normalized_time(&self) -> Option<f32> {
        self.player
            .upgrade()
            .map(|core| core.state.borrow().normalized_time())
    }

    pub fn current_time(&self) -> Option<f32> {
        self.player
            .upgrade()
            .map(|core| core.state.borrow().current_time)
    }

    pub fn play_mode(&self) -> Option<PlayMode> {
        self.player.upgrade().map(|core| core.state.borrow().play_mode)
    }

    /// Forget the observed player.
    pub fn release(&mut self) {
        self.player = Weak::new();
    }
}
