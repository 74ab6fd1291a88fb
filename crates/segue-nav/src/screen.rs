//! The concrete window used by the [`Controller`](crate::controller::Controller).
//!
//! A [`Screen`] owns one [`AnimationPlayer`] and a [`Surface`](segue_anim::Surface) that the
//! built-in animations draw into. Its access state follows the player:
//!
//! ```text
//! Closed --open(playable)--> Opening --complete--> Open
//!   ^                                               |
//!   +------complete------ Closing <--close(playable)+
//! ```
//!
//! Opening or closing without a playable skips the animated states.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use segue_anim::playable::length_ms;
use segue_anim::{
    builtin, AnimationPlayable, AnimationPlayer, AnimationRef, AnimationRunner, AnimationType,
    SharedSurface,
};
use tracing::trace;

use crate::window::{AccessCallback, AccessState, Navigable, Window, WindowId};

/// Construction options for a [`Screen`].
#[derive(Debug, Clone)]
pub struct ScreenOptions {
    /// Animation types this screen can render.
    pub supported_types: Vec<AnimationType>,
    /// Substitute for unsupported types.
    pub fallback_type: AnimationType,
    /// Whether leaving this screen records it in history.
    pub supports_history: bool,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            supported_types: AnimationType::ALL.to_vec(),
            fallback_type: AnimationType::Fade,
            supports_history: true,
        }
    }
}

pub struct Screen {
    id: WindowId,
    surface: SharedSurface,
    player: AnimationPlayer,
    state: Cell<AccessState>,
    sort_order: Cell<i32>,
    options: ScreenOptions,
    animations: RefCell<HashMap<(AnimationType, i64), AnimationRef>>,
    pending: RefCell<Option<AccessCallback>>,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .field("sort_order", &self.sort_order.get())
            .field("player", &self.player)
            .finish()
    }
}

impl Screen {
    /// A closed screen that supports every built-in animation type.
    pub fn new(id: WindowId, surface: SharedSurface, runner: &AnimationRunner) -> Rc<Self> {
        Self::with_options(id, surface, runner, ScreenOptions::default())
    }

    pub fn with_options(
        id: WindowId,
        surface: SharedSurface,
        runner: &AnimationRunner,
        options: ScreenOptions,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &std::rc::Weak<Screen>| {
            let idle = builtin::create(options.fallback_type, surface.clone(), 0.0);
            let player = AnimationPlayer::new(idle, runner);

            // Subscribed before anyone else so the access state is settled by
            // the time other listeners observe the completion.
            let weak = weak.clone();
            player.subscribe(move |_| {
                if let Some(screen) = weak.upgrade() {
                    screen.on_animation_complete();
                }
            });

            Screen {
                id,
                surface,
                player,
                state: Cell::new(AccessState::Closed),
                sort_order: Cell::new(0),
                options,
                animations: RefCell::new(HashMap::new()),
                pending: RefCell::new(None),
            }
        })
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// Number of cached animations.
    pub fn cached_animation_count(&self) -> usize {
        self.animations.borrow().len()
    }

    fn on_animation_complete(&self) {
        match self.state.get() {
            AccessState::Opening => self.state.set(AccessState::Open),
            AccessState::Closing => {
                self.state.set(AccessState::Closed);
                self.surface.borrow_mut().set_visible(false);
            }
            _ => {}
        }
        trace!(screen = %self.id, state = ?self.state.get(), "access animation complete");

        let pending = self.pending.borrow_mut().take();
        if let Some(callback) = pending {
            callback();
        }
    }

    /// Replace the pending one-shot without firing the old one.
    fn set_pending(&self, on_complete: Option<AccessCallback>) {
        *self.pending.borrow_mut() = on_complete;
    }

    fn show_immediately(&self) {
        let mut surface = self.surface.borrow_mut();
        surface.set_opacity(1.0);
        surface.set_offset(0.0, 0.0);
        surface.set_scale(1.0, 1.0);
        surface.set_visible(true);
    }
}

impl Navigable for Screen {
    fn id(&self) -> WindowId {
        self.id
    }

    fn supports_history(&self) -> bool {
        self.options.supports_history
    }
}

impl Window for Screen {
    fn open(&self, playable: Option<AnimationPlayable>, on_complete: Option<AccessCallback>) -> bool {
        match playable {
            Some(playable) => {
                self.set_pending(on_complete);
                self.state.set(AccessState::Opening);
                self.surface.borrow_mut().set_visible(true);
                self.player.play_playable(&playable);
                true
            }
            None => {
                if self.state.get() == AccessState::Open {
                    return false;
                }
                self.player.stop();
                self.set_pending(None);
                self.state.set(AccessState::Open);
                self.show_immediately();
                if let Some(callback) = on_complete {
                    callback();
                }
                true
            }
        }
    }

    fn close(
        &self,
        playable: Option<AnimationPlayable>,
        on_complete: Option<AccessCallback>,
    ) -> bool {
        match playable {
            Some(playable) => {
                self.set_pending(on_complete);
                self.state.set(AccessState::Closing);
                self.player.play_playable(&playable);
                true
            }
            None => {
                if self.state.get() == AccessState::Closed {
                    return false;
                }
                self.player.stop();
                self.set_pending(None);
                self.state.set(AccessState::Closed);
                self.surface.borrow_mut().set_visible(false);
                if let Some(callback) = on_complete {
                    callback();
                }
                true
            }
        }
    }

    fn sort_order(&self) -> i32 {
        self.sort_order.get()
    }

    fn set_sort_order(&self, order: i32) {
        self.sort_order.set(order);
        self.surface.borrow_mut().set_sort_order(order);
    }

    fn is_supported_animation_type(&self, kind: AnimationType) -> bool {
        self.options.supported_types.contains(&kind)
    }

    fn fallback_animation_type(&self) -> AnimationType {
        self.options.fallback_type
    }

    fn create_animation(&self, kind: AnimationType, length: f32) -> AnimationRef {
        self.animations
            .borrow_mut()
            .entry((kind, length_ms(length)))
            .or_insert_with(|| builtin::create(kind, self.surface.clone(), length))
            .clone()
    }

    fn skip_access_animation(&self) -> bool {
        self.player.complete()
    }

    fn animator(&self) -> &AnimationPlayer {
        &self.player
    }

    fn access_state(&self) -> AccessState {
        self.state.get()
    }
}
