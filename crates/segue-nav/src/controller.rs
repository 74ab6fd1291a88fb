//! Application-facing screen controller.
//!
//! The [`Controller`] ties a fixed set of [`Screen`]s to a
//! [`WindowNavigation`] and a [`TransitionManager`]:
//!
//! ```text
//! open_screen(id)  -> travel (history records the transition used)
//!                  -> transition(previous -> id, forward)
//! close_screen()   -> back (history returns that transition)
//!                  -> transition(restored -> current, reverse)
//! update(dt)       -> runner.tick(dt)
//! ```
//!
//! Navigation state changes synchronously; screens catch up as the runner
//! advances their animations.

use std::rc::Rc;

use segue_anim::AnimationRunner;
use segue_config::SegueConfig;
use tracing::debug;

use crate::error::{ControllerError, NavigationError, Result};
use crate::navigation::{NavigationEvent, NavigationListenerId, WindowNavigation};
use crate::screen::Screen;
use crate::transition::{TransitionEvent, TransitionManager, TransitionRequest, WindowTransition};
use crate::window::{AccessState, Navigable, Window, WindowId};

pub struct Controller {
    navigation: WindowNavigation<Screen, WindowTransition>,
    transitions: TransitionManager<Screen>,
    runner: AnimationRunner,
    default_transition: WindowTransition,
    shut_down: bool,
}

impl Controller {
    /// Build a controller over `screens`, all driven by `runner`.
    pub fn new(
        screens: impl IntoIterator<Item = Rc<Screen>>,
        runner: AnimationRunner,
    ) -> Result<Self> {
        Self::with_config(screens, runner, &SegueConfig::default())
    }

    /// Like [`new`](Self::new), taking the default transition and time scale
    /// from `config`.
    pub fn with_config(
        screens: impl IntoIterator<Item = Rc<Screen>>,
        runner: AnimationRunner,
        config: &SegueConfig,
    ) -> Result<Self> {
        runner.set_time_scale(config.runner.time_scale);
        Ok(Self {
            navigation: WindowNavigation::new(screens)?,
            transitions: TransitionManager::new(),
            runner,
            default_transition: WindowTransition::from(&config.transitions),
            shut_down: false,
        })
    }

    /// Show `initial` immediately and make it the active screen.
    pub fn init(&mut self, initial: WindowId) -> Result<NavigationEvent> {
        let event = self.navigation.init(initial)?;
        if let Some(screen) = self.navigation.window(initial) {
            screen.open(None, None);
        }
        self.shut_down = false;
        Ok(event)
    }

    /// Open `id` with the default transition.
    pub fn open_screen(&mut self, id: WindowId) -> Result<NavigationEvent> {
        let transition = self.default_transition.clone();
        self.open_screen_with(id, transition)
    }

    /// Open `id`, leaving the current screen with `transition`.
    ///
    /// A failed event (already active, locked) starts nothing. A transition
    /// the manager would reject leaves navigation unchanged.
    pub fn open_screen_with(
        &mut self,
        id: WindowId,
        transition: WindowTransition,
    ) -> Result<NavigationEvent> {
        let source = self.active_window().ok_or(ControllerError::NoActiveScreen)?;
        let target = self.window(id)?;
        let request = TransitionRequest::new(source, target, transition.clone());
        if id != request.source_id() && !self.navigation.is_locked() {
            self.transitions.check_transition(&request, false)?;
        }

        let event = self.navigation.travel_with(id, transition, false)?;
        if !event.success {
            return Ok(event);
        }

        debug!(from = %request.source_id(), to = %id, "opening screen");
        self.transitions.handle_new_transition(request, false)?;
        Ok(event)
    }

    /// Go back, replaying the transition that left the restored screen in
    /// reverse.
    pub fn close_screen(&mut self) -> Result<NavigationEvent> {
        let current = self.active_window().ok_or(ControllerError::NoActiveScreen)?;
        let request = match self.navigation.history().peek() {
            Some(entry) if !self.navigation.is_locked() => {
                let restored = self.window(entry.window)?;
                let request = TransitionRequest::new(restored, current, entry.metadata.clone());
                self.transitions.check_transition(&request, true)?;
                Some(request)
            }
            _ => None,
        };

        let (event, _) = self.navigation.back()?;
        let Some(request) = request.filter(|_| event.success) else {
            return Ok(event);
        };

        debug!(from = %request.target_id(), to = %request.source_id(), "closing screen");
        self.transitions.handle_new_transition(request, true)?;
        Ok(event)
    }

    /// Advance all animations by `delta` seconds.
    pub fn update(&self, delta: f32) {
        self.runner.tick(delta);
    }

    /// Jump the active transition to its end and drop queued ones. Screens
    /// are then shown or hidden to match the active screen.
    pub fn skip_transitions(&self) -> bool {
        if !self.transitions.terminate(true) {
            return false;
        }
        self.sync_screens();
        true
    }

    /// Finish any transition in flight. Also runs on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if self.transitions.terminate(true) {
            debug!("controller shut down mid-transition");
            self.sync_screens();
        }
    }

    pub fn active_screen(&self) -> Option<WindowId> {
        self.navigation.active()
    }

    pub fn active_window(&self) -> Option<Rc<Screen>> {
        self.navigation.active_window().cloned()
    }

    pub fn screen(&self, id: WindowId) -> Option<&Rc<Screen>> {
        self.navigation.window(id)
    }

    pub fn history_count(&self) -> usize {
        self.navigation.history_count()
    }

    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_transition_active()
    }

    pub fn queued_transition_count(&self) -> usize {
        self.transitions.queued_count()
    }

    pub fn lock(&mut self) {
        self.navigation.lock();
    }

    pub fn unlock(&mut self) -> bool {
        self.navigation.unlock()
    }

    pub fn is_locked(&self) -> bool {
        self.navigation.is_locked()
    }

    pub fn start_history_group(&mut self) {
        self.navigation.start_history_group();
    }

    pub fn clear_history_group(&mut self) -> bool {
        self.navigation.clear_history_group()
    }

    pub fn clear_history(&mut self) {
        self.navigation.clear_history();
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&NavigationEvent) + 'static,
    ) -> NavigationListenerId {
        self.navigation.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: NavigationListenerId) -> bool {
        self.navigation.unsubscribe(id)
    }

    pub fn drain_transition_events(&self) -> Vec<TransitionEvent> {
        self.transitions.drain_events()
    }

    pub fn default_transition(&self) -> &WindowTransition {
        &self.default_transition
    }

    pub fn set_default_transition(&mut self, transition: WindowTransition) {
        self.default_transition = transition;
    }

    pub fn navigation(&self) -> &WindowNavigation<Screen, WindowTransition> {
        &self.navigation
    }

    pub fn transitions(&self) -> &TransitionManager<Screen> {
        &self.transitions
    }

    pub fn runner(&self) -> &AnimationRunner {
        &self.runner
    }

    /// Open the active screen and close every other shown one, without
    /// animation.
    fn sync_screens(&self) {
        let active = self.navigation.active();
        for screen in self.navigation.windows() {
            if Some(screen.id()) == active {
                screen.open(None, None);
            } else if screen.access_state() != AccessState::Closed {
                screen.close(None, None);
            }
        }
    }

    fn window(&self, id: WindowId) -> Result<Rc<Screen>> {
        self.navigation
            .window(id)
            .cloned()
            .ok_or(NavigationError::UnknownWindow(id).into())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitionError;
    use crate::transition::EVENT_LOG_CAPACITY;
    use segue_anim::{AnimationType, EasingMode, PlayMode, VisualState};

    const HOME: WindowId = WindowId::new("home");
    const SETTINGS: WindowId = WindowId::new("settings");
    const PROFILE: WindowId = WindowId::new("profile");

    struct Fixture {
        home: Rc<Screen>,
        settings: Rc<Screen>,
        profile: Rc<Screen>,
        controller: Controller,
    }

    fn fixture() -> Fixture {
        let runner = AnimationRunner::new();
        let screen = |id| Screen::new(id, VisualState::shared(320.0, 240.0), &runner);
        let (home, settings, profile) = (screen(HOME), screen(SETTINGS), screen(PROFILE));
        let mut controller = Controller::new(
            [home.clone(), settings.clone(), profile.clone()],
            runner.clone(),
        )
        .unwrap();
        controller.init(HOME).unwrap();
        Fixture {
            home,
            settings,
            profile,
            controller,
        }
    }

    fn fade(length: f32) -> WindowTransition {
        WindowTransition::new(length, EasingMode::Linear).with_animation(AnimationType::Fade)
    }

    fn run_for(controller: &Controller, seconds: f32) {
        let steps = (seconds / 0.05).round() as usize;
        for _ in 0..steps {
            controller.update(0.05);
        }
    }

    #[test]
    fn test_home_settings_round_trip() {
        let mut f = fixture();
        assert_eq!(f.home.access_state(), AccessState::Open);

        let event = f.controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        assert!(event.success);
        assert_eq!(f.controller.history_count(), 1);
        assert!(f.controller.is_transitioning());
        assert_eq!(f.home.access_state(), AccessState::Closing);
        assert_eq!(f.settings.access_state(), AccessState::Opening);

        run_for(&f.controller, 0.6);
        assert_eq!(f.controller.active_screen(), Some(SETTINGS));
        assert_eq!(f.controller.history_count(), 1);
        assert!(!f.controller.is_transitioning());
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert_eq!(f.settings.access_state(), AccessState::Open);

        let event = f.controller.close_screen().unwrap();
        assert!(event.success);
        assert_eq!(f.settings.animator().play_mode(), PlayMode::Reverse);

        run_for(&f.controller, 0.6);
        assert_eq!(f.controller.active_screen(), Some(HOME));
        assert_eq!(f.controller.history_count(), 0);
        assert_eq!(f.home.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_close_mid_transition_inverts() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, fade(1.0)).unwrap();
        run_for(&f.controller, 0.3);

        f.controller.close_screen().unwrap();
        assert_eq!(f.controller.active_screen(), Some(HOME));
        assert_eq!(f.controller.queued_transition_count(), 0);
        assert!((f.settings.animator().normalized_time() - 0.3).abs() < 1e-3);

        run_for(&f.controller, 0.3);
        assert!(!f.controller.is_transitioning());
        assert_eq!(f.home.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert!(
            f.controller
                .drain_transition_events()
                .iter()
                .any(|e| matches!(e, TransitionEvent::Inverted { .. }))
        );
    }

    #[test]
    fn test_open_during_transition_queues() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        f.controller.open_screen_with(PROFILE, fade(0.5)).unwrap();

        assert_eq!(f.controller.active_screen(), Some(PROFILE));
        assert_eq!(f.controller.queued_transition_count(), 1);
        assert_eq!(f.controller.history_count(), 2);

        run_for(&f.controller, 1.0);
        assert!(!f.controller.is_transitioning());
        assert_eq!(f.profile.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert_eq!(f.home.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_back_before_queued_step_runs_cancels_it() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        f.controller.open_screen_with(PROFILE, fade(0.5)).unwrap();
        f.controller.close_screen().unwrap();

        assert_eq!(f.controller.active_screen(), Some(SETTINGS));
        assert_eq!(f.controller.queued_transition_count(), 0);

        run_for(&f.controller, 0.6);
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(f.profile.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_open_active_screen_fails_without_transition() {
        let mut f = fixture();
        let event = f.controller.open_screen(HOME).unwrap();
        assert!(!event.success);
        assert!(!f.controller.is_transitioning());
    }

    #[test]
    fn test_locked_controller_ignores_navigation() {
        let mut f = fixture();
        f.controller.lock();
        assert!(!f.controller.open_screen(SETTINGS).unwrap().success);
        assert!(f.controller.unlock());
        assert!(f.controller.open_screen(SETTINGS).unwrap().success);
    }

    #[test]
    fn test_close_with_empty_history_fails() {
        let mut f = fixture();
        let event = f.controller.close_screen().unwrap();
        assert!(!event.success);
        assert!(!f.controller.can_go_back());
    }

    #[test]
    fn test_open_before_init_is_an_error() {
        let runner = AnimationRunner::new();
        let home = Screen::new(HOME, VisualState::shared(1.0, 1.0), &runner);
        let mut controller = Controller::new([home], runner).unwrap();
        assert_eq!(
            controller.open_screen(HOME).unwrap_err(),
            ControllerError::NoActiveScreen
        );
        assert_eq!(
            controller.init(SETTINGS).unwrap_err(),
            ControllerError::Navigation(NavigationError::UnknownWindow(SETTINGS))
        );
    }

    #[test]
    fn test_default_transition_comes_from_config() {
        let runner = AnimationRunner::new();
        let home = Screen::new(HOME, VisualState::shared(1.0, 1.0), &runner);
        let settings = Screen::new(SETTINGS, VisualState::shared(1.0, 1.0), &runner);
        let mut config = SegueConfig::default();
        config.transitions.default_length = 0.2;
        config.transitions.default_animation = AnimationType::SlideUp;
        config.runner.time_scale = 2.0;

        let mut controller =
            Controller::with_config([home, settings.clone()], runner.clone(), &config).unwrap();
        assert_eq!(runner.time_scale(), 2.0);
        assert_eq!(controller.default_transition().length, 0.2);

        controller.init(HOME).unwrap();
        controller.open_screen(SETTINGS).unwrap();
        assert_eq!(
            settings.animator().animation(),
            settings.create_animation(AnimationType::SlideUp, 0.2)
        );

        // Twice the speed: 0.1 seconds of frames cover the 0.2 second transition.
        run_for(&controller, 0.1);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_skip_transitions() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        assert!(f.controller.skip_transitions());
        assert!(!f.controller.is_transitioning());
        assert_eq!(f.settings.access_state(), AccessState::Open);
        assert_eq!(f.home.access_state(), AccessState::Closed);
        assert!(!f.controller.skip_transitions());
    }

    #[test]
    fn test_skip_with_queued_step_shows_active_screen() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        f.controller.open_screen_with(PROFILE, fade(0.5)).unwrap();
        assert_eq!(f.controller.queued_transition_count(), 1);

        assert!(f.controller.skip_transitions());
        run_for(&f.controller, 2.0);
        assert_eq!(f.controller.active_screen(), Some(PROFILE));
        assert_eq!(f.profile.access_state(), AccessState::Open);
        assert_eq!(f.settings.access_state(), AccessState::Closed);
        assert_eq!(f.home.access_state(), AccessState::Closed);

        f.controller.open_screen_with(HOME, fade(0.5)).unwrap();
        run_for(&f.controller, 0.6);
        assert_eq!(f.home.access_state(), AccessState::Open);
        assert_eq!(f.profile.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_drop_with_queued_step_shows_active_screen() {
        let Fixture {
            settings,
            profile,
            mut controller,
            ..
        } = fixture();
        controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        controller.open_screen_with(PROFILE, fade(0.5)).unwrap();
        drop(controller);

        assert_eq!(profile.access_state(), AccessState::Open);
        assert_eq!(settings.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_transition_events_stay_bounded() {
        let mut f = fixture();
        for _ in 0..500 {
            f.controller.open_screen_with(SETTINGS, WindowTransition::instant()).unwrap();
            f.controller.close_screen().unwrap();
        }
        assert_eq!(f.controller.active_screen(), Some(HOME));
        assert_eq!(f.controller.transitions().pending_event_count(), EVENT_LOG_CAPACITY);

        let events = f.controller.drain_transition_events();
        assert!(events.last().is_some_and(TransitionEvent::is_completed));
        assert_eq!(f.controller.transitions().pending_event_count(), 0);
    }

    #[test]
    fn test_rejected_transition_leaves_navigation_unchanged() {
        let mut f = fixture();
        // A transition started behind the controller's back ends on settings,
        // so a step that starts from home cannot chain after it.
        f.controller
            .transitions()
            .handle_new_transition(
                TransitionRequest::new(f.profile.clone(), f.settings.clone(), fade(0.5)),
                false,
            )
            .unwrap();

        let err = f.controller.open_screen_with(PROFILE, fade(0.5)).unwrap_err();
        assert_eq!(
            err,
            ControllerError::Transition(TransitionError::InvalidChain {
                expected: SETTINGS,
                found: HOME,
            })
        );
        assert_eq!(f.controller.active_screen(), Some(HOME));
        assert_eq!(f.controller.history_count(), 0);
        assert_eq!(f.controller.queued_transition_count(), 0);
    }

    #[test]
    fn test_rejected_close_keeps_history() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, WindowTransition::instant()).unwrap();
        f.controller
            .transitions()
            .handle_new_transition(
                TransitionRequest::new(f.home.clone(), f.profile.clone(), fade(0.5)),
                false,
            )
            .unwrap();

        let err = f.controller.close_screen().unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Transition(TransitionError::InvalidChain { .. })
        ));
        assert_eq!(f.controller.active_screen(), Some(SETTINGS));
        assert_eq!(f.controller.history_count(), 1);
    }

    #[test]
    fn test_history_groups_passthrough() {
        let mut f = fixture();
        f.controller.open_screen_with(SETTINGS, WindowTransition::instant()).unwrap();
        f.controller.start_history_group();
        f.controller.open_screen_with(PROFILE, WindowTransition::instant()).unwrap();
        assert_eq!(f.controller.history_count(), 2);

        assert!(f.controller.clear_history_group());
        assert_eq!(f.controller.history_count(), 1);
        f.controller.clear_history();
        assert_eq!(f.controller.history_count(), 0);
    }

    #[test]
    fn test_drop_finishes_transition_in_flight() {
        let f = fixture();
        let Fixture {
            home,
            settings,
            mut controller,
            ..
        } = f;
        controller.open_screen_with(SETTINGS, fade(0.5)).unwrap();
        drop(controller);

        assert_eq!(settings.access_state(), AccessState::Open);
        assert_eq!(home.access_state(), AccessState::Closed);
    }

    #[test]
    fn test_listeners_see_controller_navigation() {
        let mut f = fixture();
        let count = Rc::new(std::cell::Cell::new(0));
        let seen = count.clone();
        f.controller.subscribe(move |_| seen.set(seen.get() + 1));

        f.controller.open_screen_with(SETTINGS, WindowTransition::instant()).unwrap();
        f.controller.close_screen().unwrap();
        assert_eq!(count.get(), 2);
    }
}
