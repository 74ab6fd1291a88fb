use anyhow::{Result, bail};
use segue_anim::{AnimationRunner, AnimationType, EasingMode, VisualState};
use segue_config::SegueConfig;
use segue_nav::{Controller, Screen, TransitionEvent, WindowId, WindowTransition};
use std::cell::RefCell;
use std::rc::Rc;

const HOME: WindowId = WindowId::new("home");
const SETTINGS: WindowId = WindowId::new("settings");
const PROFILE: WindowId = WindowId::new("profile");

/// Simulated frame length (60 Hz).
const FRAME: f32 = 1.0 / 60.0;

type Surfaces = Vec<(WindowId, Rc<RefCell<VisualState>>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    RoundTrip,
    Interrupt,
    Chain,
}

impl Scenario {
    fn from_args() -> Self {
        let env = std::env::var("SEGUE_SCENARIO").ok();
        let flag = |name: &str| {
            env.as_deref() == Some(name)
                || std::env::args().any(|a| a == format!("--scenario={name}") || a == format!("--{name}"))
        };
        if flag("interrupt") {
            Self::Interrupt
        } else if flag("chain") {
            Self::Chain
        } else {
            Self::RoundTrip
        }
    }
}

fn main() -> Result<()> {
    let config = SegueConfig::load();
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.filter.as_str()),
    )
    .try_init();

    let runner = AnimationRunner::new();
    let mut surfaces = Surfaces::new();
    let mut screens = Vec::new();
    for id in [HOME, SETTINGS, PROFILE] {
        let visual = VisualState::shared(1280.0, 720.0);
        screens.push(Screen::new(id, visual.clone(), &runner));
        surfaces.push((id, visual));
    }

    let mut controller = Controller::with_config(screens, runner, &config)?;
    controller.init(HOME)?;

    let scenario = Scenario::from_args();
    log::info!(
        "running {:?} with default transition {:.2}s {} ({})",
        scenario,
        config.transitions.default_length,
        config.transitions.default_animation,
        config.transitions.default_easing
    );

    match scenario {
        Scenario::RoundTrip => round_trip(&mut controller, &surfaces)?,
        Scenario::Interrupt => interrupt(&mut controller, &surfaces)?,
        Scenario::Chain => chain(&mut controller, &surfaces)?,
    }

    for event in controller.drain_transition_events() {
        log::info!("transition event: {:?}", event);
    }
    controller.shutdown();
    Ok(())
}

/// Home -> Settings, then back.
fn round_trip(controller: &mut Controller, surfaces: &Surfaces) -> Result<()> {
    controller.open_screen(SETTINGS)?;
    settle(controller, surfaces)?;
    expect_active(controller, SETTINGS)?;

    controller.close_screen()?;
    settle(controller, surfaces)?;
    expect_active(controller, HOME)
}

/// Go back halfway through a slide; the transition reverses from where it is.
fn interrupt(controller: &mut Controller, surfaces: &Surfaces) -> Result<()> {
    let slide = WindowTransition::new(0.6, EasingMode::EaseOutCubic)
        .with_animation(AnimationType::SlideLeft);
    controller.open_screen_with(SETTINGS, slide)?;
    for _ in 0..18 {
        controller.update(FRAME);
    }
    log_surfaces(surfaces);

    controller.close_screen()?;
    let inverted = controller
        .drain_transition_events()
        .iter()
        .any(|event| matches!(event, TransitionEvent::Inverted { .. }));
    log::info!("close during transition inverted in place: {}", inverted);

    settle(controller, surfaces)?;
    expect_active(controller, HOME)
}

/// Open two screens back to back; the second waits for the first.
fn chain(controller: &mut Controller, surfaces: &Surfaces) -> Result<()> {
    controller.open_screen(SETTINGS)?;
    controller.open_screen_with(
        PROFILE,
        WindowTransition::new(0.4, EasingMode::EaseInOutBack).with_entry(AnimationType::Expand),
    )?;
    log::info!("queued transitions: {}", controller.queued_transition_count());

    settle(controller, surfaces)?;
    expect_active(controller, PROFILE)?;

    controller.start_history_group();
    controller.open_screen_with(HOME, WindowTransition::instant())?;
    controller.clear_history_group();
    log::info!("history after discarding modal group: {}", controller.history_count());
    Ok(())
}

/// Tick until no transition is active.
fn settle(controller: &Controller, surfaces: &Surfaces) -> Result<()> {
    let mut frames = 0;
    while controller.is_transitioning() {
        controller.update(FRAME);
        frames += 1;
        if frames % 10 == 0 {
            log_surfaces(surfaces);
        }
        if frames > 60 * 30 {
            bail!("transition did not settle after {} frames", frames);
        }
    }
    log::info!("settled after {} frames", frames);
    log_surfaces(surfaces);
    Ok(())
}

fn expect_active(controller: &Controller, expected: WindowId) -> Result<()> {
    match controller.active_screen() {
        Some(active) if active == expected => {
            log::info!("active screen: {} (history {})", active, controller.history_count());
            Ok(())
        }
        other => bail!("expected {} to be active, found {:?}", expected, other),
    }
}

fn log_surfaces(surfaces: &Surfaces) {
    for (id, visual) in surfaces {
        let visual = visual.borrow();
        log::debug!(
            "{:>8}: visible={} opacity={:.2} offset=({:.0}, {:.0}) scale=({:.2}, {:.2}) order={}",
            id.as_str(),
            visual.visible,
            visual.opacity,
            visual.offset.0,
            visual.offset.1,
            visual.scale.0,
            visual.scale.1,
            visual.sort_order
        );
    }
}
