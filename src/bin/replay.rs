//! Scripted controller replay
//!
//! Sweeps a tracked controller across a small menu scene, pressing the A
//! button over each item, and logs what every listener receives.

use std::f32::consts::PI;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::{Quat, Vec2, Vec3};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use scene_input::adapter::{
    TouchAdapter, TouchButtons, TouchInput, TouchPose, TouchSample, TrackingFlags,
};
use scene_input::event::{
    ButtonEvent, ClickState, ControllerStatusEvent, EnabledActions, EventAction, EventListener,
    HoverEvent, ThumbStickEvent, TriggerEvent, shared,
};
use scene_input::health::{self, checks::SceneCheck};
use scene_input::scene::{Scene, Shape};
use scene_input::{Camera, InputRouter, RouterConfig, RouterError};

#[derive(Parser)]
#[command(name = "replay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replays a scripted controller sweep through the input router", long_about = None)]
struct Cli {
    /// Configuration profile (defaults to SCENE_INPUT_PROFILE, then release)
    #[arg(short, long)]
    profile: Option<String>,

    /// Number of ticks to replay
    #[arg(short, long, default_value_t = 120)]
    ticks: u32,

    /// Run health checks instead of the replay
    #[arg(long)]
    health: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Logs every batch it receives
struct Logger {
    actions: EnabledActions,
    clicks: usize,
}

impl EventListener for Logger {
    fn name(&self) -> &str {
        "logger"
    }

    fn actions(&self) -> &EnabledActions {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut EnabledActions {
        &mut self.actions
    }

    fn on_button(&mut self, events: &[ButtonEvent]) {
        for event in events {
            if event.state == ClickState::Clicked {
                self.clicks += 1;
            }
            info!(device = %event.device, source = event.source.0, state = ?event.state, node = %event.target, "button");
        }
    }

    fn on_hover(&mut self, events: &[HoverEvent]) {
        for event in events {
            info!(device = %event.device, hovering = event.is_hovering, node = ?event.target(), background = event.is_background_hit, "hover");
        }
    }

    fn on_thumbstick(&mut self, events: &[ThumbStickEvent]) {
        for event in events {
            info!(device = %event.device, x = event.axis.x, y = event.axis.y, pressed = event.is_pressed, "thumbstick");
        }
    }

    fn on_trigger(&mut self, events: &[TriggerEvent]) {
        for event in events {
            info!(device = %event.device, source = event.source.0, weight = event.weight, "trigger");
        }
    }

    fn on_controller_status(&mut self, events: &[ControllerStatusEvent]) {
        for event in events {
            info!(device = %event.device, connected = event.is_connected, tracking = ?event.tracking, battery = event.battery_percent, "status");
        }
    }
}

/// Menu node that counts the clicks it receives
struct MenuItem {
    label: &'static str,
    actions: EnabledActions,
    clicked: usize,
}

impl EventListener for MenuItem {
    fn name(&self) -> &str {
        self.label
    }

    fn actions(&self) -> &EnabledActions {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut EnabledActions {
        &mut self.actions
    }

    fn on_button(&mut self, events: &[ButtonEvent]) {
        let clicks = events.iter().filter(|e| e.state == ClickState::Clicked).count();
        if clicks > 0 {
            self.clicked += clicks;
            info!(item = self.label, "activated");
        }
    }
}

/// Menu of three items at eye height with a decorative frame that ignores input
fn build_scene(items: &[std::rc::Rc<std::cell::RefCell<MenuItem>>]) -> Scene {
    let mut scene = Scene::new();
    let menu = scene.add_child(scene.root(), "menu");

    let frame = scene.add_child(menu, "frame");
    scene.set_shape(frame, Shape::cuboid(Vec3::new(0.0, 1.5, -1.5), Vec3::new(1.5, 0.6, 0.02)));
    scene.set_ignore_events(frame, true);

    for (i, item) in items.iter().enumerate() {
        let x = (i as f32 - 1.0) * 0.8;
        let node = scene.add_child(menu, item.borrow().label);
        scene.set_shape(node, Shape::cuboid(Vec3::new(x, 1.5, -2.0), Vec3::new(0.3, 0.2, 0.05)));
        scene.set_listener(node, item.clone());
    }
    scene
}

/// Right controller sample for tick `t` of `total`
///
/// Yaw sweeps from left to right; A is held for a few ticks at each third.
fn scripted_sample(t: u32, total: u32) -> TouchSample {
    let progress = t as f32 / total.max(1) as f32;
    let yaw = (0.5 - progress) * PI / 3.0;
    let orientation = Quat::from_rotation_y(yaw);

    let phase = (progress * 3.0).fract();
    let mut buttons = TouchButtons::empty();
    if (0.45..0.55).contains(&phase) {
        buttons |= TouchButtons::A;
    }

    let input = TouchInput {
        buttons,
        index_trigger: if phase > 0.8 { 1.0 } else { 0.0 },
        hand_trigger: 0.0,
        thumbstick: Vec2::ZERO,
        battery_percent: 90,
    };
    let pose = TouchPose {
        position: Vec3::new(0.2, 1.5, -0.3),
        orientation,
        flags: TrackingFlags::all(),
    };
    TouchSample::new(TouchAdapter::RIGHT, input, pose)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.health {
        let report = health::run_all_checks();
        health::print_report(&report);
        std::process::exit(report.exit_code());
    }

    let config = match &cli.profile {
        Some(profile) => RouterConfig::load_validated(profile),
        None => RouterConfig::load_from_env()
            .map_err(RouterError::from)
            .and_then(|config| config.validate().map(|()| config)),
    }
    .context("loading router configuration")?;

    let items: Vec<_> = ["play", "options", "quit"]
        .into_iter()
        .map(|label| {
            shared(MenuItem {
                label,
                actions: EnabledActions::with(&[EventAction::Click]),
                clicked: 0,
            })
        })
        .collect();
    let scene = build_scene(&items);

    let scene_report = health::HealthCheckRunner::new()
        .add_check(SceneCheck::from_scene(&scene))
        .run();
    if !scene_report.is_healthy() {
        health::print_report(&scene_report);
        bail!("demo scene failed its integrity check");
    }

    let mut router = InputRouter::new(config, TouchAdapter::new())?;
    router.attach_scene(scene);

    let logger = shared(Logger {
        actions: EnabledActions::with(&[
            EventAction::Click,
            EventAction::Hover,
            EventAction::ThumbStick,
            EventAction::Trigger,
            EventAction::ControllerStatus,
        ]),
        clicks: 0,
    });
    router.register_listener(logger.clone());

    let presenter = router.presenter();
    presenter.borrow_mut().add_reticle(TouchAdapter::RIGHT, false);

    let camera = Camera::default().with_pose(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY);
    let mut events = 0;
    for t in 0..cli.ticks {
        let report = router.tick(&[scripted_sample(t, cli.ticks)], &camera)?;
        events += report.events;
    }

    if let Some(reticle) = presenter.borrow().reticle(TouchAdapter::RIGHT) {
        info!(position = ?reticle.position, radius = reticle.radius, "final reticle");
    }
    for item in &items {
        let item = item.borrow();
        info!(item = item.label, clicks = item.clicked, "menu item");
    }
    info!(
        ticks = router.tick_count(),
        events,
        clicks = logger.borrow().clicks,
        "Replay finished"
    );

    Ok(())
}
