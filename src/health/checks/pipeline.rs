//! End-to-end listener pipeline health check

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::adapter::SnapshotAdapter;
use crate::camera::Camera;
use crate::config::RouterConfig;
use crate::event::{
    ButtonEvent, ClickState, DeviceId, EnabledActions, EventAction, EventListener, SourceId,
    shared,
};
use crate::health::check::{CheckResult, Findings, HealthCheck};
use crate::input::Snapshot;
use crate::router::InputRouter;
use crate::scene::{Scene, Shape};

const PROBE_DEVICE: DeviceId = DeviceId(1);
const PROBE_SOURCE: SourceId = SourceId(1);

/// Records every button state it receives
struct Probe {
    actions: EnabledActions,
    states: Vec<ClickState>,
}

impl Probe {
    fn new() -> Rc<RefCell<Probe>> {
        shared(Probe {
            actions: EnabledActions::with(&[EventAction::Click]),
            states: Vec::new(),
        })
    }
}

impl EventListener for Probe {
    fn name(&self) -> &str {
        "probe"
    }

    fn actions(&self) -> &EnabledActions {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut EnabledActions {
        &mut self.actions
    }

    fn on_button(&mut self, events: &[ButtonEvent]) {
        self.states.extend(events.iter().map(|e| e.state));
    }
}

/// Drives a press and release through a throwaway router and checks that
/// global and node listeners both see the click
pub struct PipelineCheck {
    config: RouterConfig,
}

impl PipelineCheck {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::builtin("health"))
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self { config }
    }
}

impl Default for PipelineCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthCheck for PipelineCheck {
    fn name(&self) -> &str {
        "Listener pipeline"
    }

    fn description(&self) -> Option<&str> {
        Some("Routes a scripted click through tracker and dispatcher")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Findings::new();

        let adapter = SnapshotAdapter::new([PROBE_DEVICE]);
        let mut router = match InputRouter::new(self.config.clone(), adapter) {
            Ok(router) => router,
            Err(e) => {
                findings.fail(format!("Router setup failed: {e}"));
                return findings.finish("", "", "Pipeline could not be built");
            }
        };

        let mut scene = Scene::new();
        let target = scene.add_child(scene.root(), "probe-target");
        scene.set_shape(target, Shape::cuboid(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.5)));
        let node_probe = Probe::new();
        scene.set_listener(target, node_probe.clone());
        router.attach_scene(scene);

        let global_probe = Probe::new();
        router.register_listener(global_probe.clone());

        let aim = Snapshot::connected(PROBE_DEVICE).looking_at(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -2.0));
        let camera = Camera::default();
        let script = [
            aim.clone(),
            aim.clone().with_button(PROBE_SOURCE, true),
            aim.with_button(PROBE_SOURCE, false),
        ];
        for (tick, sample) in script.iter().enumerate() {
            if let Err(e) = router.tick(std::slice::from_ref(sample), &camera) {
                findings.fail(format!("Tick {tick} failed: {e}"));
                return findings.finish("", "", "Pipeline tick failed");
            }
        }
        findings.ok(format!("{} ticks routed", router.tick_count()));

        let expected = [ClickState::Down, ClickState::Up, ClickState::Clicked];
        let global = global_probe.borrow().states.clone();
        if global == expected {
            findings.ok("Global listener saw Down, Up, Clicked");
        } else {
            findings.fail(format!("Global listener saw {global:?}"));
        }

        let node = node_probe.borrow().states.clone();
        if node == expected {
            findings.ok("Node listener saw Down, Up, Clicked");
        } else {
            findings.fail(format!("Node listener saw {node:?}"));
        }

        findings.finish(
            "Click routed to global and node listeners",
            "Click routed with warnings",
            "Click did not reach every listener",
        )
    }
}
