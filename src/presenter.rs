//! Visual feedback listener
//!
//! The presenter is an ordinary listener that keeps one reticle per device and
//! sizes it so it covers the same screen area at any depth. Batches it receives
//! are passed on to an optional downstream listener.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;

use glam::Vec3;
use tracing::{trace, warn};

use crate::camera::Camera;
use crate::config::PresenterConfig;
use crate::event::{
    ButtonEvent, DeviceId, EnabledActions, EventAction, EventListener, HoverEvent, MoveEvent,
};

/// Cursor drawn where a device points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    pub position: Vec3,
    pub radius: f32,
    /// Headlocked reticles stay fixed in view and ignore hover placement
    pub headlocked: bool,
    /// False until the reticle has been placed once
    pub visible: bool,
}

impl Reticle {
    fn new(headlocked: bool, radius: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            radius,
            headlocked,
            visible: false,
        }
    }
}

/// Reticle placement plus forwarding to a downstream listener
pub struct Presenter {
    actions: EnabledActions,
    config: PresenterConfig,
    camera: Option<Camera>,
    reticles: BTreeMap<DeviceId, Reticle>,
    device_positions: BTreeMap<DeviceId, Vec3>,
    last_forward: BTreeMap<DeviceId, Vec3>,
    delegate: Option<Weak<RefCell<dyn EventListener>>>,
}

impl Presenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self {
            actions: EnabledActions::with(&[EventAction::Click, EventAction::Move, EventAction::Hover]),
            config,
            camera: None,
            reticles: BTreeMap::new(),
            device_positions: BTreeMap::new(),
            last_forward: BTreeMap::new(),
            delegate: None,
        }
    }

    /// Camera used for reticle sizing; must be applied before the tick's dispatch
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera = Some(*camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Adds or replaces the reticle drawn for `device`
    pub fn add_reticle(&mut self, device: DeviceId, headlocked: bool) {
        self.reticles
            .insert(device, Reticle::new(headlocked, self.config.min_reticle_radius));
    }

    pub fn remove_reticle(&mut self, device: DeviceId) -> Option<Reticle> {
        self.reticles.remove(&device)
    }

    pub fn reticle(&self, device: DeviceId) -> Option<&Reticle> {
        self.reticles.get(&device)
    }

    pub fn reticles(&self) -> impl Iterator<Item = (DeviceId, &Reticle)> {
        self.reticles.iter().map(|(device, reticle)| (*device, reticle))
    }

    /// Last forward vector reported for `device`
    pub fn last_forward(&self, device: DeviceId) -> Option<Vec3> {
        self.last_forward.get(&device).copied()
    }

    /// Sets the listener that receives every batch after the presenter
    ///
    /// Only a weak reference is kept.
    pub fn set_delegate(&mut self, delegate: Weak<RefCell<dyn EventListener>>) {
        self.delegate = Some(delegate);
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Reticle radius that keeps a constant screen size at `depth`
    pub fn reticle_radius(&self, camera: &Camera, depth: f32) -> f32 {
        let radius = camera.world_per_screen(depth).abs() * self.config.reticle_size_multiple;
        radius.clamp(self.config.min_reticle_radius, self.config.max_reticle_radius)
    }

    fn place_reticle(&mut self, event: &HoverEvent) {
        let Some(camera) = self.camera else {
            return;
        };
        let origin = self
            .device_positions
            .get(&event.device)
            .copied()
            .unwrap_or(camera.position);
        let depth = -event.hit_position.distance(origin);
        let radius = self.reticle_radius(&camera, depth);

        let Some(reticle) = self.reticles.get_mut(&event.device) else {
            return;
        };
        if reticle.headlocked {
            return;
        }
        reticle.position = event.hit_position;
        reticle.radius = radius;
        reticle.visible = true;
        trace!(device = %event.device, radius, "Placed reticle");
    }

    fn forward(&self, action: EventAction, deliver: impl FnOnce(&mut dyn EventListener)) {
        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let Ok(mut delegate) = delegate.try_borrow_mut() else {
            warn!(?action, "Presenter delegate is busy, dropping batch");
            return;
        };
        if delegate.is_enabled(action) {
            deliver(&mut *delegate);
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(PresenterConfig::default())
    }
}

impl EventListener for Presenter {
    fn name(&self) -> &str {
        "presenter"
    }

    fn actions(&self) -> &EnabledActions {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut EnabledActions {
        &mut self.actions
    }

    fn on_button(&mut self, events: &[ButtonEvent]) {
        self.forward(EventAction::Click, |d| d.on_button(events));
    }

    fn on_move(&mut self, events: &[MoveEvent]) {
        for event in events {
            self.device_positions.insert(event.device, event.position);
            self.last_forward.insert(event.device, event.forward());
        }
        self.forward(EventAction::Move, |d| d.on_move(events));
    }

    fn on_hover(&mut self, events: &[HoverEvent]) {
        for event in events.iter().filter(|e| e.is_hovering) {
            self.place_reticle(event);
        }
        self.forward(EventAction::Hover, |d| d.on_hover(events));
    }
}
