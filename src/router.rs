//! Per-tick input driver
//!
//! The router owns the device adapter, the state tracker, the global listener
//! registry, the presenter and the attached scene. Each tick it gathers
//! samples, diffs them, hit tests and dispatches.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, info, trace};

use crate::adapter::{DeviceAdapter, collect_snapshots};
use crate::camera::Camera;
use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::event::{ListenerRegistry, SharedListener};
use crate::input::{Dispatcher, StateTracker};
use crate::presenter::Presenter;
use crate::scene::Scene;

/// Counts from one completed tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Snapshots handed to the tracker
    pub snapshots: usize,
    /// Canonical events produced
    pub events: usize,
    /// Listener callbacks made
    pub deliveries: usize,
}

/// Routes one adapter's devices into a scene
pub struct InputRouter<A: DeviceAdapter> {
    config: RouterConfig,
    adapter: A,
    tracker: StateTracker,
    registry: Rc<RefCell<ListenerRegistry>>,
    presenter: Option<Rc<RefCell<Presenter>>>,
    scene: Option<Scene>,
    tick_count: u64,
}

impl<A: DeviceAdapter> InputRouter<A> {
    /// Creates a router and registers every device the adapter drives
    pub fn new(config: RouterConfig, adapter: A) -> Result<Self> {
        config.validate()?;

        let mut tracker = StateTracker::new(&config);
        for device in adapter.known_devices() {
            tracker.register_device(*device)?;
        }

        info!(
            profile = %config.profile,
            adapter = adapter.name(),
            devices = tracker.device_count(),
            "Input router ready"
        );

        Ok(Self {
            config,
            adapter,
            tracker,
            registry: Rc::new(RefCell::new(ListenerRegistry::new())),
            presenter: None,
            scene: None,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Sets the scene events are routed into, returning the previous one
    pub fn attach_scene(&mut self, scene: Scene) -> Option<Scene> {
        debug!(nodes = scene.len(), "Attached scene");
        self.scene.replace(scene)
    }

    pub fn detach_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Adds a global listener; returns false if it was already registered
    pub fn register_listener(&self, listener: SharedListener) -> bool {
        self.registry.borrow_mut().register(listener)
    }

    /// Removes a global listener; returns false if it was not registered
    pub fn remove_listener(&self, listener: &SharedListener) -> bool {
        self.registry.borrow_mut().remove(listener)
    }

    /// Shared handle to the global registry
    ///
    /// Listeners may hold a clone to deregister themselves during dispatch.
    pub fn registry(&self) -> Rc<RefCell<ListenerRegistry>> {
        Rc::clone(&self.registry)
    }

    /// The presenter, created and registered as a global listener on first use
    pub fn presenter(&mut self) -> Rc<RefCell<Presenter>> {
        if let Some(presenter) = &self.presenter {
            return Rc::clone(presenter);
        }
        let presenter = Rc::new(RefCell::new(Presenter::new(self.config.presenter.clone())));
        self.register_listener(presenter.clone());
        self.presenter = Some(Rc::clone(&presenter));
        presenter
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Runs one input tick
    ///
    /// The presenter sees `camera` before any event is dispatched.
    pub fn tick(&mut self, samples: &[A::Sample], camera: &Camera) -> Result<TickReport> {
        let Some(scene) = self.scene.as_ref() else {
            error!("Input tick requested with no active scene");
            return Err(RouterError::NoActiveScene);
        };
        self.tick_count += 1;

        if let Some(presenter) = &self.presenter {
            match presenter.try_borrow_mut() {
                Ok(mut presenter) => presenter.update_camera(camera),
                Err(_) => error!("Presenter is borrowed, camera not updated"),
            }
        }

        let head = self.adapter.update_head(camera);
        let snapshots = collect_snapshots(&mut self.adapter, samples);
        let events = self.tracker.process(scene, &snapshots);
        let deliveries = Dispatcher::new(scene, &self.registry).dispatch(Some(&head), &events);

        let report = TickReport {
            tick: self.tick_count,
            snapshots: snapshots.len(),
            events: events.len(),
            deliveries,
        };
        trace!(?report, "Tick complete");
        Ok(report)
    }
}
