//! Listener capability trait and the global listener registry

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::action::{EnabledActions, EventAction};
use super::{
    ButtonEvent, CameraTransform, ControllerStatusEvent, HoverEvent, MoveEvent, ThumbStickEvent,
    TriggerEvent,
};

/// Trait for anything that receives canonical event batches
///
/// A listener is either registered globally with the router, or owned by a
/// scene node. It only receives a batch kind after enabling the matching
/// [`EventAction`]; every action starts disabled.
pub trait EventListener {
    /// Name of this listener for debugging
    fn name(&self) -> &str {
        "listener"
    }

    /// The listener's action → enabled map
    fn actions(&self) -> &EnabledActions;

    /// Mutable access to the action → enabled map
    fn actions_mut(&mut self) -> &mut EnabledActions;

    /// Enables or disables delivery of one action
    fn set_enabled(&mut self, action: EventAction, enabled: bool) {
        self.actions_mut().set(action, enabled);
    }

    /// Returns true if batches of this action should be delivered
    fn is_enabled(&self, action: EventAction) -> bool {
        self.actions().is_enabled(action)
    }

    /// Down, Up and Clicked transitions
    fn on_button(&mut self, _events: &[ButtonEvent]) {}

    /// Hover on/off transitions
    fn on_hover(&mut self, _events: &[HoverEvent]) {}

    /// Device pose changes
    fn on_move(&mut self, _events: &[MoveEvent]) {}

    /// Thumbstick axis/click changes
    fn on_thumbstick(&mut self, _events: &[ThumbStickEvent]) {}

    /// Analog trigger changes
    fn on_trigger(&mut self, _events: &[TriggerEvent]) {}

    /// Connection, tracking and battery changes
    fn on_controller_status(&mut self, _events: &[ControllerStatusEvent]) {}

    /// Head/camera transform, once per tick
    fn on_camera_transform(&mut self, _transform: &CameraTransform) {}
}

/// Listener handle shared between the registry, scene nodes and the caller
pub type SharedListener = Rc<RefCell<dyn EventListener>>;

/// Wraps a listener for registration while keeping its concrete type
///
/// The returned handle coerces to [`SharedListener`] at the call site.
pub fn shared<L: EventListener + 'static>(listener: L) -> Rc<RefCell<L>> {
    Rc::new(RefCell::new(listener))
}

fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Set of global listeners
///
/// Registration is idempotent; a listener registered twice still receives
/// each batch once.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: Vec<SharedListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener; returns false if it was already registered
    pub fn register(&mut self, listener: SharedListener) -> bool {
        if self.contains(&listener) {
            return false;
        }
        debug!(listener = %listener.borrow().name(), "Registered global listener");
        self.listeners.push(listener);
        true
    }

    /// Removes a listener; returns false if it was not registered
    pub fn remove(&mut self, listener: &SharedListener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &SharedListener) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current listener set, taken before a dispatch pass
    pub fn snapshot(&self) -> Vec<SharedListener> {
        self.listeners.clone()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .listeners
            .iter()
            .map(|l| match l.try_borrow() {
                Ok(listener) => listener.name().to_string(),
                Err(_) => "<busy>".to_string(),
            })
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &names)
            .finish()
    }
}
