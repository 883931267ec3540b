//! Two-pass event delivery
//!
//! Each batch goes first to every global listener that enables its action,
//! then per device to the nearest scene node (walking up from the hit node)
//! whose listener enables it.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::{trace, warn};

use super::tracker::TickEvents;
use crate::event::{
    ButtonEvent, CameraTransform, DeviceId, EventAction, EventListener, ListenerRegistry,
    SharedListener,
};
use crate::scene::{NodeId, Scene};

/// Fans one tick's events out to global and node listeners
pub struct Dispatcher<'a> {
    scene: &'a Scene,
    registry: &'a RefCell<ListenerRegistry>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(scene: &'a Scene, registry: &'a RefCell<ListenerRegistry>) -> Self {
        Self { scene, registry }
    }

    /// Delivers a full tick in the fixed order and returns the number of
    /// callbacks made
    pub fn dispatch(&self, camera: Option<&CameraTransform>, events: &TickEvents) -> usize {
        let mut delivered = 0;

        if let Some(camera) = camera {
            delivered += self.global_pass(EventAction::CameraTransformUpdate, |l| {
                l.on_camera_transform(camera)
            });
        }

        if !events.moves.is_empty() {
            delivered += self.global_pass(EventAction::Move, |l| l.on_move(&events.moves));
        }

        if !events.hovers.is_empty() {
            delivered += self.global_pass(EventAction::Hover, |l| l.on_hover(&events.hovers));
            for hover in &events.hovers {
                if let Some(target) = hover.target() {
                    delivered += self.node_pass(EventAction::Hover, target, |l| {
                        l.on_hover(std::slice::from_ref(hover))
                    });
                }
            }
        }

        delivered += self.button_passes(&events.buttons);
        delivered += self.button_passes(&events.clicks);

        if !events.thumbsticks.is_empty() {
            delivered += self.global_pass(EventAction::ThumbStick, |l| {
                l.on_thumbstick(&events.thumbsticks)
            });
        }
        if !events.triggers.is_empty() {
            delivered +=
                self.global_pass(EventAction::Trigger, |l| l.on_trigger(&events.triggers));
        }
        if !events.statuses.is_empty() {
            delivered += self.global_pass(EventAction::ControllerStatus, |l| {
                l.on_controller_status(&events.statuses)
            });
        }

        delivered
    }

    /// Global batch, then one node delivery per device
    fn button_passes(&self, batch: &[ButtonEvent]) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let mut delivered = self.global_pass(EventAction::Click, |l| l.on_button(batch));

        let mut per_device: BTreeMap<DeviceId, Vec<ButtonEvent>> = BTreeMap::new();
        for event in batch {
            per_device.entry(event.device).or_default().push(*event);
        }

        for (device, events) in per_device {
            // A device hits exactly one node per tick, so the first event's
            // target stands for the whole sub-batch
            let target = events[0].target;
            trace!(%device, node = %target, count = events.len(), "Routing button sub-batch");
            delivered += self.node_pass(EventAction::Click, target, |l| l.on_button(&events));
        }

        delivered
    }

    /// Delivers to every global listener that enables `action`
    fn global_pass(&self, action: EventAction, mut deliver: impl FnMut(&mut dyn EventListener)) -> usize {
        let listeners = match self.registry.try_borrow() {
            Ok(registry) => registry.snapshot(),
            Err(_) => {
                warn!(?action, "Listener registry is busy, skipping global pass");
                return 0;
            }
        };

        let mut delivered = 0;
        for listener in &listeners {
            // Removed by an earlier callback in this pass
            if !self.is_registered(listener) {
                continue;
            }
            if invoke(listener, action, &mut deliver) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Delivers to the nearest listener at or above `node` that enables `action`
    fn node_pass(
        &self,
        action: EventAction,
        node: NodeId,
        mut deliver: impl FnMut(&mut dyn EventListener),
    ) -> usize {
        let Some(handler) = self.scene.handler_for(action, node) else {
            trace!(?action, %node, "No node listener in ancestry");
            return 0;
        };
        let Some(listener) = self.scene.listener(handler) else {
            return 0;
        };
        usize::from(invoke(&listener, action, &mut deliver))
    }

    fn is_registered(&self, listener: &SharedListener) -> bool {
        self.registry
            .try_borrow()
            .map(|registry| registry.contains(listener))
            .unwrap_or(true)
    }
}

/// Calls `deliver` if the listener enables `action` and is not already
/// mid-callback
fn invoke(
    listener: &SharedListener,
    action: EventAction,
    deliver: &mut impl FnMut(&mut dyn EventListener),
) -> bool {
    let Ok(mut guard) = listener.try_borrow_mut() else {
        warn!(?action, "Listener is already borrowed, skipping delivery");
        return false;
    };
    if !guard.is_enabled(action) {
        return false;
    }
    deliver(&mut *guard);
    true
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::{Quat, Vec3};

    use super::*;
    use crate::event::{
        ClickState, EnabledActions, HoverEvent, MoveEvent, SourceId, TriggerEvent, shared,
    };

    #[derive(Default)]
    struct Recorder {
        actions: EnabledActions,
        log: Vec<String>,
    }

    impl Recorder {
        fn with(actions: &[EventAction]) -> Rc<RefCell<Recorder>> {
            shared(Recorder {
                actions: EnabledActions::with(actions),
                log: Vec::new(),
            })
        }
    }

    impl EventListener for Recorder {
        fn actions(&self) -> &EnabledActions {
            &self.actions
        }

        fn actions_mut(&mut self) -> &mut EnabledActions {
            &mut self.actions
        }

        fn on_button(&mut self, events: &[ButtonEvent]) {
            for e in events {
                self.log.push(format!("{:?}:{}", e.state, e.device.0));
            }
        }

        fn on_hover(&mut self, events: &[HoverEvent]) {
            for e in events {
                self.log.push(format!("hover:{}", e.is_hovering));
            }
        }

        fn on_move(&mut self, events: &[MoveEvent]) {
            self.log.push(format!("move:{}", events.len()));
        }

        fn on_trigger(&mut self, events: &[TriggerEvent]) {
            self.log.push(format!("trigger:{}", events.len()));
        }

        fn on_camera_transform(&mut self, _transform: &CameraTransform) {
            self.log.push("camera".to_string());
        }
    }

    fn button(device: u32, state: ClickState, target: NodeId) -> ButtonEvent {
        ButtonEvent {
            device: DeviceId(device),
            source: SourceId(1),
            state,
            hit_position: Vec3::ZERO,
            target,
        }
    }

    #[test]
    fn test_global_listener_receives_whole_batch() {
        let scene = Scene::new();
        let registry = RefCell::new(ListenerRegistry::new());
        let global = Recorder::with(&[EventAction::Click]);
        registry.borrow_mut().register(global.clone());

        let events = TickEvents {
            buttons: vec![
                button(1, ClickState::Down, scene.root()),
                button(2, ClickState::Down, scene.root()),
            ],
            ..Default::default()
        };
        let delivered = Dispatcher::new(&scene, &registry).dispatch(None, &events);

        assert_eq!(delivered, 1);
        assert_eq!(global.borrow().log, vec!["Down:1", "Down:2"]);
    }

    #[test]
    fn test_node_pass_splits_by_device() {
        let mut scene = Scene::new();
        let a = scene.add_child(scene.root(), "a");
        let b = scene.add_child(scene.root(), "b");
        let on_a = Recorder::with(&[EventAction::Click]);
        let on_b = Recorder::with(&[EventAction::Click]);
        scene.set_listener(a, on_a.clone());
        scene.set_listener(b, on_b.clone());
        let registry = RefCell::new(ListenerRegistry::new());

        let events = TickEvents {
            buttons: vec![button(1, ClickState::Down, a), button(2, ClickState::Up, b)],
            ..Default::default()
        };
        Dispatcher::new(&scene, &registry).dispatch(None, &events);

        assert_eq!(on_a.borrow().log, vec!["Down:1"]);
        assert_eq!(on_b.borrow().log, vec!["Up:2"]);
    }

    #[test]
    fn test_disabled_action_gets_nothing() {
        let scene = Scene::new();
        let registry = RefCell::new(ListenerRegistry::new());
        let global = Recorder::with(&[EventAction::Hover]);
        registry.borrow_mut().register(global.clone());

        let events = TickEvents {
            triggers: vec![TriggerEvent {
                device: DeviceId(1),
                source: SourceId(3),
                weight: 0.4,
            }],
            ..Default::default()
        };
        assert_eq!(Dispatcher::new(&scene, &registry).dispatch(None, &events), 0);
        assert!(global.borrow().log.is_empty());
    }

    #[test]
    fn test_tick_order() {
        let scene = Scene::new();
        let registry = RefCell::new(ListenerRegistry::new());
        let global = Recorder::with(&[
            EventAction::CameraTransformUpdate,
            EventAction::Move,
            EventAction::Hover,
            EventAction::Click,
            EventAction::Trigger,
        ]);
        registry.borrow_mut().register(global.clone());

        let root = scene.root();
        let events = TickEvents {
            moves: vec![MoveEvent {
                device: DeviceId(1),
                source: SourceId::DEVICE,
                position: Vec3::ZERO,
                orientation: Quat::IDENTITY,
            }],
            hovers: vec![HoverEvent {
                device: DeviceId(1),
                source: SourceId::DEVICE,
                is_hovering: true,
                hit_position: Vec3::ZERO,
                entered: root,
                exited: None,
                is_background_hit: true,
            }],
            buttons: vec![button(1, ClickState::Up, root)],
            clicks: vec![button(1, ClickState::Clicked, root)],
            triggers: vec![TriggerEvent {
                device: DeviceId(1),
                source: SourceId(3),
                weight: 1.0,
            }],
            ..Default::default()
        };
        let camera = CameraTransform::from_pose(Vec3::ZERO, Quat::IDENTITY);
        Dispatcher::new(&scene, &registry).dispatch(Some(&camera), &events);

        assert_eq!(
            global.borrow().log,
            vec!["camera", "move:1", "hover:true", "Up:1", "Clicked:1", "trigger:1"]
        );
    }

    #[test]
    fn test_busy_listener_is_skipped() {
        let scene = Scene::new();
        let registry = RefCell::new(ListenerRegistry::new());
        let global = Recorder::with(&[EventAction::Click]);
        registry.borrow_mut().register(global.clone());

        let _held = global.borrow_mut();
        let events = TickEvents {
            buttons: vec![button(1, ClickState::Down, scene.root())],
            ..Default::default()
        };
        assert_eq!(Dispatcher::new(&scene, &registry).dispatch(None, &events), 0);
    }
}
