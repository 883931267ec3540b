//! Per-device state tracking
//!
//! Diffs each device's snapshot against the previous tick, resolves targets
//! through the hit tester and owns the click-pairing state machine.
//!
//! Tick lifecycle per device: status → pose (hit test, hover) → buttons →
//! thumbstick → triggers → store snapshot.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::{debug, trace};

use super::snapshot::{Snapshot, ThumbStick};
use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::event::{
    ButtonEvent, ClickState, ControllerStatusEvent, DeviceId, HoverEvent, MoveEvent, SourceId,
    ThumbStickEvent, TrackingQuality, TriggerEvent,
};
use crate::scene::{HitTestResult, HitTester, NodeId, Scene};

/// Canonical events produced by one tick, grouped by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub moves: Vec<MoveEvent>,
    pub hovers: Vec<HoverEvent>,
    /// Down and Up transitions
    pub buttons: Vec<ButtonEvent>,
    /// Clicked events synthesized from matching Down/Up pairs
    pub clicks: Vec<ButtonEvent>,
    pub thumbsticks: Vec<ThumbStickEvent>,
    pub triggers: Vec<TriggerEvent>,
    pub statuses: Vec<ControllerStatusEvent>,
}

impl TickEvents {
    pub fn len(&self) -> usize {
        self.moves.len()
            + self.hovers.len()
            + self.buttons.len()
            + self.clicks.len()
            + self.thumbsticks.len()
            + self.triggers.len()
            + self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything remembered about one device between ticks
#[derive(Debug, Clone)]
struct TrackedDevice {
    id: DeviceId,
    last_snapshot: Snapshot,
    hit: Option<HitTestResult>,
    /// Down awaiting its Up
    pending: Option<ButtonEvent>,
    last_hover: Option<HoverEvent>,
    hovered: Option<NodeId>,
    status: ControllerStatusEvent,
}

impl TrackedDevice {
    fn new(id: DeviceId) -> Self {
        Self {
            id,
            last_snapshot: Snapshot::disconnected(id),
            hit: None,
            pending: None,
            last_hover: None,
            hovered: None,
            status: ControllerStatusEvent {
                device: id,
                is_connected: false,
                tracking: TrackingQuality::None,
                battery_percent: 0,
            },
        }
    }

    /// Forgets everything tied to the previous connection
    fn reset(&mut self) {
        self.last_snapshot = Snapshot::disconnected(self.id);
        self.hit = None;
        self.pending = None;
        self.last_hover = None;
        self.hovered = None;
    }
}

/// Diffs snapshots into canonical events, one slot per known device
pub struct StateTracker {
    /// Dense device table, in registration order
    devices: Vec<TrackedDevice>,
    capacity: usize,
    hit_tester: HitTester,
    bounds_only: bool,
    move_epsilon: f32,
    hover_events: bool,
}

impl StateTracker {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            devices: Vec::with_capacity(config.tracking.max_devices),
            capacity: config.tracking.max_devices,
            hit_tester: HitTester::new(config.hit_test.background_distance),
            bounds_only: config.hit_test.bounds_only,
            move_epsilon: config.tracking.move_epsilon,
            hover_events: config.tracking.hover_events,
        }
    }

    /// Adds a device slot; registering a known device again is a no-op
    pub fn register_device(&mut self, device: DeviceId) -> Result<()> {
        if self.is_known(device) {
            return Ok(());
        }
        if self.devices.len() >= self.capacity {
            return Err(RouterError::DeviceTableFull {
                device,
                capacity: self.capacity,
            });
        }
        debug!(%device, slot = self.devices.len(), "Registered device");
        self.devices.push(TrackedDevice::new(device));
        Ok(())
    }

    pub fn is_known(&self, device: DeviceId) -> bool {
        self.slot(device).is_some()
    }

    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.iter().map(|d| d.id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    /// Down awaiting its Up for this device
    pub fn pending_click(&self, device: DeviceId) -> Option<&ButtonEvent> {
        self.tracked(device).and_then(|d| d.pending.as_ref())
    }

    /// Last cached hit result for this device
    pub fn hit_result(&self, device: DeviceId) -> Option<&HitTestResult> {
        self.tracked(device).and_then(|d| d.hit.as_ref())
    }

    /// Node this device currently hovers
    pub fn hovered_node(&self, device: DeviceId) -> Option<NodeId> {
        self.tracked(device).and_then(|d| d.hovered)
    }

    /// Last hover transition emitted for this device
    pub fn last_hover(&self, device: DeviceId) -> Option<&HoverEvent> {
        self.tracked(device).and_then(|d| d.last_hover.as_ref())
    }

    /// Last status reported for this device
    pub fn status(&self, device: DeviceId) -> Option<&ControllerStatusEvent> {
        self.tracked(device).map(|d| &d.status)
    }

    fn slot(&self, device: DeviceId) -> Option<usize> {
        self.devices.iter().position(|d| d.id == device)
    }

    fn tracked(&self, device: DeviceId) -> Option<&TrackedDevice> {
        self.slot(device).map(|slot| &self.devices[slot])
    }

    /// Diffs this tick's snapshots against the previous tick
    ///
    /// Devices missing from `snapshots` count as disconnected. Snapshots for
    /// unknown devices are dropped.
    pub fn process(&mut self, scene: &Scene, snapshots: &[Snapshot]) -> TickEvents {
        let mut latest: Vec<Option<&Snapshot>> = vec![None; self.devices.len()];
        for snapshot in snapshots {
            match self.slot(snapshot.device) {
                Some(slot) => latest[slot] = Some(snapshot),
                None => debug!(device = %snapshot.device, "Dropping snapshot for unknown device"),
            }
        }

        let mut events = TickEvents::default();
        let tracker = Tracking {
            scene,
            hit_tester: self.hit_tester,
            bounds_only: self.bounds_only,
            move_epsilon: self.move_epsilon,
            hover_events: self.hover_events,
        };

        for (device, current) in self.devices.iter_mut().zip(latest) {
            tracker.process_device(device, current, &mut events);
        }

        trace!(events = events.len(), "Tracker tick complete");
        events
    }
}

/// Per-tick view shared by every device update
struct Tracking<'a> {
    scene: &'a Scene,
    hit_tester: HitTester,
    bounds_only: bool,
    move_epsilon: f32,
    hover_events: bool,
}

impl Tracking<'_> {
    fn process_device(
        &self,
        device: &mut TrackedDevice,
        current: Option<&Snapshot>,
        events: &mut TickEvents,
    ) {
        let connected = current.is_some_and(|s| s.is_connected);

        let status = match current {
            Some(snapshot) if connected => ControllerStatusEvent {
                device: device.id,
                is_connected: true,
                tracking: snapshot.tracking,
                battery_percent: snapshot.battery_percent,
            },
            _ => ControllerStatusEvent {
                device: device.id,
                is_connected: false,
                tracking: TrackingQuality::None,
                battery_percent: device.status.battery_percent,
            },
        };
        if status != device.status {
            if device.status.is_connected != status.is_connected {
                debug!(device = %device.id, connected = status.is_connected, "Device connection changed");
            }
            device.status = status;
            events.statuses.push(status);
        }

        let Some(current) = current.filter(|_| connected) else {
            if device.last_snapshot.is_connected {
                if let Some(off) = hover_off_on_disconnect(device) {
                    events.hovers.push(off);
                }
                device.reset();
            }
            return;
        };

        self.update_pose(device, current, events);
        self.update_buttons(device, current, events);
        self.update_thumbstick(device, current, events);
        self.update_triggers(device, current, events);

        device.last_snapshot = current.clone();
    }

    fn hit_test(&self, snapshot: &Snapshot) -> HitTestResult {
        self.hit_tester.hit_test(
            self.scene,
            snapshot.position,
            snapshot.forward(),
            self.bounds_only,
        )
    }

    fn update_pose(&self, device: &mut TrackedDevice, current: &Snapshot, events: &mut TickEvents) {
        // A fresh connection has no previous pose to compare against
        let reconnected = !device.last_snapshot.is_connected;
        if !reconnected && !current.pose_differs(&device.last_snapshot, self.move_epsilon) {
            return;
        }

        let hit = self.hit_test(current);
        device.hit = Some(hit);
        events.moves.push(MoveEvent {
            device: device.id,
            source: SourceId::DEVICE,
            position: current.position,
            orientation: current.orientation,
        });

        if self.hover_events {
            update_hover(device, hit, events);
        }
    }

    fn update_buttons(
        &self,
        device: &mut TrackedDevice,
        current: &Snapshot,
        events: &mut TickEvents,
    ) {
        let previous = &device.last_snapshot;
        let changed: Vec<(SourceId, bool)> = previous
            .buttons
            .keys()
            .chain(current.buttons.keys())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|source| {
                let pressed = current.is_pressed(source);
                (pressed != previous.is_pressed(source)).then_some((source, pressed))
            })
            .collect();

        if changed.is_empty() {
            return;
        }

        let hit = *device.hit.get_or_insert_with(|| self.hit_test(current));

        for (source, pressed) in changed {
            let event = ButtonEvent {
                device: device.id,
                source,
                state: if pressed { ClickState::Down } else { ClickState::Up },
                hit_position: hit.position,
                target: hit.node,
            };
            events.buttons.push(event);

            if pressed {
                if let Some(abandoned) = device.pending.replace(event) {
                    trace!(device = %device.id, node = %abandoned.target, "Abandoned pending click");
                }
                continue;
            }

            if let Some(pending) = device.pending
                && pending.device == event.device
                && pending.source == event.source
                && pending.target == event.target
            {
                device.pending = None;
                events.clicks.push(ButtonEvent {
                    state: ClickState::Clicked,
                    ..event
                });
            }
        }
    }

    fn update_thumbstick(
        &self,
        device: &mut TrackedDevice,
        current: &Snapshot,
        events: &mut TickEvents,
    ) {
        // A missing stick reads as centered and released
        let at_rest = |source| ThumbStick {
            source,
            axis: Vec2::ZERO,
            pressed: false,
        };
        let stick = match (device.last_snapshot.thumbstick, current.thumbstick) {
            (_, Some(stick)) => stick,
            (Some(previous), None) => at_rest(previous.source),
            (None, None) => return,
        };
        let previous = device
            .last_snapshot
            .thumbstick
            .unwrap_or_else(|| at_rest(stick.source));
        if previous == stick {
            return;
        }
        events.thumbsticks.push(ThumbStickEvent {
            device: device.id,
            source: stick.source,
            is_pressed: stick.pressed,
            axis: stick.axis,
        });
    }

    fn update_triggers(
        &self,
        device: &mut TrackedDevice,
        current: &Snapshot,
        events: &mut TickEvents,
    ) {
        let previous = &device.last_snapshot;
        let sources: BTreeSet<SourceId> = previous
            .triggers
            .keys()
            .chain(current.triggers.keys())
            .copied()
            .collect();

        for source in sources {
            let weight = current.trigger(source);
            if previous.trigger(source) != weight {
                events.triggers.push(TriggerEvent {
                    device: device.id,
                    source,
                    weight,
                });
            }
        }
    }
}

/// Emits hover transitions when the hovered node changes
///
/// The hover-off for the previous node goes out before the hover-on, so a
/// listener shared by both nodes ends the tick hovered.
fn update_hover(device: &mut TrackedDevice, hit: HitTestResult, events: &mut TickEvents) {
    if device.hovered == Some(hit.node) {
        return;
    }

    let entered = HoverEvent {
        device: device.id,
        source: SourceId::DEVICE,
        is_hovering: true,
        hit_position: hit.position,
        entered: hit.node,
        exited: device.hovered,
        is_background_hit: hit.is_background_hit,
    };

    if device.hovered.is_some() {
        events.hovers.push(HoverEvent {
            is_hovering: false,
            ..entered
        });
    }
    events.hovers.push(entered);

    device.hovered = Some(hit.node);
    device.last_hover = Some(entered);
}

/// Hover-off closing whatever the device hovered before it went away
fn hover_off_on_disconnect(device: &TrackedDevice) -> Option<HoverEvent> {
    let hovered = device.hovered?;
    let last = device.last_hover?;
    trace!(device = %device.id, node = %hovered, "Closing hover on disconnect");
    Some(HoverEvent {
        is_hovering: false,
        exited: Some(hovered),
        ..last
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;
    use glam::{Quat, Vec2, Vec3};

    const DEV: DeviceId = DeviceId(7);
    const SRC: SourceId = SourceId(1);

    struct Fixture {
        scene: Scene,
        left: NodeId,
        right: NodeId,
        tracker: StateTracker,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let left = scene.add_child(scene.root(), "left");
        let right = scene.add_child(scene.root(), "right");
        scene.set_shape(left, Shape::cuboid(Vec3::new(-2.0, 0.0, -4.0), Vec3::splat(0.5)));
        scene.set_shape(right, Shape::cuboid(Vec3::new(2.0, 0.0, -4.0), Vec3::splat(0.5)));

        let mut tracker = StateTracker::new(&RouterConfig::builtin("test"));
        tracker.register_device(DEV).unwrap();
        Fixture {
            scene,
            left,
            right,
            tracker,
        }
    }

    fn aim_left() -> Snapshot {
        Snapshot::connected(DEV).looking_at(Vec3::new(0.0, 0.0, 0.01), Vec3::new(-2.0, 0.0, -4.0))
    }

    fn aim_right() -> Snapshot {
        Snapshot::connected(DEV).looking_at(Vec3::new(0.0, 0.0, 0.01), Vec3::new(2.0, 0.0, -4.0))
    }

    #[test]
    fn test_first_connection_emits_status() {
        let mut f = fixture();
        let events = f.tracker.process(&f.scene, &[aim_left().with_battery(80)]);
        assert_eq!(events.statuses.len(), 1);
        assert!(events.statuses[0].is_connected);
        assert_eq!(events.statuses[0].battery_percent, 80);
    }

    #[test]
    fn test_move_runs_hit_test_and_hover() {
        let mut f = fixture();
        let events = f.tracker.process(&f.scene, &[aim_left()]);
        assert_eq!(events.moves.len(), 1);
        assert_eq!(f.tracker.hit_result(DEV).unwrap().node, f.left);
        assert_eq!(events.hovers.len(), 1);
        assert!(events.hovers[0].is_hovering);
        assert_eq!(events.hovers[0].entered, f.left);
        assert_eq!(events.hovers[0].exited, None);
    }

    #[test]
    fn test_still_device_emits_nothing() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let events = f.tracker.process(&f.scene, &[aim_left()]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_hover_switch_emits_on_and_off() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let events = f.tracker.process(&f.scene, &[aim_right()]);
        assert_eq!(events.hovers.len(), 2);
        let on = events.hovers.iter().find(|h| h.is_hovering).unwrap();
        let off = events.hovers.iter().find(|h| !h.is_hovering).unwrap();
        assert_eq!(on.target(), Some(f.right));
        assert_eq!(off.target(), Some(f.left));
        assert_eq!(f.tracker.hovered_node(DEV), Some(f.right));
    }

    #[test]
    fn test_matching_up_synthesizes_click() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let down = f.tracker.process(&f.scene, &[aim_left().with_button(SRC, true)]);
        assert_eq!(down.buttons.len(), 1);
        assert_eq!(down.buttons[0].state, ClickState::Down);
        assert!(f.tracker.pending_click(DEV).is_some());

        let up = f.tracker.process(&f.scene, &[aim_left().with_button(SRC, false)]);
        assert_eq!(up.buttons[0].state, ClickState::Up);
        assert_eq!(up.clicks.len(), 1);
        assert_eq!(up.clicks[0].target, f.left);
        assert!(f.tracker.pending_click(DEV).is_none());
    }

    #[test]
    fn test_mismatched_up_keeps_pending() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left().with_button(SRC, true)]);
        let up = f.tracker.process(&f.scene, &[aim_right().with_button(SRC, false)]);
        assert_eq!(up.buttons.len(), 1);
        assert!(up.clicks.is_empty());
        let pending = f.tracker.pending_click(DEV).unwrap();
        assert_eq!(pending.target, f.left);
    }

    #[test]
    fn test_first_tick_at_origin_counts_as_move() {
        let mut f = fixture();
        let identity = Snapshot::connected(DEV).with_button(SRC, true);
        let events = f.tracker.process(&f.scene, &[identity]);
        assert_eq!(events.moves.len(), 1);
        assert_eq!(events.buttons.len(), 1);
        assert_eq!(events.buttons[0].target, f.scene.root());
        assert!(f.tracker.hit_result(DEV).unwrap().is_background_hit);
        assert_eq!(f.tracker.hovered_node(DEV), Some(f.scene.root()));
    }

    #[test]
    fn test_resting_device_hovers_node_on_first_tick() {
        let mut f = fixture();
        let ahead = f.scene.add_child(f.scene.root(), "ahead");
        f.scene.set_shape(ahead, Shape::sphere(Vec3::new(0.0, 0.0, -3.0), 0.5));

        let events = f.tracker.process(&f.scene, &[Snapshot::connected(DEV)]);
        assert_eq!(events.hovers.len(), 1);
        assert!(events.hovers[0].is_hovering);
        assert_eq!(events.hovers[0].entered, ahead);

        // Reconnecting at the same pose hovers again
        f.tracker.process(&f.scene, &[]);
        let events = f.tracker.process(&f.scene, &[Snapshot::connected(DEV)]);
        assert_eq!(events.moves.len(), 1);
        assert_eq!(f.tracker.hovered_node(DEV), Some(ahead));
    }

    #[test]
    fn test_released_trigger_reports_zero() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left().with_trigger(SourceId(3), 0.5)]);
        let events = f.tracker.process(&f.scene, &[aim_left()]);
        assert_eq!(events.triggers.len(), 1);
        assert_eq!(events.triggers[0].source, SourceId(3));
        assert_eq!(events.triggers[0].weight, 0.0);

        let again = f.tracker.process(&f.scene, &[aim_left()]);
        assert!(again.triggers.is_empty());
    }

    #[test]
    fn test_vanished_thumbstick_reports_rest() {
        let mut f = fixture();
        f.tracker.process(
            &f.scene,
            &[aim_left().with_thumbstick(SourceId(5), Vec2::new(0.0, 1.0), true)],
        );
        let events = f.tracker.process(&f.scene, &[aim_left()]);
        assert_eq!(events.thumbsticks.len(), 1);
        let stick = events.thumbsticks[0];
        assert_eq!(stick.source, SourceId(5));
        assert_eq!(stick.axis, Vec2::ZERO);
        assert!(!stick.is_pressed);

        let again = f.tracker.process(&f.scene, &[aim_left()]);
        assert!(again.thumbsticks.is_empty());
    }

    #[test]
    fn test_centered_thumbstick_vanishing_is_silent() {
        let mut f = fixture();
        f.tracker.process(
            &f.scene,
            &[aim_left().with_thumbstick(SourceId(5), Vec2::ZERO, false)],
        );
        let events = f.tracker.process(&f.scene, &[aim_left()]);
        assert!(events.thumbsticks.is_empty());
    }

    #[test]
    fn test_hover_off_precedes_hover_on() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let events = f.tracker.process(&f.scene, &[aim_right()]);
        assert!(!events.hovers[0].is_hovering);
        assert_eq!(events.hovers[0].target(), Some(f.left));
        assert!(events.hovers[1].is_hovering);
        assert_eq!(events.hovers[1].target(), Some(f.right));
    }

    #[test]
    fn test_disconnect_closes_hover() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let events = f.tracker.process(&f.scene, &[]);
        assert_eq!(events.hovers.len(), 1);
        let off = events.hovers[0];
        assert!(!off.is_hovering);
        assert_eq!(off.target(), Some(f.left));
        assert!(events.moves.is_empty());

        let again = f.tracker.process(&f.scene, &[]);
        assert!(again.hovers.is_empty());
    }

    #[test]
    fn test_trigger_and_thumbstick_diffs() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left()]);
        let events = f.tracker.process(
            &f.scene,
            &[aim_left()
                .with_trigger(SourceId(3), 0.5)
                .with_thumbstick(SourceId(5), Vec2::new(0.2, 0.0), false)],
        );
        assert_eq!(events.triggers.len(), 1);
        assert_eq!(events.triggers[0].weight, 0.5);
        assert_eq!(events.thumbsticks.len(), 1);

        let same = f.tracker.process(
            &f.scene,
            &[aim_left()
                .with_trigger(SourceId(3), 0.5)
                .with_thumbstick(SourceId(5), Vec2::new(0.2, 0.0), false)],
        );
        assert!(same.triggers.is_empty());
        assert!(same.thumbsticks.is_empty());
    }

    #[test]
    fn test_disconnect_resets_state() {
        let mut f = fixture();
        f.tracker.process(&f.scene, &[aim_left().with_button(SRC, true)]);
        let events = f.tracker.process(&f.scene, &[]);
        assert_eq!(events.statuses.len(), 1);
        assert!(!events.statuses[0].is_connected);
        assert!(f.tracker.pending_click(DEV).is_none());
        assert!(f.tracker.hovered_node(DEV).is_none());

        let again = f.tracker.process(&f.scene, &[]);
        assert!(again.is_empty());
    }

    #[test]
    fn test_unknown_device_is_dropped() {
        let mut f = fixture();
        let stranger = Snapshot::connected(DeviceId(99)).with_button(SRC, true);
        let events = f.tracker.process(&f.scene, &[stranger]);
        // Only the known device's disconnected state is considered, and it never changed
        assert!(events.is_empty());
        assert!(!f.tracker.is_known(DeviceId(99)));
    }

    #[test]
    fn test_device_table_capacity() {
        let mut config = RouterConfig::builtin("test");
        config.tracking.max_devices = 1;
        let mut tracker = StateTracker::new(&config);
        tracker.register_device(DeviceId(1)).unwrap();
        tracker.register_device(DeviceId(1)).unwrap();
        assert!(matches!(
            tracker.register_device(DeviceId(2)),
            Err(RouterError::DeviceTableFull { capacity: 1, .. })
        ));
    }

    #[test]
    fn test_hover_disabled_by_config() {
        let mut config = RouterConfig::builtin("test");
        config.tracking.hover_events = false;
        let mut tracker = StateTracker::new(&config);
        tracker.register_device(DEV).unwrap();
        let f = fixture();
        let events = tracker.process(&f.scene, &[aim_left()]);
        assert_eq!(events.moves.len(), 1);
        assert!(events.hovers.is_empty());
    }

    #[test]
    fn test_orientation_change_counts_as_move() {
        let mut f = fixture();
        let base = Snapshot::connected(DEV).with_pose(Vec3::ONE, Quat::IDENTITY);
        f.tracker.process(&f.scene, &[base.clone()]);
        let turned = base.with_pose(Vec3::ONE, Quat::from_rotation_y(0.1));
        let events = f.tracker.process(&f.scene, &[turned]);
        assert_eq!(events.moves.len(), 1);
    }
}
