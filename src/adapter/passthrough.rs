//! Adapter whose raw samples are already snapshots

use super::{DeviceAdapter, RawSample};
use crate::event::DeviceId;
use crate::input::Snapshot;

impl RawSample for Snapshot {
    fn device(&self) -> DeviceId {
        self.device
    }
}

/// Forwards snapshots unchanged; used by scripted replays and diagnostics
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    devices: Vec<DeviceId>,
}

impl SnapshotAdapter {
    pub fn new(devices: impl IntoIterator<Item = DeviceId>) -> Self {
        let mut unique = Vec::new();
        for device in devices {
            if !unique.contains(&device) {
                unique.push(device);
            }
        }
        Self { devices: unique }
    }
}

impl DeviceAdapter for SnapshotAdapter {
    type Sample = Snapshot;

    fn name(&self) -> &str {
        "snapshot"
    }

    fn known_devices(&self) -> &[DeviceId] {
        &self.devices
    }

    fn translate(&mut self, device: DeviceId, sample: Option<&Snapshot>) -> Snapshot {
        match sample {
            Some(snapshot) => Snapshot {
                device,
                ..snapshot.clone()
            },
            None => Snapshot::disconnected(device),
        }
    }
}
