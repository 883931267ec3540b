//! Device adapter roster health check

use crate::adapter::DeviceAdapter;
use crate::event::DeviceId;
use crate::health::check::{CheckResult, Findings, HealthCheck};

/// Checks that an adapter's devices fit the tracker's device table
pub struct AdapterCheck {
    adapter: String,
    devices: Vec<DeviceId>,
    capacity: usize,
}

impl AdapterCheck {
    pub fn new<A: DeviceAdapter>(adapter: &A, capacity: usize) -> Self {
        Self {
            adapter: adapter.name().to_string(),
            devices: adapter.known_devices().to_vec(),
            capacity,
        }
    }
}

impl HealthCheck for AdapterCheck {
    fn name(&self) -> &str {
        "Device adapter"
    }

    fn description(&self) -> Option<&str> {
        Some("Validates the adapter's device roster against the device table")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Findings::new();
        let adapter = &self.adapter;

        if self.devices.is_empty() {
            findings.warn(format!("Adapter '{adapter}' drives no devices"));
        } else {
            let ids: Vec<String> = self.devices.iter().map(ToString::to_string).collect();
            findings.ok(format!("Adapter '{adapter}': {}", ids.join(", ")));
        }

        let mut unique = self.devices.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != self.devices.len() {
            findings.fail("Device ids repeat in the roster");
        }

        if self.devices.len() > self.capacity {
            findings.fail(format!(
                "{} devices exceed the {} slot device table",
                self.devices.len(),
                self.capacity
            ));
        } else {
            findings.ok(format!(
                "{} of {} device slots used",
                self.devices.len(),
                self.capacity
            ));
        }

        findings.finish(
            format!("{} devices", self.devices.len()),
            "Adapter has no devices",
            "Adapter roster does not fit",
        )
    }
}
