//! Event actions and the per-listener enable map

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

/// Kinds of event batches a listener can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum EventAction {
    Click,
    Hover,
    Move,
    ThumbStick,
    Trigger,
    ControllerStatus,
    CameraTransformUpdate,
}

/// Action → enabled flags for one listener
///
/// Every action starts disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledActions {
    flags: EnumMap<EventAction, bool>,
}

impl EnabledActions {
    /// Creates a map with every action disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with the given actions enabled
    pub fn with(actions: &[EventAction]) -> Self {
        let mut map = Self::new();
        for action in actions {
            map.set(*action, true);
        }
        map
    }

    pub fn set(&mut self, action: EventAction, enabled: bool) {
        self.flags[action] = enabled;
    }

    pub fn is_enabled(&self, action: EventAction) -> bool {
        self.flags[action]
    }

    /// Enabled actions in declaration order
    pub fn enabled(&self) -> impl Iterator<Item = EventAction> + '_ {
        self.flags
            .iter()
            .filter_map(|(action, enabled)| enabled.then_some(action))
    }
}
