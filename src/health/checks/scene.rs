//! Scene integrity health check

use crate::health::check::{CheckResult, Findings, HealthCheck};
use crate::scene::{NodeId, Scene};

/// Checks that a scene can route events: every node reachable, something to hit
pub struct SceneCheck {
    nodes: usize,
    listeners: usize,
    shapes: usize,
    orphans: Vec<NodeId>,
}

impl SceneCheck {
    /// Captures the scene's structure; the scene itself is not retained
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            nodes: scene.len(),
            listeners: scene.listener_count(),
            shapes: scene.shape_count(),
            orphans: scene.orphans(),
        }
    }
}

impl HealthCheck for SceneCheck {
    fn name(&self) -> &str {
        "Scene"
    }

    fn description(&self) -> Option<&str> {
        Some("Validates scene graph reachability and hit-testable content")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Findings::new();
        findings.ok(format!("{} nodes", self.nodes));

        if self.orphans.is_empty() {
            findings.ok("All nodes reachable from the root");
        } else {
            let names: Vec<String> = self.orphans.iter().map(ToString::to_string).collect();
            findings.fail(format!("Unreachable nodes: {}", names.join(", ")));
        }

        if self.shapes == 0 {
            findings.warn("No shapes; every ray falls through to the background");
        } else {
            findings.ok(format!("{} hit-testable nodes", self.shapes));
        }

        if self.listeners == 0 {
            findings.warn("No node listeners; only global listeners receive events");
        } else {
            findings.ok(format!("{} node listeners", self.listeners));
        }

        findings.finish(
            "Scene ready for routing",
            "Scene routes with limitations",
            "Scene graph is inconsistent",
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::health::CheckStatus;
    use crate::scene::Shape;

    #[test]
    fn test_empty_scene_warns() {
        let result = SceneCheck::from_scene(&Scene::new()).check();
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn test_shaped_scene_without_listeners_warns() {
        let mut scene = Scene::new();
        let node = scene.add_child(scene.root(), "box");
        scene.set_shape(node, Shape::cuboid(Vec3::NEG_Z, Vec3::ONE));
        let result = SceneCheck::from_scene(&scene).check();
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.details.iter().any(|d| d.contains("1 hit-testable")));
    }
}
