//! Health checks for validating router setup
//!
//! This module provides a framework for self-diagnostics, useful for:
//! - Validating configuration profiles before shipping them
//! - CI health checks
//! - Debugging scenes that never receive events
//!
//! # Example
//!
//! ```no_run
//! use scene_input::adapter::TouchAdapter;
//! use scene_input::health::{HealthCheckRunner, checks::*};
//!
//! let report = HealthCheckRunner::new()
//!     .add_check(ConfigCheck::new())
//!     .add_check(AdapterCheck::new(&TouchAdapter::new(), 8))
//!     .add_check(PipelineCheck::new())
//!     .run();
//!
//! if report.is_healthy() {
//!     println!("Router ready");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus, Findings, HealthCheck};
pub use reporter::{format_report, print_report};
pub use runner::{HealthCheckRunner, HealthReport};

use crate::adapter::TouchAdapter;
use crate::config::TrackingConfig;

/// Runs the checks that need no caller state and returns a report
pub fn run_all_checks() -> HealthReport {
    HealthCheckRunner::new()
        .add_check(checks::ConfigCheck::new())
        .add_check(checks::AdapterCheck::new(
            &TouchAdapter::new(),
            TrackingConfig::default().max_devices,
        ))
        .add_check(checks::PipelineCheck::new())
        .run()
}
