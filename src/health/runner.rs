//! Runner that executes health checks and collects their results

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::check::{CheckResult, CheckStatus, HealthCheck};

/// Results from running a health check suite
#[derive(Debug)]
pub struct HealthReport {
    /// Check results in the order they ran, keyed by check name
    pub results: Vec<(String, CheckResult)>,
    /// Wall time for the whole suite
    pub elapsed: Duration,
}

impl HealthReport {
    fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|(_, r)| r.status == status).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn warned(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    /// Worst status across all checks
    pub fn status(&self) -> CheckStatus {
        self.results
            .iter()
            .fold(CheckStatus::Pass, |acc, (_, r)| acc.worst(r.status))
    }

    /// Returns true if no check failed
    pub fn is_healthy(&self) -> bool {
        self.failed() == 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warned() > 0
    }

    /// Process exit code: 0 = all pass, 1 = any fail, 2 = any warn (but no fail)
    pub fn exit_code(&self) -> i32 {
        match self.status() {
            CheckStatus::Pass => 0,
            CheckStatus::Fail => 1,
            CheckStatus::Warn => 2,
        }
    }

    /// Result of the check with the given name
    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, result)| result)
    }
}

/// Builder that collects checks and runs them in order
#[derive(Default)]
pub struct HealthCheckRunner {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthCheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check<C: HealthCheck + 'static>(self, check: C) -> Self {
        self.add_boxed(Box::new(check))
    }

    pub fn add_boxed(mut self, check: Box<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every registered check and returns a report
    pub fn run(self) -> HealthReport {
        let suite_start = Instant::now();

        let results = self
            .checks
            .into_iter()
            .map(|check| {
                let start = Instant::now();
                let result = check.check().with_duration(start.elapsed());

                match result.status {
                    CheckStatus::Pass => debug!(check = check.name(), "{}", result.message),
                    CheckStatus::Warn | CheckStatus::Fail => warn!(
                        check = check.name(),
                        status = result.status.label(),
                        "{}",
                        result.message
                    ),
                }

                (check.name().to_string(), result)
            })
            .collect();

        HealthReport {
            results,
            elapsed: suite_start.elapsed(),
        }
    }
}
