//! Core health check trait and types

use std::time::Duration;

/// Status of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckStatus {
    /// Check passed successfully
    Pass,
    /// Check passed with warnings
    Warn,
    /// Check failed
    Fail,
}

impl CheckStatus {
    /// Returns true if the check passed (Pass or Warn)
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Pass | CheckStatus::Warn)
    }

    /// Returns true if the check failed
    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    /// The more severe of two statuses
    pub fn worst(self, other: CheckStatus) -> CheckStatus {
        self.max(other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        }
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => self.label().green().to_string(),
            CheckStatus::Warn => self.label().yellow().to_string(),
            CheckStatus::Fail => self.label().red().to_string(),
        }
    }
}

/// Result of a health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub status: CheckStatus,
    /// One-line summary
    pub message: String,
    /// Individual findings, one per line
    pub details: Vec<String>,
    pub duration: Duration,
}

impl CheckResult {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    /// Appends finding lines
    pub fn with_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(details);
        self
    }

    /// Sets the duration for this check
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Accumulates findings and the worst status seen while a check runs
#[derive(Debug, Default)]
pub struct Findings {
    status: Option<CheckStatus>,
    lines: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, status: CheckStatus, marker: &str, line: String) {
        self.status = Some(self.status().worst(status));
        self.lines.push(format!("  {marker} {line}"));
    }

    pub fn ok(&mut self, line: impl Into<String>) {
        self.push(CheckStatus::Pass, "✓", line.into());
    }

    pub fn warn(&mut self, line: impl Into<String>) {
        self.push(CheckStatus::Warn, "⚠", line.into());
    }

    pub fn fail(&mut self, line: impl Into<String>) {
        self.push(CheckStatus::Fail, "✗", line.into());
    }

    /// Worst status so far; Pass when nothing was recorded
    pub fn status(&self) -> CheckStatus {
        self.status.unwrap_or(CheckStatus::Pass)
    }

    /// Builds the result, picking the message that matches the worst status
    pub fn finish(self, pass: impl Into<String>, warn: impl Into<String>, fail: impl Into<String>) -> CheckResult {
        let result = match self.status() {
            CheckStatus::Pass => CheckResult::pass(pass),
            CheckStatus::Warn => CheckResult::warn(warn),
            CheckStatus::Fail => CheckResult::fail(fail),
        };
        result.with_details(self.lines)
    }
}

/// Trait for router health checks
pub trait HealthCheck {
    /// Name shown in the report
    fn name(&self) -> &str;

    /// Perform the health check
    fn check(&self) -> CheckResult;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_status_wins() {
        assert_eq!(CheckStatus::Pass.worst(CheckStatus::Warn), CheckStatus::Warn);
        assert_eq!(CheckStatus::Fail.worst(CheckStatus::Warn), CheckStatus::Fail);
    }

    #[test]
    fn test_findings_pick_message() {
        let mut findings = Findings::new();
        findings.ok("first");
        findings.warn("second");
        let result = findings.finish("fine", "careful", "broken");
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.message, "careful");
        assert_eq!(result.details.len(), 2);
    }

    #[test]
    fn test_empty_findings_pass() {
        let result = Findings::new().finish("fine", "careful", "broken");
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.details.is_empty());
    }
}
