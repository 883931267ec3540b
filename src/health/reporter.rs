//! Table formatting for health reports

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::CheckStatus;
use super::runner::HealthReport;

/// Formats a health report as a table followed by a summary
pub fn format_report(report: &HealthReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Check", "Status", "Duration", "Message"]);

    for (name, result) in &report.results {
        builder.push_record([
            name.clone(),
            result.status.as_colored_str(),
            format!("{:.2?}", result.duration),
            result.message.clone(),
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    format!("{table}\n{}", format_summary(report))
}

fn format_summary(report: &HealthReport) -> String {
    let mut lines = vec![
        String::new(),
        "Summary".bold().underline().to_string(),
        format!("  Checks: {} in {:.2?}", report.total(), report.elapsed),
        format!("  {} Passed: {}", "✓".green(), report.passed()),
    ];
    if report.warned() > 0 {
        lines.push(format!("  {} Warned: {}", "⚠".yellow(), report.warned()));
    }
    if report.failed() > 0 {
        lines.push(format!("  {} Failed: {}", "✗".red(), report.failed()));
    }

    let overall = match report.status() {
        CheckStatus::Pass => "Overall: HEALTHY".green().bold(),
        CheckStatus::Warn => "Overall: HEALTHY (with warnings)".yellow().bold(),
        CheckStatus::Fail => "Overall: UNHEALTHY".red().bold(),
    };
    lines.push(String::new());
    lines.push(format!("  {overall}"));
    lines.push(String::new());
    lines.join("\n")
}

/// Prints the table, then the findings of every check that has any
pub fn print_report(report: &HealthReport) {
    println!("{}", format_report(report));

    for (name, result) in &report.results {
        if result.details.is_empty() {
            continue;
        }
        println!("\n{} Details:", name.bold());
        for line in &result.details {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::check::{CheckResult, HealthCheck};
    use crate::health::runner::HealthCheckRunner;

    struct Named;

    impl HealthCheck for Named {
        fn name(&self) -> &str {
            "Named"
        }

        fn check(&self) -> CheckResult {
            CheckResult::pass("everything in place")
        }
    }

    #[test]
    fn test_report_contains_rows_and_summary() {
        colored::control::set_override(false);
        let report = HealthCheckRunner::new().add_check(Named).run();
        let text = format_report(&report);
        assert!(text.contains("Named"));
        assert!(text.contains("everything in place"));
        assert!(text.contains("Overall: HEALTHY"));
    }
}
