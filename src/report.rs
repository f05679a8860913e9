use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::aggregate::View;
use crate::dashboard::AnalyticsSnapshot;
use crate::models::RiskFilter;

pub fn describe_filter(snapshot: &AnalyticsSnapshot) -> String {
    let filter = snapshot.filter();
    if filter.is_unrestricted() {
        return "no filters".to_string();
    }

    let mut parts = Vec::new();
    if let Some(department) = filter.department.as_deref() {
        parts.push(format!("department {department}"));
    }
    if let Some(employee_id) = filter.employee_id.as_deref() {
        parts.push(format!("employee #{employee_id}"));
    }
    if let RiskFilter::Only(tier) = filter.risk {
        parts.push(format!("{} risk", tier.as_str()));
    }
    parts.join(", ")
}

pub fn build_report(
    scope_label: &str,
    generated_at: DateTime<Utc>,
    snapshot: &AnalyticsSnapshot,
    ranking_limit: usize,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Burnout Risk Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}) at {}",
        scope_label,
        describe_filter(snapshot),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    if let Some(error) = snapshot.source_error() {
        let _ = writeln!(output);
        let _ = writeln!(output, "> Employee data could not be loaded: {error}");
    }

    let exclusions = snapshot.exclusions();
    if exclusions.total() > 0 {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "> {} employees not yet scored, {} with incomplete workload data were left out.",
            exclusions.unscored, exclusions.malformed
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    match snapshot.summary() {
        View::Ready(summary) => {
            let _ = writeln!(output, "- Showing: {}", summary.count);
            let _ = writeln!(
                output,
                "- Avg burnout: {}% ({})",
                summary.mean_burnout, summary.mean_level.label
            );
            let _ = writeln!(
                output,
                "- Highest risk: {} ({}%)",
                summary.highest.name, summary.highest.score
            );
            let _ = writeln!(
                output,
                "- Avg work / overtime: {}h / {}h",
                summary.mean_weekly_hours, summary.mean_overtime
            );
        }
        View::Empty => {
            let _ = writeln!(output, "No employees match the current filters.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Distribution");
    match snapshot.risk_distribution() {
        View::Ready(distribution) => {
            for share in distribution.tiers() {
                let _ = writeln!(
                    output,
                    "- {}: {} ({}%)",
                    share.tier.label(),
                    share.count,
                    share.percent
                );
            }
        }
        View::Empty => {
            let _ = writeln!(output, "No data to display.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Departments");
    match (snapshot.department_composition(), snapshot.department_averages()) {
        (View::Ready(composition), View::Ready(averages)) => {
            for (count, average) in composition.departments.iter().zip(averages) {
                let _ = writeln!(
                    output,
                    "- {}: {} employees (avg burnout {:.2})",
                    count.department, count.count, average.average_burnout
                );
            }
        }
        _ => {
            let _ = writeln!(output, "No data to display.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Employees");
    match snapshot.ranking() {
        View::Ready(ranking) => {
            for entry in ranking.iter().take(ranking_limit) {
                let _ = writeln!(
                    output,
                    "{}. {} ({} · #{}) {}%",
                    entry.rank, entry.name, entry.department, entry.id, entry.score
                );
            }
        }
        View::Empty => {
            let _ = writeln!(output, "No data to display.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Alerts");
    if snapshot.alerts().is_empty() {
        let _ = writeln!(output, "No employees above the alert threshold.");
    } else {
        for alert in snapshot.alerts() {
            let _ = writeln!(output, "- {}", alert.message);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::employee;
    use crate::config::DashboardConfig;
    use crate::models::{DatasetScope, FilterState};
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn report_lists_every_section() {
        let records = vec![
            employee(1, "Eng", 80.0),
            employee(2, "Eng", 50.0),
            employee(3, "Sales", 30.0),
        ];
        let snapshot = AnalyticsSnapshot::compute(
            DatasetScope::All,
            &records,
            &FilterState::default(),
            &DashboardConfig::default(),
        );
        let report = build_report("all datasets", generated_at(), &snapshot, 10);

        assert!(report.contains("Generated for all datasets (no filters) at 2026-03-02 09:30 UTC"));
        assert!(report.contains("- Showing: 3"));
        assert!(report.contains("- Avg burnout: 53% (Medium)"));
        assert!(report.contains("- High: 1 (33%)"));
        assert!(report.contains("- Eng: 2 employees (avg burnout 65.00)"));
        assert!(report.contains("1. Employee 1 (Eng · #1) 80%"));
        assert!(report.contains("- Employee 1 (Eng) burnout risk HIGH"));
    }

    #[test]
    fn empty_views_render_empty_states() {
        let filter = FilterState::from_inputs("Marketing", "", RiskFilter::All);
        let records = vec![employee(1, "Eng", 80.0)];
        let snapshot = AnalyticsSnapshot::compute(
            DatasetScope::Dataset(4),
            &records,
            &filter,
            &DashboardConfig::default(),
        );
        let report = build_report("dataset #4", generated_at(), &snapshot, 10);

        assert!(report.contains("(department Marketing)"));
        assert!(report.contains("No employees match the current filters."));
        assert!(report.contains("No employees above the alert threshold."));
        assert!(!report.contains("## Summary\n-"));
    }
}
