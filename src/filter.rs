use crate::models::{EmployeeAnalyticsRecord, FilterState, RiskFilter};
use crate::risk;

/// Narrows `records` to those matching every active predicate, preserving
/// input order. Records without a score only survive an unrestricted tier.
pub fn apply<'a>(
    records: &'a [EmployeeAnalyticsRecord],
    filter: &FilterState,
) -> Vec<&'a EmployeeAnalyticsRecord> {
    records
        .iter()
        .filter(|record| matches(record, filter))
        .collect()
}

pub fn matches(record: &EmployeeAnalyticsRecord, filter: &FilterState) -> bool {
    if let Some(department) = filter.department.as_deref() {
        if record.department != department {
            return false;
        }
    }

    if let Some(employee_id) = filter.employee_id.as_deref() {
        if record.id.to_string() != employee_id {
            return false;
        }
    }

    match filter.risk {
        RiskFilter::All => true,
        RiskFilter::Only(tier) => record
            .burnout_score
            .is_some_and(|score| risk::tier_for(score) == tier),
    }
}

/// Sorted, de-duplicated department names, as offered by a department selector.
pub fn department_options(records: &[EmployeeAnalyticsRecord]) -> Vec<String> {
    let mut departments: Vec<String> = records.iter().map(|r| r.department.clone()).collect();
    departments.sort();
    departments.dedup();
    departments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskTier;

    fn record(id: i64, department: &str, score: Option<f64>) -> EmployeeAnalyticsRecord {
        EmployeeAnalyticsRecord {
            id,
            name: format!("Employee {id}"),
            department: department.to_string(),
            weekly_work_hours: Some(40.0),
            overtime_hours: Some(4.0),
            tasks_completed: Some(10),
            meeting_hours: Some(6.0),
            leave_days_last_3_months: Some(2),
            performance_score: Some(3.5),
            burnout_score: score,
        }
    }

    fn ids(records: &[&EmployeeAnalyticsRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn unrestricted_filter_keeps_everything_in_order() {
        let records = vec![
            record(3, "Eng", Some(80.0)),
            record(1, "Sales", None),
            record(2, "Eng", Some(10.0)),
        ];
        let filtered = apply(&records, &FilterState::default());
        assert_eq!(ids(&filtered), vec![3, 1, 2]);
    }

    #[test]
    fn department_match_is_exact_and_case_sensitive() {
        let records = vec![record(1, "Eng", Some(50.0)), record(2, "eng", Some(50.0))];
        let filter = FilterState::from_inputs("Eng", "", RiskFilter::All);
        assert_eq!(ids(&apply(&records, &filter)), vec![1]);

        let missing = FilterState::from_inputs("Marketing", "", RiskFilter::All);
        assert!(apply(&records, &missing).is_empty());
    }

    #[test]
    fn employee_id_matches_stringified_id() {
        let records = vec![record(12, "Eng", Some(50.0)), record(1, "Eng", Some(50.0))];
        let filter = FilterState::from_inputs("all", "1", RiskFilter::All);
        assert_eq!(ids(&apply(&records, &filter)), vec![1]);

        let padded = FilterState::from_inputs("all", "01", RiskFilter::All);
        assert!(apply(&records, &padded).is_empty());
    }

    #[test]
    fn tier_filter_drops_unscored_records() {
        let records = vec![
            record(1, "Eng", Some(80.0)),
            record(2, "Eng", None),
            record(3, "Eng", Some(30.0)),
        ];
        let low = FilterState::from_inputs("all", "", RiskFilter::Only(RiskTier::Low));
        assert_eq!(ids(&apply(&records, &low)), vec![3]);

        let all = FilterState::from_inputs("all", "", RiskFilter::All);
        assert_eq!(ids(&apply(&records, &all)), vec![1, 2, 3]);
    }

    #[test]
    fn predicates_are_anded() {
        let records = vec![
            record(1, "Eng", Some(80.0)),
            record(2, "Sales", Some(85.0)),
            record(3, "Eng", Some(45.0)),
        ];
        let filter = FilterState::from_inputs("Eng", "", RiskFilter::Only(RiskTier::High));
        assert_eq!(ids(&apply(&records, &filter)), vec![1]);
    }

    #[test]
    fn department_options_are_sorted_and_unique() {
        let records = vec![
            record(1, "Sales", None),
            record(2, "Eng", None),
            record(3, "Sales", None),
        ];
        assert_eq!(department_options(&records), vec!["Eng", "Sales"]);
    }
}
