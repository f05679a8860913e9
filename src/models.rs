use std::fmt;

use serde::{Deserialize, Serialize};

use crate::risk::RiskTier;

/// One employee row as delivered by an analytics source.
///
/// Numeric fields are optional because sources may hand back partially
/// populated rows; the aggregation step decides what is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAnalyticsRecord {
    pub id: i64,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub weekly_work_hours: Option<f64>,
    #[serde(default)]
    pub overtime_hours: Option<f64>,
    #[serde(default)]
    pub tasks_completed: Option<i32>,
    #[serde(default)]
    pub meeting_hours: Option<f64>,
    #[serde(default)]
    pub leave_days_last_3_months: Option<i32>,
    #[serde(default)]
    pub performance_score: Option<f64>,
    #[serde(default)]
    pub burnout_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub employee_count: i64,
}

/// Which employees are in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DatasetScope {
    #[default]
    All,
    Dataset(i64),
}

impl DatasetScope {
    pub fn from_option(dataset_id: Option<i64>) -> Self {
        dataset_id.map_or(DatasetScope::All, DatasetScope::Dataset)
    }

    pub fn dataset_id(&self) -> Option<i64> {
        match self {
            DatasetScope::All => None,
            DatasetScope::Dataset(id) => Some(*id),
        }
    }
}

impl fmt::Display for DatasetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetScope::All => write!(f, "all datasets"),
            DatasetScope::Dataset(id) => write!(f, "dataset #{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    #[default]
    All,
    Only(RiskTier),
}

impl std::str::FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(RiskFilter::All),
            "high" => Ok(RiskFilter::Only(RiskTier::High)),
            "medium" => Ok(RiskFilter::Only(RiskTier::Medium)),
            "low" => Ok(RiskFilter::Only(RiskTier::Low)),
            other => Err(format!(
                "unknown risk tier '{other}', expected all, high, medium or low"
            )),
        }
    }
}

/// Active department / employee id / risk tier restriction.
///
/// `None` on a dimension means no restriction on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct FilterState {
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub risk: RiskFilter,
}

impl FilterState {
    /// Builds a filter from raw selector values, where `"all"` and `""` mean
    /// unrestricted. Department and id values are kept verbatim.
    pub fn from_inputs(department: &str, employee_id: &str, risk: RiskFilter) -> Self {
        Self {
            department: (department != "all" && !department.is_empty())
                .then(|| department.to_string()),
            employee_id: (!employee_id.is_empty()).then(|| employee_id.to_string()),
            risk,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.department.is_none() && self.employee_id.is_none() && self.risk == RiskFilter::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_inputs_mean_no_restriction() {
        let filter = FilterState::from_inputs("all", "", RiskFilter::All);
        assert!(filter.is_unrestricted());
        assert_eq!(filter, FilterState::default());
    }

    #[test]
    fn inputs_are_kept_verbatim() {
        let filter = FilterState::from_inputs("Eng", " 7", RiskFilter::Only(RiskTier::High));
        assert_eq!(filter.department.as_deref(), Some("Eng"));
        assert_eq!(filter.employee_id.as_deref(), Some(" 7"));
        assert!(!filter.is_unrestricted());
    }

    #[test]
    fn risk_filter_parses_known_tiers() {
        assert_eq!("all".parse::<RiskFilter>(), Ok(RiskFilter::All));
        assert_eq!("High".parse::<RiskFilter>(), Ok(RiskFilter::Only(RiskTier::High)));
        assert_eq!("low".parse::<RiskFilter>(), Ok(RiskFilter::Only(RiskTier::Low)));
        assert!("extreme".parse::<RiskFilter>().is_err());
    }

    #[test]
    fn scope_round_trips_dataset_id() {
        assert_eq!(DatasetScope::from_option(None), DatasetScope::All);
        assert_eq!(DatasetScope::from_option(Some(3)).dataset_id(), Some(3));
        assert_eq!(DatasetScope::Dataset(3).to_string(), "dataset #3");
    }
}
