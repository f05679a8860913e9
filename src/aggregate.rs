use std::collections::HashMap;

use serde::Serialize;

use crate::error::RecordDefect;
use crate::models::EmployeeAnalyticsRecord;
use crate::risk::{self, RiskLevel, RiskTier};

/// Result of a derived view: either populated or an explicit empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum View<T> {
    Ready(T),
    Empty,
}

impl<T> View<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, View::Empty)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            View::Ready(value) => Some(value),
            View::Empty => None,
        }
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> View<U> {
        match self {
            View::Ready(value) => View::Ready(f(value)),
            View::Empty => View::Empty,
        }
    }
}

/// A record that passed screening, with its required numbers unwrapped.
#[derive(Debug, Clone, Copy)]
pub struct ScoredEmployee<'a> {
    pub record: &'a EmployeeAnalyticsRecord,
    pub score: f64,
    pub weekly_work_hours: f64,
    pub overtime_hours: f64,
    pub meeting_hours: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    /// Records with no burnout score yet.
    pub unscored: usize,
    /// Records missing a numeric field aggregation needs.
    pub malformed: usize,
}

impl Exclusions {
    pub fn total(&self) -> usize {
        self.unscored + self.malformed
    }
}

/// Splits filtered records into the set every aggregation runs over,
/// counting what was left out and why.
pub fn screen<'a>(
    records: &[&'a EmployeeAnalyticsRecord],
) -> (Vec<ScoredEmployee<'a>>, Exclusions) {
    let mut employees = Vec::with_capacity(records.len());
    let mut exclusions = Exclusions::default();

    for &record in records {
        match scored(record) {
            Ok(Some(employee)) => employees.push(employee),
            Ok(None) => exclusions.unscored += 1,
            Err(defect) => {
                tracing::debug!(employee_id = record.id, %defect, "excluding malformed record");
                exclusions.malformed += 1;
            }
        }
    }

    (employees, exclusions)
}

fn scored(record: &EmployeeAnalyticsRecord) -> Result<Option<ScoredEmployee<'_>>, RecordDefect> {
    let Some(score) = record.burnout_score else {
        return Ok(None);
    };
    if !score.is_finite() {
        return Err(RecordDefect::NonFinite("burnout_score"));
    }

    Ok(Some(ScoredEmployee {
        record,
        score: risk::bounded(score),
        weekly_work_hours: required(record.weekly_work_hours, "weekly_work_hours")?,
        overtime_hours: required(record.overtime_hours, "overtime_hours")?,
        meeting_hours: required(record.meeting_hours, "meeting_hours")?,
    }))
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64, RecordDefect> {
    match value {
        None => Err(RecordDefect::MissingField(field)),
        Some(v) if !v.is_finite() => Err(RecordDefect::NonFinite(field)),
        Some(v) => Ok(v),
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    values.sum::<f64>() / count as f64
}

// ----------------------------
// Summary
// ----------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighestRisk {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_burnout: i64,
    pub mean_level: RiskLevel,
    pub highest: HighestRisk,
    pub mean_weekly_hours: i64,
    pub mean_overtime: i64,
}

pub fn summarize(employees: &[ScoredEmployee<'_>]) -> View<Summary> {
    let Some(first) = employees.first() else {
        return View::Empty;
    };
    let count = employees.len();

    // Strict comparison keeps the first employee on ties.
    let highest = employees
        .iter()
        .fold(first, |best, e| if e.score > best.score { e } else { best });

    let mean_burnout = mean(employees.iter().map(|e| e.score), count).round() as i64;

    View::Ready(Summary {
        count,
        mean_burnout,
        mean_level: risk::classify(mean_burnout as f64),
        highest: HighestRisk {
            id: highest.record.id,
            name: highest.record.name.clone(),
            department: highest.record.department.clone(),
            score: highest.score,
        },
        mean_weekly_hours: mean(employees.iter().map(|e| e.weekly_work_hours), count).round()
            as i64,
        mean_overtime: mean(employees.iter().map(|e| e.overtime_hours), count).round() as i64,
    })
}

// ----------------------------
// Risk distribution
// ----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierShare {
    pub tier: RiskTier,
    pub count: usize,
    /// Unrounded percentage, for proportional widths.
    pub share: f64,
    /// Independently rounded percentage, for labels.
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub total: usize,
    pub high: TierShare,
    pub medium: TierShare,
    pub low: TierShare,
}

impl RiskDistribution {
    pub fn tiers(&self) -> [&TierShare; 3] {
        [&self.high, &self.medium, &self.low]
    }

    /// Sum of the rounded percentages; may differ from 100 by rounding.
    pub fn percent_sum(&self) -> u32 {
        self.tiers().iter().map(|t| t.percent).sum()
    }
}

pub fn risk_distribution(employees: &[ScoredEmployee<'_>]) -> View<RiskDistribution> {
    if employees.is_empty() {
        return View::Empty;
    }
    let total = employees.len();

    let share_of = |tier: RiskTier| {
        let count = employees
            .iter()
            .filter(|e| risk::tier_for(e.score) == tier)
            .count();
        let share = count as f64 / total as f64 * 100.0;
        TierShare {
            tier,
            count,
            share,
            percent: share.round() as u32,
        }
    };

    View::Ready(RiskDistribution {
        total,
        high: share_of(RiskTier::High),
        medium: share_of(RiskTier::Medium),
        low: share_of(RiskTier::Low),
    })
}

// ----------------------------
// Departments
// ----------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

/// Members per department in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentComposition {
    pub departments: Vec<DepartmentCount>,
}

impl DepartmentComposition {
    pub fn get(&self, department: &str) -> Option<usize> {
        self.departments
            .iter()
            .find(|d| d.department == department)
            .map(|d| d.count)
    }
}

pub fn department_composition(employees: &[ScoredEmployee<'_>]) -> View<DepartmentComposition> {
    if employees.is_empty() {
        return View::Empty;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut departments: Vec<DepartmentCount> = Vec::new();

    for employee in employees {
        let name = employee.record.department.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            departments.push(DepartmentCount {
                department: name.to_string(),
                count: 0,
            });
            departments.len() - 1
        });
        departments[slot].count += 1;
    }

    View::Ready(DepartmentComposition { departments })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentAverage {
    pub department: String,
    pub average_burnout: f64,
    pub members: usize,
}

/// Mean burnout per department, first-seen order, rounded to two decimals.
pub fn department_averages(employees: &[ScoredEmployee<'_>]) -> View<Vec<DepartmentAverage>> {
    if employees.is_empty() {
        return View::Empty;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64, usize)> = Vec::new();

    for employee in employees {
        let name = employee.record.department.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            totals.push((name, 0.0, 0));
            totals.len() - 1
        });
        totals[slot].1 += employee.score;
        totals[slot].2 += 1;
    }

    View::Ready(
        totals
            .into_iter()
            .map(|(department, total, members)| DepartmentAverage {
                department: department.to_string(),
                average_burnout: (total / members as f64 * 100.0).round() / 100.0,
                members,
            })
            .collect(),
    )
}

// ----------------------------
// Heatmap
// ----------------------------

/// The four heatmap columns. The last column shows burnout score even
/// though its legacy header reads "Performance".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMetric {
    WeeklyWorkHours,
    OvertimeHours,
    MeetingHours,
    BurnoutScore,
}

impl HeatmapMetric {
    pub const COLUMNS: [HeatmapMetric; 4] = [
        HeatmapMetric::WeeklyWorkHours,
        HeatmapMetric::OvertimeHours,
        HeatmapMetric::MeetingHours,
        HeatmapMetric::BurnoutScore,
    ];

    pub fn legacy_label(&self) -> &'static str {
        match self {
            HeatmapMetric::WeeklyWorkHours => "Weekly Hrs",
            HeatmapMetric::OvertimeHours => "Overtime",
            HeatmapMetric::MeetingHours => "Meetings",
            HeatmapMetric::BurnoutScore => "Performance",
        }
    }

    pub fn corrected_label(&self) -> &'static str {
        match self {
            HeatmapMetric::BurnoutScore => "Burnout",
            other => other.legacy_label(),
        }
    }

    fn value(&self, employee: &ScoredEmployee<'_>) -> f64 {
        match self {
            HeatmapMetric::WeeklyWorkHours => employee.weekly_work_hours,
            HeatmapMetric::OvertimeHours => employee.overtime_hours,
            HeatmapMetric::MeetingHours => employee.meeting_hours,
            HeatmapMetric::BurnoutScore => employee.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "tone", rename_all = "lowercase")]
pub enum CellTone {
    /// Consumer scales its own color ramp by `intensity`.
    Ramp,
    /// Fixed tier color from the risk classifier.
    Tier { tier: RiskTier, color: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub metric: HeatmapMetric,
    pub value: f64,
    pub intensity: f64,
    #[serde(flatten)]
    pub tone: CellTone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub id: i64,
    pub name: String,
    pub cells: [HeatmapCell; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRows {
    /// Per-column maxima, floored at 1.
    pub maxima: [f64; 4],
    pub rows: Vec<HeatmapRow>,
}

pub fn heatmap_rows(employees: &[ScoredEmployee<'_>]) -> View<HeatmapRows> {
    if employees.is_empty() {
        return View::Empty;
    }

    let maxima = HeatmapMetric::COLUMNS.map(|metric| {
        employees
            .iter()
            .map(|e| metric.value(e))
            .fold(1.0_f64, f64::max)
    });

    let rows = employees
        .iter()
        .map(|employee| {
            let cells = std::array::from_fn(|column| {
                let metric = HeatmapMetric::COLUMNS[column];
                let value = metric.value(employee);
                let intensity = (value / maxima[column]).clamp(0.0, 1.0);
                let tone = match metric {
                    HeatmapMetric::BurnoutScore => {
                        let level = risk::classify(value);
                        CellTone::Tier {
                            tier: level.tier,
                            color: level.color,
                        }
                    }
                    _ => CellTone::Ramp,
                };
                HeatmapCell {
                    metric,
                    value,
                    intensity,
                    tone,
                }
            });
            HeatmapRow {
                id: employee.record.id,
                name: employee.record.name.clone(),
                cells,
            }
        })
        .collect();

    View::Ready(HeatmapRows { maxima, rows })
}

// ----------------------------
// Ranking and alerts
// ----------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEmployee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub score: f64,
    pub level: RiskLevel,
}

/// Descending by score; equal scores keep their collection order.
pub fn rank(employees: &[ScoredEmployee<'_>]) -> View<Vec<RankedEmployee>> {
    if employees.is_empty() {
        return View::Empty;
    }

    let mut ranked: Vec<RankedEmployee> = employees
        .iter()
        .map(|e| RankedEmployee {
            id: e.record.id,
            name: e.record.name.clone(),
            department: e.record.department.clone(),
            score: e.score,
            level: risk::classify(e.score),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    View::Ready(ranked)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub score: f64,
    pub message: String,
}

/// Employees over the legacy alert threshold, in collection order.
pub fn alerts(employees: &[ScoredEmployee<'_>]) -> Vec<Alert> {
    employees
        .iter()
        .filter(|e| risk::is_alert(e.score))
        .map(|e| Alert {
            id: e.record.id,
            name: e.record.name.clone(),
            department: e.record.department.clone(),
            score: e.score,
            message: format!(
                "{} ({}) burnout risk HIGH",
                e.record.name, e.record.department
            ),
        })
        .collect()
}

// ----------------------------
// Overview
// ----------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEmployee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub level: Option<RiskLevel>,
}

/// Landing-page counters over the whole scope, ignoring filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Every record in scope, scored or not.
    pub total: usize,
    pub average_burnout: i64,
    pub high_risk: usize,
    pub low_risk: usize,
    pub recent: Vec<RecentEmployee>,
}

pub const RECENT_LIMIT: usize = 4;

pub fn overview(records: &[EmployeeAnalyticsRecord]) -> Overview {
    let scores: Vec<f64> = records
        .iter()
        .filter_map(|r| r.burnout_score)
        .filter(|s| s.is_finite())
        .map(risk::bounded)
        .collect();

    let average_burnout = if scores.is_empty() {
        0
    } else {
        mean(scores.iter().copied(), scores.len()).round() as i64
    };

    let recent = records
        .iter()
        .rev()
        .take(RECENT_LIMIT)
        .map(|r| RecentEmployee {
            id: r.id,
            name: r.name.clone(),
            department: r.department.clone(),
            level: r.burnout_score.map(risk::classify),
        })
        .collect();

    Overview {
        total: records.len(),
        average_burnout,
        high_risk: scores
            .iter()
            .filter(|s| risk::tier_for(**s) == RiskTier::High)
            .count(),
        low_risk: scores
            .iter()
            .filter(|s| risk::tier_for(**s) == RiskTier::Low)
            .count(),
        recent,
    }
}
