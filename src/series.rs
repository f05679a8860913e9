use serde::Serialize;

use crate::aggregate::{
    DepartmentComposition, HeatmapMetric, HeatmapRow, HeatmapRows, RankedEmployee, View,
};
use crate::config::HeatmapLabel;

/// Slice colors for the department chart, cycled when departments outnumber them.
pub const CHART_COLORS: [&str; 7] = [
    "#4f8cff", "#2dd4a8", "#f0a030", "#f06070", "#9080f0", "#20c8e8", "#f472b6",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<&'static str>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub colors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub headers: [&'static str; 4],
    pub rows: Vec<HeatmapRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub id: i64,
    pub name: String,
    pub department: String,
    pub score: f64,
    pub bar_fill_percent: f64,
    pub color: &'static str,
}

/// The highest `n` employees from an already sorted ranking. Only a missing
/// ranking yields `Empty`; `n == 0` gives a ready series with no bars.
pub fn top_n_bar_series(ranking: &View<Vec<RankedEmployee>>, n: usize) -> View<BarSeries> {
    ranking.map(|ranked| {
        let top = &ranked[..n.min(ranked.len())];
        BarSeries {
            labels: top.iter().map(|e| e.name.clone()).collect(),
            values: top.iter().map(|e| e.score).collect(),
            colors: top.iter().map(|e| e.level.color).collect(),
        }
    })
}

pub fn distribution_pie_series(composition: &View<DepartmentComposition>) -> View<PieSeries> {
    composition.map(|composition| PieSeries {
        labels: composition
            .departments
            .iter()
            .map(|d| d.department.clone())
            .collect(),
        values: composition.departments.iter().map(|d| d.count).collect(),
        colors: (0..composition.departments.len())
            .map(|i| CHART_COLORS[i % CHART_COLORS.len()])
            .collect(),
    })
}

pub fn heatmap_grid(heatmap: &View<HeatmapRows>, label: HeatmapLabel) -> View<HeatmapGrid> {
    let headers = HeatmapMetric::COLUMNS.map(|metric| match label {
        HeatmapLabel::Legacy => metric.legacy_label(),
        HeatmapLabel::Corrected => metric.corrected_label(),
    });
    heatmap.map(|heatmap| HeatmapGrid {
        headers,
        rows: heatmap.rows.clone(),
    })
}

/// Full ranking with 1-based ranks. Scores already sit in 0..=100, so the
/// bar fill is the score itself.
pub fn ranking_list(ranking: &View<Vec<RankedEmployee>>) -> View<Vec<RankingEntry>> {
    ranking.map(|ranked| {
        ranked
            .iter()
            .enumerate()
            .map(|(i, e)| RankingEntry {
                rank: i + 1,
                id: e.id,
                name: e.name.clone(),
                department: e.department.clone(),
                score: e.score,
                bar_fill_percent: e.score,
                color: e.level.color,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::employee;
    use crate::aggregate::{department_composition, heatmap_rows, rank, screen};
    use crate::models::EmployeeAnalyticsRecord;
    use pretty_assertions::assert_eq;

    fn ranked(records: &[EmployeeAnalyticsRecord]) -> View<Vec<RankedEmployee>> {
        let refs: Vec<&EmployeeAnalyticsRecord> = records.iter().collect();
        rank(&screen(&refs).0)
    }

    #[test]
    fn bar_series_keeps_top_n_in_rank_order() {
        let records: Vec<EmployeeAnalyticsRecord> =
            (1..=20).map(|id| employee(id, "Eng", id as f64 * 5.0)).collect();
        let series = top_n_bar_series(&ranked(&records), 15);
        let series = series.ready().expect("series");

        assert_eq!(series.len(), 15);
        assert_eq!(series.values[0], 100.0);
        assert_eq!(series.values[14], 30.0);
        assert_eq!(series.labels[0], "Employee 20");
        assert_eq!(series.colors[0], "#f06070");
        assert_eq!(series.colors[14], "#2dd4a8");
    }

    #[test]
    fn bar_series_shorter_than_n_is_whole_ranking() {
        let records = vec![employee(1, "Sales", 30.0)];
        let series = top_n_bar_series(&ranked(&records), 15);
        assert_eq!(series.ready().map(BarSeries::len), Some(1));
    }

    #[test]
    fn zero_top_n_is_ready_but_has_no_bars() {
        let records = vec![employee(1, "Sales", 30.0)];
        let series = top_n_bar_series(&ranked(&records), 0);
        assert_eq!(series.ready().map(BarSeries::is_empty), Some(true));
    }

    #[test]
    fn empty_ranking_gives_empty_series() {
        assert!(top_n_bar_series(&View::Empty, 15).is_empty());
        assert!(ranking_list(&View::Empty).is_empty());
        assert!(distribution_pie_series(&View::Empty).is_empty());
        assert!(heatmap_grid(&View::Empty, HeatmapLabel::Legacy).is_empty());
    }

    #[test]
    fn pie_series_follows_composition_order() {
        let records: Vec<EmployeeAnalyticsRecord> = ["Ops", "Eng", "Ops", "A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, dept)| employee(i as i64, dept, 10.0))
            .collect();
        let refs: Vec<&EmployeeAnalyticsRecord> = records.iter().collect();
        let pie = distribution_pie_series(&department_composition(&screen(&refs).0));
        let pie = pie.ready().expect("pie");

        assert_eq!(pie.labels, vec!["Ops", "Eng", "A", "B", "C", "D", "E"]);
        assert_eq!(pie.values, vec![2, 1, 1, 1, 1, 1, 1]);
        assert_eq!(pie.colors[6], "#f472b6");
    }

    #[test]
    fn pie_colors_cycle_past_palette() {
        let records: Vec<EmployeeAnalyticsRecord> = (0..9)
            .map(|i| employee(i, &format!("Dept {i}"), 10.0))
            .collect();
        let refs: Vec<&EmployeeAnalyticsRecord> = records.iter().collect();
        let pie = distribution_pie_series(&department_composition(&screen(&refs).0));
        let colors = &pie.ready().expect("pie").colors;
        assert_eq!(colors[7], CHART_COLORS[0]);
        assert_eq!(colors[8], CHART_COLORS[1]);
    }

    #[test]
    fn heatmap_headers_keep_legacy_label_unless_corrected() {
        let records = vec![employee(1, "Eng", 75.0)];
        let refs: Vec<&EmployeeAnalyticsRecord> = records.iter().collect();
        let rows = heatmap_rows(&screen(&refs).0);

        let legacy = heatmap_grid(&rows, HeatmapLabel::Legacy);
        assert_eq!(
            legacy.ready().map(|g| g.headers),
            Some(["Weekly Hrs", "Overtime", "Meetings", "Performance"])
        );

        let corrected = heatmap_grid(&rows, HeatmapLabel::Corrected);
        let corrected = corrected.ready().expect("grid");
        assert_eq!(corrected.headers[3], "Burnout");
        assert_eq!(corrected.rows[0].cells[3].value, 75.0);
    }

    #[test]
    fn ranking_list_is_one_based_with_score_fill() {
        let records = vec![employee(1, "Eng", 42.5), employee(2, "Eng", 88.0)];
        let list = ranking_list(&ranked(&records));
        let list = list.ready().expect("list");

        assert_eq!(list[0].rank, 1);
        assert_eq!(list[0].id, 2);
        assert_eq!(list[0].bar_fill_percent, 88.0);
        assert_eq!(list[1].rank, 2);
        assert_eq!(list[1].bar_fill_percent, 42.5);
        assert_eq!(list[1].color, "#f0a030");
    }
}
