use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{
    self, Alert, DepartmentAverage, DepartmentComposition, Exclusions, Overview, RiskDistribution,
    Summary, View,
};
use crate::config::DashboardConfig;
use crate::error::SourceError;
use crate::filter;
use crate::models::{DatasetScope, EmployeeAnalyticsRecord, FilterState};
use crate::series::{self, BarSeries, HeatmapGrid, PieSeries, RankingEntry};
use crate::source::AnalyticsSource;

/// Every derived view for one (scope, filter) pair, computed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    scope: DatasetScope,
    filter: FilterState,
    source_error: Option<String>,
    exclusions: Exclusions,
    department_options: Vec<String>,
    overview: Overview,
    summary: View<Summary>,
    risk_distribution: View<RiskDistribution>,
    department_composition: View<DepartmentComposition>,
    department_averages: View<Vec<DepartmentAverage>>,
    heatmap: View<HeatmapGrid>,
    ranking: View<Vec<RankingEntry>>,
    top_n: View<BarSeries>,
    pie: View<PieSeries>,
    alerts: Vec<Alert>,
}

impl AnalyticsSnapshot {
    pub fn compute(
        scope: DatasetScope,
        records: &[EmployeeAnalyticsRecord],
        filter: &FilterState,
        config: &DashboardConfig,
    ) -> Self {
        let filtered = filter::apply(records, filter);
        let (employees, exclusions) = aggregate::screen(&filtered);
        if exclusions.malformed > 0 {
            warn!(
                %scope,
                excluded = exclusions.malformed,
                "records with missing numeric fields left out of analytics"
            );
        }

        let ranked = aggregate::rank(&employees);
        let composition = aggregate::department_composition(&employees);
        let heatmap = aggregate::heatmap_rows(&employees);

        Self {
            scope,
            filter: filter.clone(),
            source_error: None,
            exclusions,
            department_options: filter::department_options(records),
            overview: aggregate::overview(records),
            summary: aggregate::summarize(&employees),
            risk_distribution: aggregate::risk_distribution(&employees),
            department_averages: aggregate::department_averages(&employees),
            heatmap: series::heatmap_grid(&heatmap, config.heatmap_label),
            ranking: series::ranking_list(&ranked),
            top_n: series::top_n_bar_series(&ranked, config.top_n),
            pie: series::distribution_pie_series(&composition),
            department_composition: composition,
            alerts: aggregate::alerts(&employees),
        }
    }

    /// Snapshot shown when the record fetch failed: every view empty.
    pub fn unavailable(
        scope: DatasetScope,
        filter: &FilterState,
        config: &DashboardConfig,
        error: &SourceError,
    ) -> Self {
        Self {
            source_error: Some(error.to_string()),
            ..Self::compute(scope, &[], filter, config)
        }
    }

    pub fn scope(&self) -> DatasetScope {
        self.scope
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn source_error(&self) -> Option<&str> {
        self.source_error.as_deref()
    }

    pub fn exclusions(&self) -> Exclusions {
        self.exclusions
    }

    pub fn department_options(&self) -> &[String] {
        &self.department_options
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn summary(&self) -> &View<Summary> {
        &self.summary
    }

    pub fn risk_distribution(&self) -> &View<RiskDistribution> {
        &self.risk_distribution
    }

    pub fn department_composition(&self) -> &View<DepartmentComposition> {
        &self.department_composition
    }

    pub fn department_averages(&self) -> &View<Vec<DepartmentAverage>> {
        &self.department_averages
    }

    pub fn heatmap_grid(&self) -> &View<HeatmapGrid> {
        &self.heatmap
    }

    pub fn ranking(&self) -> &View<Vec<RankingEntry>> {
        &self.ranking
    }

    pub fn top_n_bar_series(&self) -> &View<BarSeries> {
        &self.top_n
    }

    pub fn pie_series(&self) -> &View<PieSeries> {
        &self.pie
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}

/// Identifies one record fetch; results only land while it is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    scope: DatasetScope,
}

impl FetchTicket {
    pub fn scope(&self) -> DatasetScope {
        self.scope
    }
}

/// Selection state plus the views derived from the last accepted fetch.
///
/// The edge that owns a `Dashboard` is its only writer. A scope change or a
/// new fetch supersedes older tickets; filter changes are applied to the held
/// records without a fetch.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    scope: DatasetScope,
    filter: FilterState,
    epoch: u64,
    records: Vec<EmployeeAnalyticsRecord>,
    snapshot: AnalyticsSnapshot,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let scope = DatasetScope::All;
        let filter = FilterState::default();
        Self {
            snapshot: AnalyticsSnapshot::compute(scope, &[], &filter, &config),
            config,
            scope,
            filter,
            epoch: 0,
            records: Vec::new(),
        }
    }

    pub fn scope(&self) -> DatasetScope {
        self.scope
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn snapshot(&self) -> &AnalyticsSnapshot {
        &self.snapshot
    }

    /// Switches scope, dropping the held records and their views. The
    /// returned ticket is the only one whose result will be accepted.
    pub fn select_scope(&mut self, scope: DatasetScope) -> FetchTicket {
        if scope != self.scope {
            info!(from = %self.scope, to = %scope, "dataset scope changed");
        }
        self.scope = scope;
        self.records.clear();
        self.recompute();
        self.begin_fetch()
    }

    /// Starts a fresh fetch for the current scope, superseding any in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.epoch += 1;
        FetchTicket {
            epoch: self.epoch,
            scope: self.scope,
        }
    }

    pub fn set_filter(&mut self, filter: FilterState) -> &AnalyticsSnapshot {
        self.filter = filter;
        self.recompute();
        &self.snapshot
    }

    /// Lands a fetch result. Returns `None` when the ticket was superseded,
    /// in which case nothing changes.
    pub fn accept(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<EmployeeAnalyticsRecord>, SourceError>,
    ) -> Option<&AnalyticsSnapshot> {
        if ticket.epoch != self.epoch || ticket.scope != self.scope {
            debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding stale analytics fetch"
            );
            return None;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.recompute();
            }
            Err(error) => {
                warn!(scope = %self.scope, %error, "analytics source unavailable");
                self.records.clear();
                self.snapshot = AnalyticsSnapshot::unavailable(
                    self.scope,
                    &self.filter,
                    &self.config,
                    &error,
                );
            }
        }

        Some(&self.snapshot)
    }

    pub async fn refresh<S>(&mut self, source: &S) -> &AnalyticsSnapshot
    where
        S: AnalyticsSource + ?Sized,
    {
        let ticket = self.begin_fetch();
        let result = source.fetch_analytics(ticket.scope).await;
        self.accept(ticket, result);
        &self.snapshot
    }

    fn recompute(&mut self) {
        self.snapshot =
            AnalyticsSnapshot::compute(self.scope, &self.records, &self.filter, &self.config);
    }
}
