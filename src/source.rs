use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;
use crate::models::{Dataset, DatasetScope, EmployeeAnalyticsRecord};

/// Supplies the ordered employee records for a dataset scope.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_analytics(
        &self,
        scope: DatasetScope,
    ) -> Result<Vec<EmployeeAnalyticsRecord>, SourceError>;
}

/// Lists the datasets a scope can be narrowed to.
#[async_trait]
pub trait DatasetRegistry: Send + Sync {
    async fn list_datasets(&self) -> Result<Vec<Dataset>, SourceError>;
}

/// Reads analytics rows from a CSV export. The file is re-read on every
/// fetch so edits show up on the next refresh.
///
/// Expected headers: `id,name,department,weekly_work_hours,overtime_hours,
/// tasks_completed,meeting_hours,leave_days_last_3_months,performance_score,
/// burnout_score` plus optional `dataset_id,dataset_name`. Numeric cells
/// that do not parse are read as missing, leaving the row for screening.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: i64,
    name: String,
    department: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    weekly_work_hours: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    overtime_hours: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tasks_completed: Option<i32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    meeting_hours: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    leave_days_last_3_months: Option<i32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    performance_score: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    burnout_score: Option<f64>,
    #[serde(default)]
    dataset_id: Option<i64>,
    #[serde(default)]
    dataset_name: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> EmployeeAnalyticsRecord {
        EmployeeAnalyticsRecord {
            id: self.id,
            name: self.name,
            department: self.department,
            weekly_work_hours: self.weekly_work_hours,
            overtime_hours: self.overtime_hours,
            tasks_completed: self.tasks_completed,
            meeting_hours: self.meeting_hours,
            leave_days_last_3_months: self.leave_days_last_3_months,
            performance_score: self.performance_score,
            burnout_score: self.burnout_score,
        }
    }
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_rows(&self) -> Result<Vec<CsvRow>, SourceError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for result in reader.deserialize::<CsvRow>() {
            rows.push(result?);
        }
        debug!(path = %self.path.display(), rows = rows.len(), "read analytics csv");
        Ok(rows)
    }
}

#[async_trait]
impl AnalyticsSource for CsvSource {
    async fn fetch_analytics(
        &self,
        scope: DatasetScope,
    ) -> Result<Vec<EmployeeAnalyticsRecord>, SourceError> {
        let rows = self.read_rows()?;
        Ok(rows
            .into_iter()
            .filter(|row| match scope {
                DatasetScope::All => true,
                DatasetScope::Dataset(id) => row.dataset_id == Some(id),
            })
            .map(CsvRow::into_record)
            .collect())
    }
}

#[async_trait]
impl DatasetRegistry for CsvSource {
    async fn list_datasets(&self) -> Result<Vec<Dataset>, SourceError> {
        let rows = self.read_rows()?;
        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut datasets: Vec<Dataset> = Vec::new();

        for row in rows {
            let Some(id) = row.dataset_id else {
                continue;
            };
            let slot = *index.entry(id).or_insert_with(|| {
                datasets.push(Dataset {
                    id,
                    name: row
                        .dataset_name
                        .clone()
                        .unwrap_or_else(|| format!("Dataset {id}")),
                    employee_count: 0,
                });
                datasets.len() - 1
            });
            datasets[slot].employee_count += 1;
        }

        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::dashboard::Dashboard;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    const SAMPLE: &str = "\
id,name,department,weekly_work_hours,overtime_hours,tasks_completed,meeting_hours,leave_days_last_3_months,performance_score,burnout_score,dataset_id,dataset_name
1,John,Engineering,50,15,20,12,1,3.2,63.2,1,Q1 Engineering
2,Anita,HR,40,5,15,8,3,4.5,,2,People Ops
3,Ravi,Engineering,55,,22,10,0,3.0,71.5,1,Q1 Engineering
";

    #[tokio::test]
    async fn reads_all_rows_in_file_order() {
        let file = write_csv(SAMPLE);
        let source = CsvSource::new(file.path());
        let records = source
            .fetch_analytics(DatasetScope::All)
            .await
            .expect("records");

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(records[0].burnout_score, Some(63.2));
        assert_eq!(records[1].burnout_score, None);
        assert_eq!(records[2].overtime_hours, None);
    }

    #[tokio::test]
    async fn unparsable_numeric_cell_reads_as_missing() {
        let file = write_csv(
            "\
id,name,department,weekly_work_hours,overtime_hours,tasks_completed,meeting_hours,leave_days_last_3_months,performance_score,burnout_score
1,John,Engineering,50,15,20,12,1,3.2,63.2
2,Anita,HR,n/a,5,15,8,3,4.5,41.0
",
        );
        let source = CsvSource::new(file.path());
        let records = source
            .fetch_analytics(DatasetScope::All)
            .await
            .expect("records");

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].weekly_work_hours, None);
        assert_eq!(records[1].burnout_score, Some(41.0));

        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let snapshot = dashboard.refresh(&source).await;
        assert!(snapshot.source_error().is_none());
        assert_eq!(snapshot.exclusions().malformed, 1);
        assert_eq!(snapshot.summary().ready().map(|s| s.count), Some(1));
    }

    #[tokio::test]
    async fn dataset_scope_restricts_rows() {
        let file = write_csv(SAMPLE);
        let source = CsvSource::new(file.path());
        let records = source
            .fetch_analytics(DatasetScope::Dataset(1))
            .await
            .expect("records");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.department == "Engineering"));
    }

    #[tokio::test]
    async fn registry_counts_members_per_dataset() {
        let file = write_csv(SAMPLE);
        let source = CsvSource::new(file.path());
        let datasets = source.list_datasets().await.expect("datasets");
        assert_eq!(
            datasets,
            vec![
                Dataset {
                    id: 1,
                    name: "Q1 Engineering".to_string(),
                    employee_count: 2
                },
                Dataset {
                    id: 2,
                    name: "People Ops".to_string(),
                    employee_count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_source_error() {
        let source = CsvSource::new("/nonexistent/analytics.csv");
        let result = source.fetch_analytics(DatasetScope::All).await;
        assert!(matches!(result, Err(SourceError::Csv(_))));
    }
}
