use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::SourceError;
use crate::models::{Dataset, DatasetScope, EmployeeAnalyticsRecord};
use crate::source::{AnalyticsSource, DatasetRegistry};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let datasets = vec!["Q1 Engineering", "People Ops"];

    for name in datasets {
        sqlx::query(
            r#"
            INSERT INTO burnout_dashboard.datasets (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    let employees = vec![
        (
            "seed-001",
            "Q1 Engineering",
            "John",
            "Engineering",
            50.0,
            15.0,
            20,
            12.0,
            1,
            3.2,
            Some(60.0),
        ),
        (
            "seed-002",
            "Q1 Engineering",
            "Priya Shah",
            "Engineering",
            58.0,
            22.0,
            25,
            14.0,
            0,
            2.8,
            Some(86.0),
        ),
        (
            "seed-003",
            "Q1 Engineering",
            "Marco Silva",
            "Engineering",
            44.0,
            6.0,
            18,
            9.0,
            2,
            3.9,
            Some(32.0),
        ),
        (
            "seed-004",
            "Q1 Engineering",
            "Lena Fischer",
            "Product",
            47.0,
            9.0,
            16,
            16.0,
            1,
            3.4,
            Some(59.0),
        ),
        (
            "seed-005",
            "People Ops",
            "Anita",
            "HR",
            40.0,
            5.0,
            15,
            8.0,
            3,
            4.5,
            Some(23.0),
        ),
        (
            "seed-006",
            "People Ops",
            "Tomás Ortega",
            "HR",
            45.0,
            11.0,
            14,
            11.0,
            1,
            3.1,
            Some(64.0),
        ),
        (
            "seed-007",
            "People Ops",
            "Grace Kim",
            "Sales",
            52.0,
            13.0,
            21,
            7.0,
            0,
            3.6,
            None,
        ),
    ];

    for (
        source_key,
        dataset,
        name,
        department,
        weekly,
        overtime,
        tasks,
        meetings,
        leave,
        performance,
        burnout,
    ) in employees
    {
        let dataset_id: i64 =
            sqlx::query("SELECT id FROM burnout_dashboard.datasets WHERE name = $1")
                .bind(dataset)
                .fetch_one(pool)
                .await?
                .get("id");

        sqlx::query(
            r#"
            INSERT INTO burnout_dashboard.employees
            (dataset_id, name, department, weekly_work_hours, overtime_hours, tasks_completed,
             meeting_hours, leave_days_last_3_months, performance_score, burnout_score, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(dataset_id)
        .bind(name)
        .bind(department)
        .bind(weekly)
        .bind(overtime)
        .bind(tasks)
        .bind(meetings)
        .bind(leave)
        .bind(performance)
        .bind(burnout)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_analytics(
    pool: &PgPool,
    dataset_id: Option<i64>,
) -> Result<Vec<EmployeeAnalyticsRecord>, sqlx::Error> {
    let mut query = String::from(
        "SELECT id, name, department, weekly_work_hours, overtime_hours, tasks_completed, \
         meeting_hours, leave_days_last_3_months, performance_score, burnout_score \
         FROM burnout_dashboard.employees",
    );

    if dataset_id.is_some() {
        query.push_str(" WHERE dataset_id = $1");
    }
    query.push_str(" ORDER BY id");

    let mut rows = sqlx::query(&query);
    if let Some(value) = dataset_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut employees = Vec::with_capacity(records.len());

    for row in records {
        employees.push(EmployeeAnalyticsRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            department: row.try_get("department")?,
            weekly_work_hours: row.try_get("weekly_work_hours")?,
            overtime_hours: row.try_get("overtime_hours")?,
            tasks_completed: row.try_get("tasks_completed")?,
            meeting_hours: row.try_get("meeting_hours")?,
            leave_days_last_3_months: row.try_get("leave_days_last_3_months")?,
            performance_score: row.try_get("performance_score")?,
            burnout_score: row.try_get("burnout_score")?,
        });
    }

    Ok(employees)
}

pub async fn fetch_datasets(pool: &PgPool) -> Result<Vec<Dataset>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT d.id, d.name, COUNT(e.id) AS employee_count
        FROM burnout_dashboard.datasets d
        LEFT JOIN burnout_dashboard.employees e ON e.dataset_id = d.id
        GROUP BY d.id, d.name
        ORDER BY d.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<Dataset, sqlx::Error> {
            Ok(Dataset {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                employee_count: row.try_get("employee_count")?,
            })
        })
        .collect()
}

/// Postgres-backed analytics source and dataset registry.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSource for PgSource {
    async fn fetch_analytics(
        &self,
        scope: DatasetScope,
    ) -> Result<Vec<EmployeeAnalyticsRecord>, SourceError> {
        Ok(fetch_analytics(&self.pool, scope.dataset_id()).await?)
    }
}

#[async_trait]
impl DatasetRegistry for PgSource {
    async fn list_datasets(&self) -> Result<Vec<Dataset>, SourceError> {
        Ok(fetch_datasets(&self.pool).await?)
    }
}
