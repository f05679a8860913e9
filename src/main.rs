use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use burnout_dashboard::aggregate::View;
use burnout_dashboard::config::{DashboardConfig, HeatmapLabel, DEFAULT_TOP_N};
use burnout_dashboard::dashboard::{AnalyticsSnapshot, Dashboard};
use burnout_dashboard::db::{self, PgSource};
use burnout_dashboard::models::{DatasetScope, FilterState, RiskFilter};
use burnout_dashboard::report;
use burnout_dashboard::source::{AnalyticsSource, CsvSource, DatasetRegistry};

#[derive(Parser)]
#[command(name = "burnout-dashboard")]
#[command(about = "Employee burnout risk analytics", long_about = None)]
struct Cli {
    /// Read employee analytics from a CSV file instead of Postgres
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Number of employees in the top-N bar series
    #[arg(long, global = true, env = "BURNOUT_TOP_N", default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// legacy shows the heatmap's burnout column as "Performance", corrected as "Burnout"
    #[arg(long, global = true, env = "BURNOUT_HEATMAP_LABEL", default_value = "legacy")]
    heatmap_label: HeatmapLabel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    /// Restrict to one dataset; omit for all datasets
    #[arg(long)]
    dataset: Option<i64>,
    #[arg(long, default_value = "all")]
    department: String,
    #[arg(long, default_value = "")]
    employee_id: String,
    /// all, high, medium or low
    #[arg(long, default_value = "all")]
    risk: RiskFilter,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample datasets and employees
    Seed,
    /// List datasets with their employee counts
    Datasets,
    /// Print every analytics view for a scope and filters
    Views {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "burnout-report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig {
        top_n: cli.top_n,
        heatmap_label: cli.heatmap_label,
    };

    match cli.command {
        Commands::InitDb => {
            let pool = connect(cli.database_url.as_deref()).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(cli.database_url.as_deref()).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        command => match cli.csv {
            Some(path) => {
                info!(path = %path.display(), "reading analytics from csv");
                run(&CsvSource::new(path), command, config).await?;
            }
            None => {
                let pool = connect(cli.database_url.as_deref()).await?;
                run(&PgSource::new(pool), command, config).await?;
            }
        },
    }

    Ok(())
}

async fn connect(database_url: Option<&str>) -> anyhow::Result<PgPool> {
    let database_url = database_url
        .context("DATABASE_URL must be set (or pass --csv to read from a file)")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn run<S>(source: &S, command: Commands, config: DashboardConfig) -> anyhow::Result<()>
where
    S: AnalyticsSource + DatasetRegistry,
{
    match command {
        Commands::Datasets => {
            let datasets = source
                .list_datasets()
                .await
                .context("failed to list datasets")?;
            if datasets.is_empty() {
                println!("No datasets found.");
            }
            for dataset in datasets {
                println!(
                    "- #{} {} ({} employees)",
                    dataset.id, dataset.name, dataset.employee_count
                );
            }
        }
        Commands::Views { view, format } => {
            let snapshot = load(source, &view, config).await;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                OutputFormat::Text => {
                    let label = scope_label(source, snapshot.scope()).await;
                    print_views(&label, &snapshot);
                }
            }
        }
        Commands::Report { view, limit, out } => {
            let snapshot = load(source, &view, config).await;
            let label = scope_label(source, snapshot.scope()).await;
            let report = report::build_report(&label, chrono::Utc::now(), &snapshot, limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::InitDb | Commands::Seed => {
            anyhow::bail!("init-db and seed only run against Postgres")
        }
    }

    Ok(())
}

async fn load<S>(source: &S, view: &ViewArgs, config: DashboardConfig) -> AnalyticsSnapshot
where
    S: AnalyticsSource,
{
    let mut dashboard = Dashboard::new(config);
    let ticket = dashboard.select_scope(DatasetScope::from_option(view.dataset));
    let records = source.fetch_analytics(ticket.scope()).await;
    dashboard.accept(ticket, records);
    dashboard
        .set_filter(FilterState::from_inputs(
            &view.department,
            &view.employee_id,
            view.risk,
        ))
        .clone()
}

async fn scope_label<S>(registry: &S, scope: DatasetScope) -> String
where
    S: DatasetRegistry,
{
    let DatasetScope::Dataset(id) = scope else {
        return "all datasets".to_string();
    };

    match registry.list_datasets().await {
        Ok(datasets) => match datasets.into_iter().find(|d| d.id == id) {
            Some(dataset) => dataset.name,
            None => {
                warn!(dataset_id = id, "dataset not found in registry");
                scope.to_string()
            }
        },
        Err(error) => {
            warn!(%error, "failed to list datasets");
            scope.to_string()
        }
    }
}

fn print_views(label: &str, snapshot: &AnalyticsSnapshot) {
    println!("Burnout analytics for {} ({})", label, report::describe_filter(snapshot));

    if let Some(error) = snapshot.source_error() {
        println!("Employee data unavailable: {error}");
    }

    match snapshot.summary() {
        View::Ready(summary) => println!(
            "Showing {} | avg burnout {}% | highest {} ({}%) | avg {}h work / {}h overtime",
            summary.count,
            summary.mean_burnout,
            summary.highest.name,
            summary.highest.score,
            summary.mean_weekly_hours,
            summary.mean_overtime
        ),
        View::Empty => {
            println!("No data to display.");
            return;
        }
    }

    if let View::Ready(distribution) = snapshot.risk_distribution() {
        println!(
            "Risk: high {} ({}%), medium {} ({}%), low {} ({}%)",
            distribution.high.count,
            distribution.high.percent,
            distribution.medium.count,
            distribution.medium.percent,
            distribution.low.count,
            distribution.low.percent
        );
    }

    if let View::Ready(pie) = snapshot.pie_series() {
        println!("Departments:");
        for (department, count) in pie.labels.iter().zip(&pie.values) {
            println!("- {department}: {count}");
        }
    }

    if let View::Ready(bar) = snapshot.top_n_bar_series() {
        println!("Top {} by burnout:", bar.len());
        for (name, score) in bar.labels.iter().zip(&bar.values) {
            println!("- {name}: {score}%");
        }
    }

    if let View::Ready(grid) = snapshot.heatmap_grid() {
        println!("Workload heatmap ({}):", grid.headers.join(" | "));
        for row in &grid.rows {
            let cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| format!("{} ({:.0}%)", cell.value, cell.intensity * 100.0))
                .collect();
            println!("- {}: {}", row.name, cells.join(" | "));
        }
    }

    let exclusions = snapshot.exclusions();
    if exclusions.total() > 0 {
        println!(
            "Left out: {} unscored, {} with incomplete data.",
            exclusions.unscored, exclusions.malformed
        );
    }

    for alert in snapshot.alerts() {
        println!("ALERT {}", alert.message);
    }
}
