use crate::cli::SourceArgs;
use crate::infra::InMemoryFailureNotifier;
use chrono::{DateTime, Utc};
use clap::Args;
use facility_insights::config::AppConfig;
use facility_insights::dashboards::report::views::DashboardSnapshot;
use facility_insights::dashboards::{
    BackendSource, DashboardService, Domain, FilterSelection, ScoreAxis,
};
use facility_insights::error::AppError;
use facility_insights::telemetry;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Facility domain: hospital, school or preschool
    pub(crate) domain: Domain,
    /// Restrict to a district (repeatable)
    #[arg(long)]
    pub(crate) district: Vec<String>,
    /// Restrict to a facility by name (repeatable)
    #[arg(long)]
    pub(crate) entity: Vec<String>,
    /// Print every table row, not just the summary
    #[arg(long)]
    pub(crate) list_rows: bool,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Facility domain: hospital, school or preschool
    pub(crate) domain: Domain,
    /// Topic table to export: infrastructure, population or resources
    pub(crate) topic: ScoreAxis,
    /// Restrict to a district (repeatable)
    #[arg(long)]
    pub(crate) district: Vec<String>,
    /// Restrict to a facility by name (repeatable)
    #[arg(long)]
    pub(crate) entity: Vec<String>,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

type CliService = DashboardService<BackendSource, InMemoryFailureNotifier>;

fn build_service(
    source_args: SourceArgs,
) -> Result<(CliService, InMemoryFailureNotifier), AppError> {
    let mut config = AppConfig::load()?;
    source_args.apply(&mut config.backend);
    telemetry::init_with_writer(&config.telemetry, std::io::stderr)?;

    let source = BackendSource::from_config(&config.backend)?;
    let notices = InMemoryFailureNotifier::default();
    let service = DashboardService::new(
        Arc::new(source),
        Arc::new(notices.clone()),
        config.backend.retry_policy(),
    );
    Ok((service, notices))
}

async fn load(
    service: &CliService,
    notices: &InMemoryFailureNotifier,
    domain: Domain,
) -> Result<(), AppError> {
    if let Err(err) = service.refresh(domain).await {
        for notice in notices.recent() {
            eprintln!("{}: {}", notice.headline(), notice.message);
        }
        return Err(err.into());
    }
    Ok(())
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        domain,
        district,
        entity,
        list_rows,
        source,
    } = args;

    let (service, notices) = build_service(source)?;
    load(&service, &notices, domain).await?;

    let selection = FilterSelection::new(district, entity);
    let dashboard = service.dashboard(domain, &selection)?;
    print!("{}", render_dashboard(&dashboard, list_rows));
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        domain,
        topic,
        district,
        entity,
        output,
        source,
    } = args;

    let (service, notices) = build_service(source)?;
    load(&service, &notices, domain).await?;

    let selection = FilterSelection::new(district, entity);
    let csv = service.export_csv(domain, topic, &selection)?;
    match output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            eprintln!(
                "Wrote {} {} table to {}",
                domain.label(),
                topic.label(),
                path.display()
            );
        }
        None => std::io::stdout().write_all(&csv)?,
    }
    Ok(())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub(crate) fn render_dashboard(dashboard: &DashboardSnapshot, list_rows: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} dashboard", dashboard.domain_label);
    let _ = writeln!(
        out,
        "Dataset: {} records loaded {}",
        dashboard.dataset_size,
        format_timestamp(dashboard.loaded_at)
    );

    if dashboard.selection.is_empty() {
        let _ = writeln!(out, "Filter: none");
    } else {
        let districts: Vec<&str> = dashboard
            .selection
            .districts
            .iter()
            .map(String::as_str)
            .collect();
        let entities: Vec<&str> = dashboard
            .selection
            .entity_names
            .iter()
            .map(String::as_str)
            .collect();
        let _ = writeln!(
            out,
            "Filter: districts [{}] | facilities [{}]",
            districts.join(", "),
            entities.join(", ")
        );
    }

    let summary = &dashboard.summary;
    let _ = writeln!(out, "\nSummary");
    let _ = writeln!(out, "- Facilities: {}", summary.total_count);
    let _ = writeln!(out, "- Population score: {}", summary.population_score);
    let _ = writeln!(out, "- Infrastructure score: {}", summary.infrastructure_score);
    let _ = writeln!(out, "- Resources score: {}", summary.resources_score);

    for panel in &dashboard.panels {
        let _ = writeln!(out, "\n{}", panel.donut.title);
        for slice in &panel.donut.slices {
            let _ = writeln!(out, "- {}: {} ({}%)", slice.label, slice.count, slice.percent);
        }

        let _ = writeln!(out, "{}", panel.bar.title);
        if panel.bar.points.is_empty() {
            let _ = writeln!(out, "- no data");
        }
        for point in &panel.bar.points {
            let _ = writeln!(out, "- {}: {:.2}", point.label, point.value);
        }

        if list_rows {
            let _ = writeln!(out, "{} table", panel.axis.label());
            for row in &panel.table.rows {
                let _ = writeln!(
                    out,
                    "- {} | score {} ({})",
                    row.entity_name, row.score, row.score_class
                );
            }
        }
    }

    let _ = writeln!(
        out,
        "\nMap: {} markers centred at ({:.3}, {:.3})",
        dashboard.map.markers.len(),
        dashboard.map.center[0],
        dashboard.map.center[1]
    );
    out
}
