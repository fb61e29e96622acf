use tracing::debug;

use super::super::aggregate::{
    aggregate, format_percent, mean_score, metric_mean, metric_sum, truthy_percent, AggregateResult,
};
use super::super::domain::{Domain, NeedCategory, ScoreAxis};
use super::super::filter::{apply_filter, cascade_options, FilterSelection, FilteredView};
use super::super::state::DatasetSnapshot;
use super::super::topics::{display_name, BarReduction, TopicLayout};
use super::map::map_view;
use super::tables::table_view;
use super::views::{
    AxisPanel, BarChartView, BarPoint, BarUnit, DashboardSnapshot, DonutSlice, DonutView,
    SummaryCards,
};

const EMPTY_CARD: &str = "-";

pub fn summary_cards(view: &FilteredView<'_>) -> SummaryCards {
    if view.is_empty() {
        return SummaryCards {
            total_count: 0,
            population_score: EMPTY_CARD.to_string(),
            infrastructure_score: EMPTY_CARD.to_string(),
            resources_score: EMPTY_CARD.to_string(),
        };
    }

    SummaryCards {
        total_count: view.len(),
        population_score: format_percent(mean_score(view, ScoreAxis::Population)),
        infrastructure_score: format_percent(mean_score(view, ScoreAxis::Infrastructure)),
        resources_score: format_percent(mean_score(view, ScoreAxis::Resources)),
    }
}

pub fn donut_view(result: &AggregateResult) -> DonutView {
    let slices = NeedCategory::ordered()
        .into_iter()
        .map(|category| DonutSlice {
            category,
            label: category.label(),
            count: result.distribution.get(category),
            percent: result.distribution.percent(category),
        })
        .collect();

    DonutView {
        title: format!("{} Need Distribution", result.axis.label()),
        total: result.distribution.total(),
        slices,
    }
}

pub fn bar_chart(layout: &TopicLayout, view: &FilteredView<'_>) -> BarChartView {
    let title = format!("{} Metrics", layout.axis.label());
    let unit = match layout.bar_reduction {
        BarReduction::Mean => BarUnit::Average,
        BarReduction::Sum => BarUnit::Total,
        BarReduction::TruthyPercent => BarUnit::Percent,
    };

    let points = layout
        .bar_metrics
        .iter()
        .filter_map(|&field| {
            let value = match layout.bar_reduction {
                BarReduction::Mean => metric_mean(view, field),
                BarReduction::Sum => metric_sum(view, field),
                BarReduction::TruthyPercent => truthy_percent(view, field),
            };
            // averages that never rose above zero carry no data for the chart
            if layout.bar_reduction == BarReduction::Mean && value <= 0.0 {
                return None;
            }
            Some(BarPoint {
                field,
                label: display_name(field),
                value,
            })
        })
        .collect();

    BarChartView {
        title,
        unit,
        points,
    }
}

fn axis_panel(domain: Domain, axis: ScoreAxis, view: &FilteredView<'_>) -> AxisPanel {
    let layout = TopicLayout::for_domain(domain, axis);
    let aggregate = aggregate(view, axis);
    AxisPanel {
        axis,
        donut: donut_view(&aggregate),
        bar: bar_chart(layout, view),
        table: table_view(domain, layout, view),
        aggregate,
    }
}

/// Filter a dataset snapshot and reduce it to everything one dashboard
/// shows.
pub fn build_dashboard(
    snapshot: &DatasetSnapshot,
    selection: &FilterSelection,
) -> DashboardSnapshot {
    let domain = snapshot.domain;
    let view = apply_filter(&snapshot.records, selection);
    debug!(
        %domain,
        dataset = snapshot.records.len(),
        filtered = view.len(),
        "building dashboard"
    );

    let panels = ScoreAxis::ordered()
        .into_iter()
        .map(|axis| axis_panel(domain, axis, &view))
        .collect();

    DashboardSnapshot {
        domain,
        domain_label: domain.label(),
        loaded_at: snapshot.loaded_at,
        dataset_size: snapshot.records.len(),
        selection: selection.clone(),
        options: cascade_options(&snapshot.records, selection),
        summary: summary_cards(&view),
        panels,
        map: map_view(&view),
        records: view.to_records(),
    }
}
