use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::aggregate::AggregateResult;
use super::super::domain::{Domain, NeedCategory, ScoreAxis};
use super::super::filter::{FilterOptions, FilterSelection};
use super::super::record::FacilityRecord;

/// Headline numbers; the score cards read `"-"` for an empty view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCards {
    pub total_count: usize,
    pub population_score: String,
    pub infrastructure_score: String,
    pub resources_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonutSlice {
    pub category: NeedCategory,
    pub label: &'static str,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonutView {
    pub title: String,
    pub total: usize,
    pub slices: Vec<DonutSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarUnit {
    Average,
    Total,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub field: &'static str,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartView {
    pub title: String,
    pub unit: BarUnit,
    pub points: Vec<BarPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub entity_name: String,
    pub cells: Vec<String>,
    pub score: String,
    pub score_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub entity_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need: Option<NeedCategory>,
    pub color: &'static str,
    pub popup: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    /// South-west and north-east corners of the markers, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[[f64; 2]; 2]>,
    pub markers: Vec<MapMarker>,
}

/// Everything the dashboard shows for one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisPanel {
    pub axis: ScoreAxis,
    pub aggregate: AggregateResult,
    pub donut: DonutView,
    pub bar: BarChartView,
    pub table: TableView,
}

/// Rendering-boundary payload for one domain and one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub domain: Domain,
    pub domain_label: &'static str,
    pub loaded_at: DateTime<Utc>,
    pub dataset_size: usize,
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub summary: SummaryCards,
    pub panels: Vec<AxisPanel>,
    pub map: MapView,
    pub records: Vec<FacilityRecord>,
}
