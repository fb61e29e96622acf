use serde_json::Value;
use std::borrow::Cow;

use super::super::aggregate::format_percent;
use super::super::domain::Domain;
use super::super::filter::FilteredView;
use super::super::record::FacilityRecord;
use super::super::topics::TopicLayout;
use super::views::{TableRow, TableView};

const MISSING: &str = "-";

fn table_row(layout: &TopicLayout, record: &FacilityRecord) -> TableRow {
    let axis = layout.axis;
    let cells = layout
        .fields
        .iter()
        .map(|field| record.display(field))
        .collect();
    let score = record
        .score(axis)
        .map(format_percent)
        .unwrap_or_else(|| MISSING.to_string());

    TableRow {
        entity_name: record
            .entity_name()
            .map_or_else(|| MISSING.to_string(), Cow::into_owned),
        cells,
        score,
        score_class: record.category(axis).score_class(),
    }
}

pub fn table_view(domain: Domain, layout: &TopicLayout, view: &FilteredView<'_>) -> TableView {
    TableView {
        columns: layout.column_labels(domain),
        rows: view.iter().map(|record| table_row(layout, record)).collect(),
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Write the topic projection of every record as CSV, raw field names as the
/// header row.
pub fn export_csv(
    domain: Domain,
    layout: &TopicLayout,
    view: &FilteredView<'_>,
) -> Result<Vec<u8>, csv::Error> {
    let keys = layout.projected_fields(domain);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&keys)?;

    for record in view {
        let projection = layout.project(record);
        let row = keys
            .iter()
            .map(|key| projection.get(*key).map(csv_cell).unwrap_or_default());
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
