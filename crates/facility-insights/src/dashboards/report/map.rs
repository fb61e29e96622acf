use std::borrow::Cow;

use super::super::aggregate::format_percent;
use super::super::domain::{NeedCategory, ScoreAxis};
use super::super::filter::FilteredView;
use super::super::record::FacilityRecord;
use super::views::{MapMarker, MapView};

pub const DEFAULT_CENTER: [f64; 2] = [39.8, 66.9];
pub const DEFAULT_ZOOM: u8 = 9;

const DEFAULT_MARKER_COLOR: &str = "green";

fn popup_lines(record: &FacilityRecord, need: Option<NeedCategory>) -> Vec<String> {
    let mut lines = vec![record
        .entity_name()
        .map_or_else(|| "-".to_string(), Cow::into_owned)];
    lines.push(format!(
        "District: {}",
        record.district().as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "Need: {}",
        need.map(NeedCategory::label).unwrap_or("-")
    ));
    lines.extend(ScoreAxis::ordered().into_iter().map(|axis| {
        let score = record
            .score(axis)
            .map(format_percent)
            .unwrap_or_else(|| "-".to_string());
        format!("{}: {score}", axis.label())
    }));
    lines
}

fn marker(record: &FacilityRecord) -> Option<MapMarker> {
    let (latitude, longitude) = record.coordinates()?;
    let need = record.reported_need();
    Some(MapMarker {
        entity_name: record
            .entity_name()
            .map_or_else(|| "-".to_string(), Cow::into_owned),
        district: record.district().map(Cow::into_owned),
        latitude,
        longitude,
        need,
        color: need
            .map(NeedCategory::marker_color)
            .unwrap_or(DEFAULT_MARKER_COLOR),
        popup: popup_lines(record, need),
    })
}

fn bounds(markers: &[MapMarker]) -> Option<[[f64; 2]; 2]> {
    let first = markers.first()?;
    let start = [
        [first.latitude, first.longitude],
        [first.latitude, first.longitude],
    ];
    Some(markers.iter().fold(start, |[south_west, north_east], m| {
        [
            [south_west[0].min(m.latitude), south_west[1].min(m.longitude)],
            [north_east[0].max(m.latitude), north_east[1].max(m.longitude)],
        ]
    }))
}

/// Markers for every record with usable coordinates, centred on their
/// bounding box or on the default view when none has coordinates.
pub fn map_view(view: &FilteredView<'_>) -> MapView {
    let markers: Vec<MapMarker> = view.iter().filter_map(marker).collect();
    let bounds = bounds(&markers);
    let center = bounds
        .map(|[sw, ne]| [(sw[0] + ne[0]) / 2.0, (sw[1] + ne[1]) / 2.0])
        .unwrap_or(DEFAULT_CENTER);

    MapView {
        center,
        zoom: DEFAULT_ZOOM,
        bounds,
        markers,
    }
}
