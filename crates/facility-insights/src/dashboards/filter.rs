use super::record::FacilityRecord;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Districts and entity names picked by the user. An empty set places no
/// constraint on its axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub districts: BTreeSet<String>,
    #[serde(default)]
    pub entity_names: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<D, E>(districts: D, entity_names: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            districts: districts.into_iter().map(Into::into).collect(),
            entity_names: entity_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty() && self.entity_names.is_empty()
    }

    /// A record without a district passes only while no district is selected;
    /// the same holds for a record without an entity name.
    pub fn matches(&self, record: &FacilityRecord) -> bool {
        axis_matches(&self.districts, record.district())
            && axis_matches(&self.entity_names, record.entity_name())
    }
}

fn axis_matches(selected: &BTreeSet<String>, value: Option<Cow<'_, str>>) -> bool {
    selected.is_empty() || value.is_some_and(|value| selected.contains(value.as_ref()))
}

/// Distinct, sorted values offered by the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub districts: Vec<String>,
    pub entity_names: Vec<String>,
}

pub fn compute_options<'a, I>(records: I) -> FilterOptions
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let mut regions = BTreeSet::new();
    let mut districts = BTreeSet::new();
    let mut entity_names = BTreeSet::new();

    for record in records {
        if let Some(region) = record.region() {
            regions.insert(region);
        }
        if let Some(district) = record.district() {
            districts.insert(district);
        }
        if let Some(name) = record.entity_name() {
            entity_names.insert(name);
        }
    }

    FilterOptions {
        regions: into_sorted(regions),
        districts: into_sorted(districts),
        entity_names: into_sorted(entity_names),
    }
}

/// Entity names still selectable once `selected_districts` is chosen: names
/// of records inside those districts, or every name when none is chosen.
pub fn entity_options_for<'a, I>(records: I, selected_districts: &BTreeSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let names: BTreeSet<Cow<'a, str>> = records
        .into_iter()
        .filter(|record| axis_matches(selected_districts, record.district()))
        .filter_map(FacilityRecord::entity_name)
        .collect();
    into_sorted(names)
}

/// Options for the current selection. Districts are never narrowed; entity
/// names cascade from the selected districts.
pub fn cascade_options(records: &[FacilityRecord], selection: &FilterSelection) -> FilterOptions {
    let mut options = compute_options(records);
    if !selection.districts.is_empty() {
        options.entity_names = entity_options_for(records, &selection.districts);
    }
    options
}

fn into_sorted(values: BTreeSet<Cow<'_, str>>) -> Vec<String> {
    values.into_iter().map(Cow::into_owned).collect()
}

/// Records passing a [`FilterSelection`], borrowed from the dataset in their
/// original order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilteredView<'a> {
    records: Vec<&'a FacilityRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, &'a FacilityRecord>> {
        self.records.iter().copied()
    }

    pub fn to_records(&self) -> Vec<FacilityRecord> {
        self.iter().cloned().collect()
    }
}

impl<'v, 'a> IntoIterator for &'v FilteredView<'a> {
    type Item = &'a FacilityRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a FacilityRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn apply_filter<'a>(
    records: &'a [FacilityRecord],
    selection: &FilterSelection,
) -> FilteredView<'a> {
    FilteredView {
        records: records
            .iter()
            .filter(|record| selection.matches(record))
            .collect(),
    }
}
