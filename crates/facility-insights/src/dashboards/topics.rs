//! Per-domain field lists for the three dashboard topics.
//!
//! A topic is one score axis seen through the attributes that explain it. The
//! same layout drives the topic projection, the table columns and the bar
//! chart series, so every domain is described by data instead of its own set
//! of mapping functions.

use super::domain::{Domain, ScoreAxis};
use super::record::FacilityRecord;
use serde_json::{Map, Value};

/// How a topic's bar chart reduces its metric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarReduction {
    /// Mean of the lenient numeric reading over all records.
    Mean,
    /// Sum of the lenient numeric reading over all records.
    Sum,
    /// Share of records whose value reads as "yes", in percent.
    TruthyPercent,
}

#[derive(Debug)]
pub struct TopicLayout {
    pub axis: ScoreAxis,
    /// Attribute fields shown in the topic table, in column order.
    pub fields: &'static [&'static str],
    /// Fields plotted in the topic bar chart.
    pub bar_metrics: &'static [&'static str],
    pub bar_reduction: BarReduction,
}

impl TopicLayout {
    pub fn for_domain(domain: Domain, axis: ScoreAxis) -> &'static TopicLayout {
        match (domain, axis) {
            (Domain::Hospital, ScoreAxis::Infrastructure) => &HOSPITAL_INFRASTRUCTURE,
            (Domain::Hospital, ScoreAxis::Population) => &HOSPITAL_POPULATION,
            (Domain::Hospital, ScoreAxis::Resources) => &HOSPITAL_RESOURCES,
            (Domain::School, ScoreAxis::Infrastructure) => &SCHOOL_INFRASTRUCTURE,
            (Domain::School, ScoreAxis::Population) => &SCHOOL_POPULATION,
            (Domain::School, ScoreAxis::Resources) => &SCHOOL_RESOURCES,
            (Domain::Preschool, ScoreAxis::Infrastructure) => &PRESCHOOL_INFRASTRUCTURE,
            (Domain::Preschool, ScoreAxis::Population) => &PRESCHOOL_POPULATION,
            (Domain::Preschool, ScoreAxis::Resources) => &PRESCHOOL_RESOURCES,
        }
    }

    /// Project a record onto this topic: the entity name, district, topic
    /// fields, the axis score and the backend need category. Missing fields
    /// project as `null`.
    pub fn project(&self, record: &FacilityRecord) -> Map<String, Value> {
        self.projected_fields(record.domain())
            .into_iter()
            .map(|key| {
                let value = record.fields().get(key).cloned().unwrap_or(Value::Null);
                (key.to_string(), value)
            })
            .collect()
    }

    /// Keys of the topic projection in display order.
    pub fn projected_fields(&self, domain: Domain) -> Vec<&'static str> {
        [domain.entity_name_field(), "district"]
            .into_iter()
            .chain(self.fields.iter().copied())
            .chain([self.axis.score_field(), "need_category"])
            .collect()
    }

    /// Column headers for the topic table: name, attributes, then score.
    pub fn column_labels(&self, domain: Domain) -> Vec<String> {
        std::iter::once(domain.entity_name_field())
            .chain(self.fields.iter().copied())
            .chain(std::iter::once(self.axis.score_field()))
            .map(display_name)
            .collect()
    }
}

/// Title-case a snake_case field name (`has_cctv` -> `Has Cctv`).
pub fn display_name(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

static HOSPITAL_INFRASTRUCTURE: TopicLayout = TopicLayout {
    axis: ScoreAxis::Infrastructure,
    fields: &[
        "outside_branches",
        "land_area_built",
        "vacant_land_area",
        "building_count",
        "floors",
        "wall_material",
        "wall_condition",
        "roof_material",
        "roof_condition",
        "window_condition",
        "floor_condition",
        "door_condition",
        "earthquake_safe",
        "age_score",
    ],
    bar_metrics: &[
        "building_count",
        "floors",
        "land_area_built",
        "vacant_land_area",
        "wall_condition",
        "roof_condition",
        "window_condition",
        "floor_condition",
        "door_condition",
        "earthquake_safe",
        "age_score",
    ],
    bar_reduction: BarReduction::Mean,
};

static HOSPITAL_POPULATION: TopicLayout = TopicLayout {
    axis: ScoreAxis::Population,
    fields: &["medical_staff", "bed_capacity", "total_staff"],
    bar_metrics: &["medical_staff", "bed_capacity", "total_staff"],
    bar_reduction: BarReduction::Sum,
};

static HOSPITAL_RESOURCES: TopicLayout = TopicLayout {
    axis: ScoreAxis::Resources,
    fields: &[
        "toilet_water_supply",
        "electricity_supply",
        "has_generator",
        "has_solar_panels",
        "internal_electric_condition",
        "lighting_condition",
        "heating_source",
        "heating_condition",
        "has_water",
        "drinking_water_source",
        "has_fence",
        "internet_type",
        "fire_safety",
        "has_cctv",
        "has_transport_nearby",
        "recent_repairs",
        "restroom_location",
        "restroom_water_condition",
        "restroom_has_sewage",
        "restroom_doors",
        "restroom_handwash_available",
        "restroom_sewage_issues",
        "restroom_water_issues",
        "restroom_light_safe",
        "is_warm_in_winter",
        "has_water_pipeline",
        "satisfaction",
    ],
    bar_metrics: &[
        "has_water",
        "has_generator",
        "has_solar_panels",
        "has_fence",
        "has_water_pipeline",
        "restroom_handwash_available",
        "restroom_light_safe",
        "is_warm_in_winter",
        "fire_safety",
        "has_cctv",
        "has_transport_nearby",
        "recent_repairs",
        "restroom_has_sewage",
        "restroom_sewage_issues",
        "restroom_water_issues",
        "satisfaction",
    ],
    bar_reduction: BarReduction::TruthyPercent,
};

static SCHOOL_INFRASTRUCTURE: TopicLayout = TopicLayout {
    axis: ScoreAxis::Infrastructure,
    fields: &[
        "outside_branches",
        "land_area_built",
        "vacant_land_area",
        "educational_building_count",
        "floor_count",
        "classroom_count",
        "wall_material",
        "wall_condition",
        "roof_material",
        "roof_condition",
        "window_condition",
        "floor_condition",
        "door_condition",
        "sports_hall_condition",
        "earthquake_safety",
        "age_score",
    ],
    bar_metrics: &[
        "educational_building_count",
        "floor_count",
        "classroom_count",
        "land_area_built",
        "vacant_land_area",
        "age_score",
    ],
    bar_reduction: BarReduction::Mean,
};

static SCHOOL_POPULATION: TopicLayout = TopicLayout {
    axis: ScoreAxis::Population,
    fields: &[
        "design_capacity",
        "total_students",
        "boys",
        "girls",
        "shift_count",
        "teachers_total",
        "staff_total",
    ],
    bar_metrics: &["design_capacity", "total_students", "teachers_total", "staff_total"],
    bar_reduction: BarReduction::Sum,
};

static SCHOOL_RESOURCES: TopicLayout = TopicLayout {
    axis: ScoreAxis::Resources,
    fields: &[
        "library_available",
        "computer_lab_available",
        "sports_equipment_available",
        "electricity_condition",
        "has_generator",
        "has_solar_panels",
        "heating_source",
        "water_availability",
        "drinking_water_source",
        "has_fence",
        "internet_type",
        "fire_safety_available",
        "has_cctv",
        "has_public_transport_nearby",
        "accessible_for_disabled",
        "restroom_location",
        "restroom_connected_to_sewage",
        "restroom_handwash_water_soap",
        "classrooms_warm_in_winter",
        "satisfied_with_condition",
    ],
    bar_metrics: &[
        "library_available",
        "computer_lab_available",
        "has_generator",
        "has_solar_panels",
        "has_fence",
        "fire_safety_available",
        "has_cctv",
        "has_public_transport_nearby",
        "accessible_for_disabled",
        "restroom_connected_to_sewage",
        "restroom_handwash_water_soap",
        "classrooms_warm_in_winter",
        "satisfied_with_condition",
    ],
    bar_reduction: BarReduction::TruthyPercent,
};

static PRESCHOOL_INFRASTRUCTURE: TopicLayout = TopicLayout {
    axis: ScoreAxis::Infrastructure,
    fields: &[
        "outside_branches",
        "group_count",
        "land_area_built",
        "external_sweeping_area",
        "internal_cleaning_area",
        "garden_area",
        "leased_garden_area",
        "vacant_land_area",
        "educational_building_count",
        "floor_count",
        "wall_material",
        "wall_condition",
        "roof_material",
        "roof_condition",
        "window_condition",
        "floor_condition",
        "door_condition",
        "assembly_hall_condition",
        "repaired_or_reconstructed",
        "earthquake_safety",
        "meets_modern_infrastructure",
        "satisfied_with_condition",
        "age_score",
    ],
    bar_metrics: &[
        "group_count",
        "educational_building_count",
        "floor_count",
        "land_area_built",
        "garden_area",
        "vacant_land_area",
        "age_score",
    ],
    bar_reduction: BarReduction::Mean,
};

static PRESCHOOL_POPULATION: TopicLayout = TopicLayout {
    axis: ScoreAxis::Population,
    fields: &[
        "design_capacity",
        "total_students",
        "boys",
        "girls",
        "staff_total",
        "staff_men",
        "staff_women",
    ],
    bar_metrics: &["design_capacity", "total_students", "staff_total"],
    bar_reduction: BarReduction::Sum,
};

static PRESCHOOL_RESOURCES: TopicLayout = TopicLayout {
    axis: ScoreAxis::Resources,
    fields: &[
        "sports_equipment_available",
        "kitchen_condition",
        "kitchen_water_supply",
        "electricity_condition",
        "has_generator",
        "has_solar_panels",
        "internal_electrical_condition",
        "lighting_condition",
        "heating_source",
        "heating_fuel_source",
        "boiler_room_condition",
        "internal_heating_condition",
        "water_availability",
        "drinking_water_source",
        "has_fence",
        "internet_type",
        "internet_usage",
        "fire_safety_available",
        "has_cctv",
        "has_public_transport_nearby",
        "accessible_for_disabled",
        "restroom_location",
        "restroom_water_condition",
        "restroom_connected_to_sewage",
        "restroom_doors_partitions",
        "restroom_handwash_water_soap",
        "restroom_sewage_issues",
        "restroom_water_issues",
        "restroom_lighting_safe",
        "classrooms_warm_in_winter",
        "indoor_pipeline_installed",
        "children_walk_more_than_3km",
        "satisfied_with_condition",
    ],
    bar_metrics: &[
        "has_generator",
        "has_solar_panels",
        "has_fence",
        "fire_safety_available",
        "has_cctv",
        "has_public_transport_nearby",
        "accessible_for_disabled",
        "restroom_connected_to_sewage",
        "restroom_handwash_water_soap",
        "restroom_lighting_safe",
        "classrooms_warm_in_winter",
        "indoor_pipeline_installed",
        "satisfied_with_condition",
    ],
    bar_reduction: BarReduction::TruthyPercent,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_domain_and_axis_has_a_layout_for_that_axis() {
        for domain in Domain::ordered() {
            for axis in ScoreAxis::ordered() {
                let layout = TopicLayout::for_domain(domain, axis);
                assert_eq!(layout.axis, axis);
                assert!(!layout.fields.is_empty());
                assert!(!layout.bar_metrics.is_empty());
            }
        }
    }

    #[test]
    fn projection_keeps_name_district_fields_and_score() {
        let record = FacilityRecord::from_value(
            Domain::Hospital,
            json!({
                "hospital_name": "Central",
                "district": "North",
                "medical_staff": 40,
                "bed_capacity": 120,
                "population_score": 0.8,
                "infrastructure_score": 0.2,
                "need_category": "GREEN",
            }),
        )
        .expect("object record");

        let projected =
            TopicLayout::for_domain(Domain::Hospital, ScoreAxis::Population).project(&record);

        assert_eq!(projected.get("hospital_name"), Some(&json!("Central")));
        assert_eq!(projected.get("medical_staff"), Some(&json!(40)));
        assert_eq!(projected.get("total_staff"), Some(&Value::Null));
        assert_eq!(projected.get("population_score"), Some(&json!(0.8)));
        assert!(projected.get("infrastructure_score").is_none());
        let keys: Vec<&String> = projected.keys().collect();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn display_names_are_title_cased() {
        assert_eq!(display_name("has_cctv"), "Has Cctv");
        assert_eq!(display_name("land_area_built"), "Land Area Built");
        assert_eq!(display_name("floors"), "Floors");
    }

    #[test]
    fn column_labels_wrap_fields_with_name_and_score() {
        let labels = TopicLayout::for_domain(Domain::Preschool, ScoreAxis::Population)
            .column_labels(Domain::Preschool);
        assert_eq!(labels.first().map(String::as_str), Some("Kindergarten Name"));
        assert_eq!(labels.last().map(String::as_str), Some("Population Score"));
    }
}
