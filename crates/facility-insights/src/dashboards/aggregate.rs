use super::domain::{NeedCategory, ScoreAxis};
use super::record::FacilityRecord;
use serde::Serialize;

/// Count of records per need category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NeedDistribution {
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
}

impl NeedDistribution {
    pub fn add(&mut self, category: NeedCategory) {
        match category {
            NeedCategory::Red => self.red += 1,
            NeedCategory::Yellow => self.yellow += 1,
            NeedCategory::Green => self.green += 1,
        }
    }

    pub fn get(&self, category: NeedCategory) -> usize {
        match category {
            NeedCategory::Red => self.red,
            NeedCategory::Yellow => self.yellow,
            NeedCategory::Green => self.green,
        }
    }

    pub fn total(&self) -> usize {
        self.red + self.yellow + self.green
    }

    /// Rounded share of the total for one category; 0 when nothing was counted.
    pub fn percent(&self, category: NeedCategory) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((self.get(category) as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Reduction of a record subset along one score axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub axis: ScoreAxis,
    pub count: usize,
    pub mean_score: f64,
    pub distribution: NeedDistribution,
}

pub fn aggregate<'a, I>(records: I, axis: ScoreAxis) -> AggregateResult
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let mut count = 0;
    let mut distribution = NeedDistribution::default();
    let mut sum = 0.0;
    let mut valid = 0usize;

    for record in records {
        count += 1;
        let score = record.score(axis);
        if let Some(value) = score {
            sum += value;
            valid += 1;
        }
        distribution.add(NeedCategory::classify(score.unwrap_or(f64::NAN)));
    }

    let mean_score = if valid == 0 { 0.0 } else { sum / valid as f64 };

    AggregateResult {
        axis,
        count,
        mean_score,
        distribution,
    }
}

/// Aggregate every axis, in [`ScoreAxis::ordered`] order.
pub fn aggregate_all<'a, I>(records: I) -> Vec<AggregateResult>
where
    I: IntoIterator<Item = &'a FacilityRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();
    ScoreAxis::ordered()
        .into_iter()
        .map(|axis| aggregate(records.clone(), axis))
        .collect()
}

/// Mean of the axis score over records carrying a finite number; 0 if none do.
pub fn mean_score<'a, I>(records: I, axis: ScoreAxis) -> f64
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    aggregate(records, axis).mean_score
}

/// Percentage of records whose `field` reads as "yes"; 0 for an empty input.
pub fn truthy_percent<'a, I>(records: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let (total, truthy) = records.into_iter().fold((0usize, 0usize), |(total, truthy), record| {
        (total + 1, truthy + usize::from(record.is_truthy(field)))
    });
    if total == 0 {
        return 0.0;
    }
    truthy as f64 / total as f64 * 100.0
}

/// Sum of the lenient numeric reading of `field`; unparseable values add 0.
pub fn metric_sum<'a, I>(records: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    records
        .into_iter()
        .map(|record| record.lenient_number(field).unwrap_or(0.0))
        .sum()
}

/// Mean of the lenient numeric reading of `field` over all records, with
/// unparseable values counted as 0.
pub fn metric_mean<'a, I>(records: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let (total, sum) = records.into_iter().fold((0usize, 0.0), |(total, sum), record| {
        (total + 1, sum + record.lenient_number(field).unwrap_or(0.0))
    });
    if total == 0 {
        return 0.0;
    }
    sum / total as f64
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a 0..1 score as a whole percentage (`0.566` -> `"57%"`).
pub fn format_percent(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::domain::Domain;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<FacilityRecord> {
        values
            .into_iter()
            .map(|value| FacilityRecord::from_value(Domain::Hospital, value).expect("object"))
            .collect()
    }

    #[test]
    fn empty_input_saturates_to_zero() {
        let empty: Vec<FacilityRecord> = Vec::new();
        let result = aggregate(&empty, ScoreAxis::Resources);
        assert_eq!(result.count, 0);
        assert_eq!(result.mean_score, 0.0);
        assert_eq!(result.distribution, NeedDistribution::default());
        assert_eq!(result.distribution.percent(NeedCategory::Red), 0);
    }

    #[test]
    fn invalid_scores_are_excluded_from_mean_but_counted_red() {
        let rows = records(vec![
            json!({ "infrastructure_score": 0.8 }),
            json!({ "infrastructure_score": "n/a" }),
            json!({ "infrastructure_score": null }),
            json!({}),
            json!({ "infrastructure_score": 0.4 }),
        ]);
        let result = aggregate(&rows, ScoreAxis::Infrastructure);
        assert_eq!(result.count, 5);
        assert!((result.mean_score - 0.6).abs() < 1e-9);
        assert_eq!(result.distribution.red, 3);
        assert_eq!(result.distribution.yellow, 1);
        assert_eq!(result.distribution.green, 1);
        assert_eq!(result.distribution.total(), rows.len());
    }

    #[test]
    fn all_invalid_scores_give_zero_mean_not_nan() {
        let rows = records(vec![json!({ "population_score": "x" }), json!({})]);
        let result = aggregate(&rows, ScoreAxis::Population);
        assert_eq!(result.mean_score, 0.0);
        assert_eq!(result.distribution.red, 2);
    }

    #[test]
    fn truthy_percent_counts_yes_forms_over_all_records() {
        let rows = records(vec![
            json!({ "has_fence": true }),
            json!({ "has_fence": "No" }),
            json!({ "has_fence": 1 }),
            json!({}),
        ]);
        assert_eq!(truthy_percent(&rows, "has_fence"), 50.0);
        let empty: Vec<FacilityRecord> = Vec::new();
        assert_eq!(truthy_percent(&empty, "has_fence"), 0.0);
    }

    #[test]
    fn metric_reductions_treat_unparseable_as_zero() {
        let rows = records(vec![
            json!({ "floors": 4 }),
            json!({ "floors": "2" }),
            json!({ "floors": "unknown" }),
            json!({ "floors": true }),
        ]);
        assert_eq!(metric_sum(&rows, "floors"), 6.0);
        assert_eq!(metric_mean(&rows, "floors"), 1.5);
        let empty: Vec<FacilityRecord> = Vec::new();
        assert_eq!(metric_mean(&empty, "floors"), 0.0);
    }

    #[test]
    fn distribution_percentages_round() {
        let mut distribution = NeedDistribution::default();
        distribution.add(NeedCategory::Red);
        distribution.add(NeedCategory::Green);
        distribution.add(NeedCategory::Green);
        assert_eq!(distribution.percent(NeedCategory::Red), 33);
        assert_eq!(distribution.percent(NeedCategory::Green), 67);
        assert_eq!(distribution.percent(NeedCategory::Yellow), 0);
    }

    #[test]
    fn aggregate_all_follows_axis_order() {
        let rows = records(vec![json!({
            "infrastructure_score": 0.1,
            "population_score": 0.5,
            "resources_score": 0.9,
        })]);
        let results = aggregate_all(&rows);
        let axes: Vec<ScoreAxis> = results.iter().map(|result| result.axis).collect();
        assert_eq!(axes, ScoreAxis::ordered().to_vec());
        assert_eq!(results[2].distribution.green, 1);
    }

    #[test]
    fn display_helpers_round() {
        assert_eq!(round2(0.456), 0.46);
        assert_eq!(format_percent(0.566), "57%");
        assert_eq!(format_percent(0.0), "0%");
    }
}
