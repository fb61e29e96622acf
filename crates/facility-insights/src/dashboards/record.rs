use super::domain::{Domain, NeedCategory, ScoreAxis};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;

/// One hospital, school, or preschool as reported by the survey backend.
///
/// The record keeps the raw field map so domain-specific attributes survive
/// untouched; the pipeline only reads the handful of fields it needs through
/// the accessors below.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    domain: Domain,
    fields: Map<String, Value>,
}

impl FacilityRecord {
    pub fn new(domain: Domain, fields: Map<String, Value>) -> Self {
        Self { domain, fields }
    }

    /// Build a record from a JSON value, rejecting anything but an object.
    pub fn from_value(domain: Domain, value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(domain, fields)),
            _ => None,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Scalar field as text. Dataframe exports type numeric names and
    /// district codes as numbers, so those read as their decimal form.
    pub fn label(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.get(field)? {
            Value::String(raw) => Some(Cow::Borrowed(raw.as_str())),
            Value::Number(number) => Some(Cow::Owned(number_text(number))),
            Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
            _ => None,
        }
    }

    pub fn entity_name(&self) -> Option<Cow<'_, str>> {
        self.label(self.domain.entity_name_field())
    }

    pub fn district(&self) -> Option<Cow<'_, str>> {
        self.label("district")
    }

    pub fn region(&self) -> Option<Cow<'_, str>> {
        self.label("region")
    }

    /// Finite JSON number stored under `field`. Strings, booleans and nulls
    /// are not numbers here.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field)
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
    }

    pub fn score(&self, axis: ScoreAxis) -> Option<f64> {
        self.number(axis.score_field())
    }

    /// Category for one axis; records without a usable score are `Red`.
    pub fn category(&self, axis: ScoreAxis) -> NeedCategory {
        NeedCategory::classify(self.score(axis).unwrap_or(f64::NAN))
    }

    /// Category reported by the backend in `need_category`, if recognizable.
    pub fn reported_need(&self) -> Option<NeedCategory> {
        self.text("need_category").and_then(NeedCategory::from_label)
    }

    /// Lenient numeric read used by chart series: numbers as-is, strings by
    /// their leading numeric prefix, everything else unparseable.
    pub fn lenient_number(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
            Value::String(raw) => parse_leading_float(raw),
            _ => None,
        }
    }

    /// Whether a boolean-like field reads as "yes".
    pub fn is_truthy(&self, field: &str) -> bool {
        match self.get(field) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(raw)) => matches!(raw.as_str(), "Yes" | "yes" | "1"),
            Some(Value::Number(number)) => number.as_f64() == Some(1.0),
            _ => false,
        }
    }

    /// Latitude/longitude pair when both are present and non-zero.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.number("latitude").filter(|value| *value != 0.0)?;
        let longitude = self.number("longitude").filter(|value| *value != 0.0)?;
        Some((latitude, longitude))
    }

    /// Table cell text: numbers to two decimals, booleans as Yes/No, and a
    /// dash for missing values.
    pub fn display(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::Number(number)) => match number.as_f64() {
                Some(value) => format!("{value:.2}"),
                None => number.to_string(),
            },
            Some(Value::Bool(true)) => "Yes".to_string(),
            Some(Value::Bool(false)) => "No".to_string(),
            Some(Value::String(raw)) => raw.clone(),
            Some(other) => other.to_string(),
            None => "-".to_string(),
        }
    }
}

impl Serialize for FacilityRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

/// `5` and `5.0` both read as "5".
fn number_text(number: &Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    if let Some(integer) = number.as_u64() {
        return integer.to_string();
    }
    match number.as_f64() {
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

fn parse_leading_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(byte) = bytes.get(end) {
        match byte {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    end += exponent_len(&bytes[end..]);
    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Length of an `e`/`E` exponent at the start of `rest`, or 0 when the
/// exponent has no digits.
fn exponent_len(rest: &[u8]) -> usize {
    if !matches!(rest.first(), Some(b'e') | Some(b'E')) {
        return 0;
    }
    let mut len = 1;
    if matches!(rest.get(len), Some(b'+') | Some(b'-')) {
        len += 1;
    }
    let digits = rest[len..].iter().take_while(|byte| byte.is_ascii_digit()).count();
    if digits == 0 {
        0
    } else {
        len + digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FacilityRecord {
        FacilityRecord::from_value(Domain::Hospital, value).expect("object record")
    }

    #[test]
    fn accessors_read_domain_name_field() {
        let hospital = record(json!({
            "hospital_name": "Central",
            "district": "North",
            "region": "Samarkand",
        }));
        assert_eq!(hospital.entity_name().as_deref(), Some("Central"));
        assert_eq!(hospital.district().as_deref(), Some("North"));
        assert_eq!(hospital.region().as_deref(), Some("Samarkand"));

        let school = FacilityRecord::from_value(Domain::School, json!({ "hospital_name": "x" }))
            .expect("object record");
        assert_eq!(school.entity_name(), None);
    }

    #[test]
    fn numeric_keys_read_as_text() {
        let school = FacilityRecord::from_value(
            Domain::School,
            json!({ "school_name": 5, "district": 12.0, "region": true, "extra": [1] }),
        )
        .expect("object record");
        assert_eq!(school.entity_name().as_deref(), Some("5"));
        assert_eq!(school.district().as_deref(), Some("12"));
        assert_eq!(school.region().as_deref(), Some("true"));
        assert_eq!(school.label("extra"), None);

        let fractional = FacilityRecord::from_value(Domain::School, json!({ "district": 3.5 }))
            .expect("object record");
        assert_eq!(fractional.district().as_deref(), Some("3.5"));
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(FacilityRecord::from_value(Domain::School, json!([1, 2])).is_none());
        assert!(FacilityRecord::from_value(Domain::School, json!("row")).is_none());
    }

    #[test]
    fn scores_must_be_json_numbers() {
        let valid = record(json!({ "infrastructure_score": 0.55 }));
        assert_eq!(valid.score(ScoreAxis::Infrastructure), Some(0.55));
        assert_eq!(valid.category(ScoreAxis::Infrastructure), NeedCategory::Yellow);

        let text = record(json!({ "infrastructure_score": "0.9" }));
        assert_eq!(text.score(ScoreAxis::Infrastructure), None);
        assert_eq!(text.category(ScoreAxis::Infrastructure), NeedCategory::Red);

        let missing = record(json!({ "population_score": null }));
        assert_eq!(missing.category(ScoreAxis::Population), NeedCategory::Red);
    }

    #[test]
    fn truthiness_accepts_only_the_yes_forms() {
        let row = record(json!({
            "a": true, "b": "Yes", "c": "yes", "d": 1, "e": "1", "f": 1.0,
            "g": false, "h": 0, "i": "No", "j": null, "k": "YES", "l": 2,
        }));
        for field in ["a", "b", "c", "d", "e", "f"] {
            assert!(row.is_truthy(field), "{field} should be truthy");
        }
        for field in ["g", "h", "i", "j", "k", "l", "absent"] {
            assert!(!row.is_truthy(field), "{field} should not be truthy");
        }
    }

    #[test]
    fn lenient_numbers_follow_prefix_parsing() {
        let row = record(json!({
            "floors": 3,
            "area": "120.5 m2",
            "condition": "good",
            "safe": true,
            "neg": "-2",
        }));
        assert_eq!(row.lenient_number("floors"), Some(3.0));
        assert_eq!(row.lenient_number("area"), Some(120.5));
        assert_eq!(row.lenient_number("neg"), Some(-2.0));
        assert_eq!(row.lenient_number("condition"), None);
        assert_eq!(row.lenient_number("safe"), None);
        assert_eq!(row.lenient_number("absent"), None);
    }

    #[test]
    fn lenient_numbers_accept_exponents() {
        let row = record(json!({
            "plain": "1e3",
            "signed": "2.5E-1 units",
            "dangling": "3e",
            "dangling_sign": "4e+",
            "letters": "7ex",
        }));
        assert_eq!(row.lenient_number("plain"), Some(1000.0));
        assert_eq!(row.lenient_number("signed"), Some(0.25));
        assert_eq!(row.lenient_number("dangling"), Some(3.0));
        assert_eq!(row.lenient_number("dangling_sign"), Some(4.0));
        assert_eq!(row.lenient_number("letters"), Some(7.0));
    }

    #[test]
    fn display_formats_table_cells() {
        let row = record(json!({
            "beds": 12, "ratio": 0.456, "safe": false, "wall": "brick", "none": null,
        }));
        assert_eq!(row.display("beds"), "12.00");
        assert_eq!(row.display("ratio"), "0.46");
        assert_eq!(row.display("safe"), "No");
        assert_eq!(row.display("wall"), "brick");
        assert_eq!(row.display("none"), "-");
    }

    #[test]
    fn coordinates_require_both_non_zero() {
        assert_eq!(
            record(json!({ "latitude": 39.6, "longitude": 66.9 })).coordinates(),
            Some((39.6, 66.9))
        );
        assert_eq!(record(json!({ "latitude": 0, "longitude": 66.9 })).coordinates(), None);
        assert_eq!(record(json!({ "latitude": 39.6 })).coordinates(), None);
    }

    #[test]
    fn serializes_as_the_raw_field_map() {
        let row = record(json!({ "hospital_name": "Central", "beds": 4 }));
        let encoded = serde_json::to_value(&row).expect("serializes");
        assert_eq!(encoded, json!({ "hospital_name": "Central", "beds": 4 }));
    }
}
