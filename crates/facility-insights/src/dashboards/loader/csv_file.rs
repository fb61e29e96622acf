use std::future::Future;
use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use tracing::debug;

use super::source::{DatasetSource, LoadFailure, LoadRequest};
use crate::dashboards::domain::Domain;

/// Serves datasets from `{dir}/{domain}.csv` exports, for offline use and
/// demos. Pre-filters behave like the survey backend: case-insensitive
/// substring matches on `region`, `district` and the entity name.
#[derive(Debug, Clone)]
pub struct CsvDatasetSource {
    dir: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, domain: Domain) -> PathBuf {
        self.dir.join(format!("{}.csv", domain.slug()))
    }
}

impl DatasetSource for CsvDatasetSource {
    fn fetch(
        &self,
        request: &LoadRequest,
    ) -> impl Future<Output = Result<Value, LoadFailure>> + Send {
        let path = self.path_for(request.domain);
        let request = request.clone();

        async move {
            debug!(path = %path.display(), "reading dataset export");
            let raw = tokio::fs::read(&path)
                .await
                .map_err(|err| LoadFailure::Network(format!("{}: {err}", path.display())))?;
            let rows = parse_rows(&path, raw.as_slice())?;
            let rows = rows
                .into_iter()
                .filter(|row| prefilter_matches(&request, row))
                .map(Value::Object)
                .collect();
            Ok(Value::Array(rows))
        }
    }
}

fn parse_rows(path: &Path, raw: &[u8]) -> Result<Vec<Map<String, Value>>, LoadFailure> {
    let malformed = |err: csv::Error| LoadFailure::Backend(format!("{}: {err}", path.display()));

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(raw);
    let headers = reader.headers().map_err(malformed)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), infer_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Type a CSV cell the way a dataframe export would: empty and NaN cells are
/// null, `True`/`False` are booleans, numerals are numbers.
fn infer_cell(cell: &str) -> Value {
    match cell {
        "" => return Value::Null,
        "True" | "true" | "TRUE" => return Value::Bool(true),
        "False" | "false" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(integer) = cell.parse::<i64>() {
        return Value::Number(integer.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(cell.to_string())
}

fn prefilter_matches(request: &LoadRequest, row: &Map<String, Value>) -> bool {
    let name_field = request.domain.entity_name_field();
    [
        ("region", request.region.as_deref()),
        ("district", request.district.as_deref()),
        (name_field, request.entity_name.as_deref()),
    ]
    .into_iter()
    .all(|(field, needle)| match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(needle) => row
            .get(field)
            .map(cell_text)
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
