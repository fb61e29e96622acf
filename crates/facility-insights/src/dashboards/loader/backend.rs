use serde_json::Value;

use super::csv_file::CsvDatasetSource;
use super::http::HttpDatasetSource;
use super::source::{DatasetSource, LoadFailure, LoadRequest};
use crate::config::BackendConfig;

/// Source chosen at startup from configuration: CSV exports when a dataset
/// directory is configured, the survey backend otherwise.
#[derive(Debug, Clone)]
pub enum BackendSource {
    Http(HttpDatasetSource),
    Csv(CsvDatasetSource),
}

impl BackendSource {
    pub fn from_config(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        match &config.dataset_dir {
            Some(dir) => Ok(Self::Csv(CsvDatasetSource::new(dir.clone()))),
            None => HttpDatasetSource::new(config.base_url.clone(), config.timeout).map(Self::Http),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(source) => source.base_url().to_string(),
            Self::Csv(source) => source.dir().display().to_string(),
        }
    }
}

impl DatasetSource for BackendSource {
    async fn fetch(&self, request: &LoadRequest) -> Result<Value, LoadFailure> {
        match self {
            Self::Http(source) => source.fetch(request).await,
            Self::Csv(source) => source.fetch(request).await,
        }
    }
}
