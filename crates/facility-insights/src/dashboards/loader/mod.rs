//! Dataset loading: where facility payloads come from and how they are
//! validated before they may replace the current snapshot.

mod backend;
mod csv_file;
mod http;
mod retry;
mod source;

pub use backend::BackendSource;
pub use csv_file::CsvDatasetSource;
pub use http::HttpDatasetSource;
pub use retry::RetryPolicy;
pub use source::{decode_payload, DatasetSource, LoadFailure, LoadFailureKind, LoadRequest};
