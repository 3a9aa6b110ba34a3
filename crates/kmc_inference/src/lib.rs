pub mod client;
pub mod config;
pub mod exporter;
pub mod normalizer;
pub mod request;
pub mod service;
pub mod validator;

pub use client::InferenceClient;
pub use config::Config;
pub use exporter::{export, import, ExportArtifact};
pub use normalizer::{normalize, RawResponse};
pub use request::{build_request, Endpoint, InferenceRequest};
pub use service::{HttpPredictionService, PredictionService, ServiceResponse};
pub use validator::{validate, ValidatedSelection};

pub mod prelude {
    pub use super::{Config, InferenceClient};
    pub use kmc_core::{Error, ErrorInfo, InferenceResult, InputSelection, RequestState, Result, SelectedFile};
}
