use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kmc_core::{Error, InferenceResult, InputSelection, RequestState, Result};

use crate::config::Config;
use crate::normalizer::{normalize, RawResponse};
use crate::request::{build_request, InferenceRequest};
use crate::service::{HttpPredictionService, PredictionService};
use crate::validator::{inspect_feature_file, validate, ValidatedSelection, EXPECTED_FEATURE_COUNT};

/// Owns the request lifecycle. One request may be in flight per client;
/// the `RequestState` cell is only ever written from here.
#[derive(Clone)]
pub struct InferenceClient {
    service: Arc<dyn PredictionService>,
    state: Arc<Mutex<RequestState>>,
    model_hint: Option<String>,
}

impl fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceClient")
            .field("service", &self.service)
            .field("state", &*self.lock_state())
            .field("model_hint", &self.model_hint)
            .finish()
    }
}

impl InferenceClient {
    pub fn new(config: Config) -> Result<Self> {
        let model_hint = config.model_hint.clone();
        let service = Arc::new(HttpPredictionService::new(config)?);
        Ok(Self::with_service(service, model_hint))
    }

    pub fn with_service(service: Arc<dyn PredictionService>, model_hint: Option<String>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(RequestState::Idle)),
            model_hint,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RequestState {
        self.lock_state().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock_state().is_submitting()
    }

    /// Called on a new file selection: drops the previous result or error.
    pub fn reset(&self) -> Result<()> {
        self.lock_state().reset()
    }

    /// Validates the selection and, if it holds up, submits it. A selection
    /// that fails validation never reaches the network.
    pub async fn submit_selection(&self, selection: &InputSelection) -> Result<InferenceResult> {
        let request = {
            let mut state = self.lock_state();
            if state.is_submitting() {
                tracing::warn!("Ignoring submission while another request is in flight");
                return Err(Error::AlreadySubmitting);
            }
            match validate(selection) {
                Ok(validated) => {
                    preview(&validated);
                    state.begin()?;
                    build_request(&validated)
                }
                Err(err) => {
                    tracing::info!("Selection rejected: {}", err);
                    state.fail(&err)?;
                    return Err(err);
                }
            }
        };

        self.run(request).await
    }

    /// Submits a prebuilt request.
    pub async fn submit(&self, request: InferenceRequest) -> Result<InferenceResult> {
        if let Err(err) = self.lock_state().begin() {
            tracing::warn!("Ignoring submission while another request is in flight");
            return Err(err);
        }
        self.run(request).await
    }

    /// Must only be called after the state moved to `Submitting`.
    async fn run(&self, request: InferenceRequest) -> Result<InferenceResult> {
        let guard = InFlight { state: &self.state, settled: false };
        let outcome = self.dispatch(&request).await;
        guard.settle(&outcome);
        outcome
    }

    async fn dispatch(&self, request: &InferenceRequest) -> Result<InferenceResult> {
        let response = self.service.send(request).await?;

        if !response.is_success() {
            tracing::warn!("{} failed with status {}", request.endpoint, response.status);
            return Err(Error::service(response.status, &response.body));
        }

        let value: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!("Response from {} is not valid JSON: {}", request.endpoint, e);
            Error::Parse(e.to_string())
        })?;

        let result = normalize(&RawResponse::from(value), self.model_hint.as_deref());
        tracing::info!("Prediction: {} ({})", result.predicted_label, result.model_identifier);
        Ok(result)
    }
}

/// Settles the state cell when a submission ends. If the submitting future
/// is dropped first, the request is abandoned and the cell goes back to
/// `Idle`.
struct InFlight<'a> {
    state: &'a Mutex<RequestState>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: &Result<InferenceResult>) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).finish(outcome);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.is_submitting() {
                tracing::debug!("Submission abandoned before completion");
                *state = RequestState::Idle;
            }
        }
    }
}

fn preview(selection: &ValidatedSelection<'_>) {
    if let ValidatedSelection::FeatureFile(file) = selection {
        let summary = inspect_feature_file(file);
        if !summary.looks_complete() {
            tracing::warn!(
                "{} has {} key=value entries (expected {}) and {} malformed line(s); sending anyway",
                file.name,
                summary.entries,
                EXPECTED_FEATURE_COUNT,
                summary.malformed_lines
            );
        }
    }
}
