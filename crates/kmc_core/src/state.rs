use crate::error::{Error, ErrorInfo, Result};
use crate::types::InferenceResult;

/// Lifecycle of a single submission.
///
/// `Submitting` is only entered from a settled state, so at most one request
/// is ever in flight for the cell that holds this value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
    Succeeded(InferenceResult),
    Failed(ErrorInfo),
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting)
    }

    pub fn result(&self) -> Option<&InferenceResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failed(info) => Some(info),
            _ => None,
        }
    }

    /// Moves to `Submitting`, clearing any previous result or error.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(Error::AlreadySubmitting);
        }
        *self = RequestState::Submitting;
        Ok(())
    }

    /// Settles an in-flight submission with its outcome.
    pub fn finish(&mut self, outcome: &Result<InferenceResult>) {
        *self = match outcome {
            Ok(result) => RequestState::Succeeded(result.clone()),
            Err(err) => RequestState::Failed(ErrorInfo::from(err)),
        };
    }

    /// Records a failure that happened before anything was sent.
    pub fn fail(&mut self, err: &Error) -> Result<()> {
        if self.is_submitting() {
            return Err(Error::AlreadySubmitting);
        }
        *self = RequestState::Failed(ErrorInfo::from(err));
        Ok(())
    }

    /// New file selection. In-flight requests are never cancelled, so this
    /// is refused while submitting.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(Error::AlreadySubmitting);
        }
        *self = RequestState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::BTreeMap;

    fn sample_result() -> InferenceResult {
        InferenceResult {
            predicted_label: "N/A".to_string(),
            class_probabilities: BTreeMap::new(),
            model_identifier: "radiomics_elasticnet_logreg".to_string(),
            raw_class_code: None,
        }
    }

    #[test]
    fn test_request_state_flow() {
        let mut state = RequestState::default();
        assert_eq!(state, RequestState::Idle);

        state.begin().unwrap();
        assert!(state.is_submitting());

        // A second submission is rejected and leaves the cell alone
        assert!(matches!(state.begin(), Err(Error::AlreadySubmitting)));
        assert!(state.is_submitting());

        state.finish(&Ok(sample_result()));
        assert_eq!(state.result(), Some(&sample_result()));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut state = RequestState::default();
        state.begin().unwrap();
        state.finish(&Err(Error::service(500, "internal error")));

        let info = state.error().unwrap();
        assert_eq!(info.kind, ErrorKind::Service);
        assert_eq!(info.message, "internal error");

        // Retrying clears the old error
        state.begin().unwrap();
        assert!(state.error().is_none());
        assert!(state.is_submitting());
    }

    #[test]
    fn test_reset_clears_result_but_not_in_flight() {
        let mut state = RequestState::Succeeded(sample_result());
        state.reset().unwrap();
        assert_eq!(state, RequestState::Idle);

        state.begin().unwrap();
        assert!(state.reset().is_err());
        assert!(state.is_submitting());
    }

    #[test]
    fn test_fail_before_sending() {
        let mut state = RequestState::Succeeded(sample_result());
        state
            .fail(&Error::MissingFile(crate::types::InputSlot::FeatureFile))
            .unwrap();
        assert_eq!(state.error().unwrap().kind, ErrorKind::MissingFile);
        assert!(state.result().is_none());
    }
}
