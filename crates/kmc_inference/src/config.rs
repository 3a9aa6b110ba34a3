use std::time::Duration;

use kmc_core::{Error, Result};
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const API_BASE_ENV: &str = "KMC_API_BASE";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the prediction service, already checked by `with_api_base`.
    pub api_base: String,
    /// Model identifier to show when the service does not report one.
    pub model_hint: Option<String>,
    /// No timeout unless set; slow NIfTI requests are left to run.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model_hint: None,
            timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::default().with_api_base(&base),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        let url = Url::parse(base.trim())
            .map_err(|e| Error::Config(format!("invalid API base '{}': {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("API base '{}' cannot carry a path", base)));
        }
        self.api_base = url.to_string();
        Ok(self)
    }

    pub fn with_model_hint(mut self, hint: Option<String>) -> Self {
        self.model_hint = hint.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends an endpoint path to the base, keeping any base path prefix.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let base = self.api_base.trim_end_matches('/');
        let joined = format!("{}/{}", base, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| Error::Config(format!("invalid endpoint URL '{}': {}", joined, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_service() {
        let config = Config::default();
        assert_eq!(config.endpoint_url("/predict").unwrap().as_str(), "http://127.0.0.1:8000/predict");
        assert!(config.timeout.is_none());
        assert!(config.model_hint.is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = Config::default().with_api_base("https://kmc.example.org/api/").unwrap();
        assert_eq!(
            config.endpoint_url("/predict_from_nii").unwrap().as_str(),
            "https://kmc.example.org/api/predict_from_nii"
        );
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let result = Config::default().with_api_base("not a url");
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Config::default().with_api_base("mailto:someone@example.org");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_base_from_env() {
        // The only test in this crate that touches the variable
        std::env::set_var(API_BASE_ENV, "http://10.1.2.3:9000");
        let config = Config::from_env();
        std::env::remove_var(API_BASE_ENV);
        assert_eq!(
            config.unwrap().endpoint_url("/predict").unwrap().as_str(),
            "http://10.1.2.3:9000/predict"
        );
        assert_eq!(Config::from_env().unwrap().api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_blank_model_hint_is_dropped() {
        let config = Config::default().with_model_hint(Some("  ".to_string()));
        assert!(config.model_hint.is_none());
    }
}
