use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use kmc_core::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::config::Config;
use crate::request::InferenceRequest;

/// Status and body text of whatever the service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PredictionService: Send + Sync + fmt::Debug {
    /// Sends one request. Only transport failures are errors here; any HTTP
    /// status comes back as a `ServiceResponse`.
    async fn send(&self, request: &InferenceRequest) -> Result<ServiceResponse>;
}

pub struct HttpPredictionService {
    client: Arc<Client>,
    config: Config,
}

impl HttpPredictionService {
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    fn build_form(request: &InferenceRequest) -> Result<Form> {
        let mut form = Form::new();
        for part in &request.parts {
            let file = Part::bytes(part.bytes.clone())
                .file_name(part.file_name.clone())
                .mime_str(part.content_type)
                .map_err(|e| Error::Network(format!("invalid content type for '{}': {}", part.field, e)))?;
            form = form.part(part.field, file);
        }
        Ok(form)
    }
}

impl fmt::Debug for HttpPredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPredictionService")
            .field("client", &"<reqwest::Client>")
            .field("api_base", &self.config.api_base)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn send(&self, request: &InferenceRequest) -> Result<ServiceResponse> {
        let url = self.config.endpoint_url(request.endpoint_path())?;
        let form = Self::build_form(request)?;

        tracing::info!("Sending {} file(s) to {}", request.parts.len(), url);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| Error::Network(e.to_string()))?;
        tracing::debug!("Service answered {} with {} bytes", status, body.len());

        Ok(ServiceResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Endpoint, FormPart};

    #[test]
    fn test_success_range() {
        let ok = ServiceResponse { status: 200, body: String::new() };
        let created = ServiceResponse { status: 201, body: String::new() };
        let error = ServiceResponse { status: 500, body: "internal error".to_string() };
        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!error.is_success());
    }

    #[test]
    fn test_debug_does_not_dump_client() {
        let service = HttpPredictionService::new(Config::default()).unwrap();
        let debug = format!("{:?}", service);
        assert!(debug.contains("127.0.0.1:8000"));
        assert!(debug.contains("<reqwest::Client>"));
    }

    #[test]
    fn test_form_accepts_every_part() {
        let request = InferenceRequest {
            endpoint: Endpoint::PredictFromNii,
            parts: vec![
                FormPart {
                    field: "image",
                    file_name: "t1.nii.gz".to_string(),
                    content_type: "application/gzip",
                    bytes: vec![1, 2, 3],
                },
                FormPart {
                    field: "mask",
                    file_name: "mask.nii".to_string(),
                    content_type: "application/octet-stream",
                    bytes: vec![4, 5, 6],
                },
            ],
        };
        assert!(HttpPredictionService::build_form(&request).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_network_error() {
        // Grab a free port and release it so nothing is listening there
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let config = Config::default().with_api_base(&format!("http://127.0.0.1:{}", port)).unwrap();
        let service = HttpPredictionService::new(config).unwrap();
        let request = InferenceRequest {
            endpoint: Endpoint::Predict,
            parts: vec![FormPart {
                field: "file",
                file_name: "features.txt".to_string(),
                content_type: "text/plain",
                bytes: b"a=1".to_vec(),
            }],
        };

        let result = service.send(&request).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
