//! Client for the generative edit service.
//!
//! `MockEditService` keeps the app usable with no endpoint configured;
//! `HttpEditService` (feature `edit-http`) does the real multipart POST.

use thiserror::Error;

#[cfg(feature = "edit-http")]
use super::settings::EditServiceSettings;
use super::types::EditOutcome;
#[cfg(feature = "edit-http")]
use super::types::ProcessImageResponse;

#[derive(Debug, Error)]
pub enum EditServiceError {
    /// Missing or invalid service configuration. Fatal, not retryable.
    #[error("edit service not configured: {0}")]
    Configuration(String),
    /// The HTTP call itself failed. Surfaced immediately, never auto-retried.
    #[error("edit service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with an error status or `success: false`.
    #[error("{0}")]
    Service(String),
}

pub trait EditService: Send + Sync {
    fn process(
        &self,
        image: &[u8],
        mime: &str,
        instructions: &str,
    ) -> Result<EditOutcome, EditServiceError>;
}

/// A placeholder service that performs no network calls. It allows wiring
/// the UI and commands without an endpoint or credentials; it never
/// produces an image, so the session stays untouched.
pub struct MockEditService;

impl EditService for MockEditService {
    fn process(
        &self,
        image: &[u8],
        _mime: &str,
        _instructions: &str,
    ) -> Result<EditOutcome, EditServiceError> {
        Ok(EditOutcome::TextOnly {
            text: Some("Offline mode: no edit service configured.".into()),
            original_size: image.len() as u64,
        })
    }
}

#[cfg(feature = "edit-http")]
#[derive(Debug)]
pub struct HttpEditService {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "edit-http")]
impl HttpEditService {
    pub fn from_settings(settings: &EditServiceSettings) -> Result<Self, EditServiceError> {
        let endpoint = settings.endpoint.trim();
        if endpoint.is_empty() {
            return Err(EditServiceError::Configuration("endpoint is empty".into()));
        }
        url::Url::parse(endpoint)
            .map_err(|err| EditServiceError::Configuration(format!("bad endpoint: {}", err)))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: settings.api_key.clone(),
            client,
        })
    }
}

#[cfg(feature = "edit-http")]
impl EditService for HttpEditService {
    fn process(
        &self,
        image: &[u8],
        mime: &str,
        instructions: &str,
    ) -> Result<EditOutcome, EditServiceError> {
        use reqwest::blocking::multipart::{Form, Part};

        let part = Part::bytes(image.to_vec())
            .file_name("image")
            .mime_str(mime)
            .map_err(|err| EditServiceError::Configuration(format!("bad mime type: {}", err)))?;
        let form = Form::new()
            .part("image", part)
            .text("instructions", instructions.to_string());

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }
        let resp = request.send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            // Prefer the service's own error detail when the body carries one.
            let detail = serde_json::from_str::<ProcessImageResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(EditServiceError::Service(detail));
        }

        match serde_json::from_str::<ProcessImageResponse>(&body) {
            Ok(parsed) if parsed.success => Ok(parsed.into()),
            Ok(parsed) => Err(EditServiceError::Service(
                parsed.error.unwrap_or_else(|| "edit service reported failure".into()),
            )),
            // Malformed body on a 2xx counts as "no image produced".
            Err(_) => Ok(EditOutcome::TextOnly {
                text: None,
                original_size: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_service_never_produces_an_image() {
        let outcome = MockEditService
            .process(&[1, 2, 3], "image/png", "add a hat")
            .expect("mock process");
        match outcome {
            EditOutcome::TextOnly { text, original_size } => {
                assert!(text.unwrap().contains("Offline mode"));
                assert_eq!(original_size, 3);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[cfg(feature = "edit-http")]
    mod http {
        use super::super::*;
        use httpmock::prelude::*;
        use serde_json::json;

        fn service(url: String) -> HttpEditService {
            HttpEditService::from_settings(&EditServiceSettings {
                endpoint: url,
                api_key: None,
                timeout_secs: 5,
            })
            .expect("build service")
        }

        #[test]
        fn empty_endpoint_is_a_configuration_error() {
            let err = HttpEditService::from_settings(&EditServiceSettings::default()).unwrap_err();
            assert!(matches!(err, EditServiceError::Configuration(_)));
        }

        #[test]
        fn garbage_endpoint_is_a_configuration_error() {
            let err = HttpEditService::from_settings(&EditServiceSettings {
                endpoint: "not a url".into(),
                api_key: None,
                timeout_secs: 5,
            })
            .unwrap_err();
            assert!(matches!(err, EditServiceError::Configuration(_)));
        }

        #[test]
        fn success_with_image_maps_to_image_produced() {
            let server = MockServer::start();
            let mock = server.mock(|when, then| {
                when.method(POST).path("/api/process-image");
                then.status(200).json_body(json!({
                    "success": true,
                    "message": "ok",
                    "originalImageSize": 42,
                    "instructions": "add a hat",
                    "responseText": "hat added",
                    "generatedImage": "data:image/png;base64,AA=="
                }));
            });

            let outcome = service(server.url("/api/process-image"))
                .process(&[0u8; 42], "image/png", "add a hat")
                .expect("process");
            mock.assert();
            assert_eq!(
                outcome,
                EditOutcome::ImageProduced {
                    image_ref: "data:image/png;base64,AA==".into(),
                    text: Some("hat added".into()),
                    original_size: 42,
                }
            );
        }

        #[test]
        fn success_without_image_maps_to_text_only() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/edit");
                then.status(200).json_body(json!({
                    "success": true,
                    "originalImageSize": 7,
                    "responseText": "nothing to change"
                }));
            });

            let outcome = service(server.url("/edit"))
                .process(&[0u8; 7], "image/png", "do nothing")
                .expect("process");
            assert_eq!(
                outcome,
                EditOutcome::TextOnly {
                    text: Some("nothing to change".into()),
                    original_size: 7,
                }
            );
        }

        #[test]
        fn http_400_surfaces_the_service_error_detail() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/edit");
                then.status(400)
                    .json_body(json!({"success": false, "error": "No instructions provided"}));
            });

            let err = service(server.url("/edit"))
                .process(&[1], "image/png", "")
                .unwrap_err();
            match err {
                EditServiceError::Service(detail) => {
                    assert_eq!(detail, "No instructions provided")
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn http_500_without_body_detail_reports_the_status() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/edit");
                then.status(500).body("upstream exploded");
            });

            let err = service(server.url("/edit"))
                .process(&[1], "image/png", "x")
                .unwrap_err();
            match err {
                EditServiceError::Service(detail) => assert!(detail.contains("500")),
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn success_false_on_2xx_is_a_service_error() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/edit");
                then.status(200)
                    .json_body(json!({"success": false, "error": "model refused"}));
            });

            let err = service(server.url("/edit"))
                .process(&[1], "image/png", "x")
                .unwrap_err();
            assert!(matches!(err, EditServiceError::Service(d) if d == "model refused"));
        }

        #[test]
        fn malformed_2xx_body_counts_as_no_image_produced() {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/edit");
                then.status(200).body("<html>not json</html>");
            });

            let outcome = service(server.url("/edit"))
                .process(&[1], "image/png", "x")
                .expect("process");
            assert_eq!(
                outcome,
                EditOutcome::TextOnly {
                    text: None,
                    original_size: 0,
                }
            );
        }
    }
}
