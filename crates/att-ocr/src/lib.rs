//! Timetable import from photos via an external OCR service.
//!
//! The service is reached through [`TextRecognizer`], so the parsing in
//! [`parse_timetable_text`] never sees a provider-specific response shape.
//! [`OcrSpaceClient`] is the adapter for the OCR.space HTTP API.

mod parse;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use att_core::Day;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

pub use parse::{parse_timetable_text, title_case};

/// Default request timeout for OCR calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LANGUAGE: &str = "eng";
const OCR_SPACE_API_URL: &str = "https://api.ocr.space/parse/image";

/// OCR errors.
///
/// None of these are fatal to the tracker; callers report them as warnings.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service reported a processing error.
    #[error("OCR service error: {message}")]
    Service { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The service answered but recognized no text.
    #[error("OCR returned no text; try a clearer image")]
    EmptyText,
    /// The requested group/section marker does not occur in the text.
    #[error("could not find section '{section}' in the recognized text")]
    SectionNotFound { section: String },
}

/// Anything that can turn an image into text.
pub trait TextRecognizer {
    /// Recognizes the text in `image`. `file_name` carries the image format.
    fn recognize_text(
        &self,
        image: &[u8],
        file_name: &str,
    ) -> impl Future<Output = Result<String, OcrError>> + Send;
}

/// Recognizes `image` and parses it into a schedule for `days`.
pub async fn extract_timetable<R: TextRecognizer + Sync>(
    recognizer: &R,
    image: &[u8],
    file_name: &str,
    section: Option<&str>,
    days: &[Day],
) -> Result<(String, BTreeMap<Day, Vec<String>>), OcrError> {
    let text = recognizer.recognize_text(image, file_name).await?;
    let schedule = parse_timetable_text(&text, section, days)?;
    Ok((text, schedule))
}

/// OCR.space API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct OcrSpaceClient {
    http: reqwest::Client,
    api_key: String,
    language: String,
}

impl fmt::Debug for OcrSpaceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrSpaceClient")
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl OcrSpaceClient {
    /// Creates a new client with the given API key and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, OcrError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(OcrError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(OcrError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OcrError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Sets the language hint sent with each request.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl TextRecognizer for OcrSpaceClient {
    async fn recognize_text(&self, image: &[u8], file_name: &str) -> Result<String, OcrError> {
        let form = Form::new()
            .part(
                "file",
                Part::bytes(image.to_vec()).file_name(file_name.to_string()),
            )
            .text("language", self.language.clone());

        tracing::debug!(bytes = image.len(), file_name, "sending image to OCR service");
        let response = self
            .http
            .post(OCR_SPACE_API_URL)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OcrError::Service {
                message: format!("status {status}: {body}"),
            });
        }
        interpret_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParseResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// The service sends either a single message or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn first(self) -> Option<String> {
        match self {
            Self::One(message) => Some(message),
            Self::Many(messages) => messages.into_iter().next(),
        }
    }
}

/// Extracts the first result's text from an OCR.space response body.
fn interpret_response(body: &str) -> Result<String, OcrError> {
    let payload: ParseResponse =
        serde_json::from_str(body).map_err(|err| OcrError::InvalidResponse(err.to_string()))?;

    if payload.is_errored_on_processing {
        let message = payload
            .error_message
            .and_then(ErrorMessage::first)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(OcrError::Service { message });
    }

    let text = payload
        .parsed_results
        .into_iter()
        .next()
        .map(|result| result.parsed_text)
        .ok_or_else(|| OcrError::InvalidResponse("missing parsed results".to_string()))?;
    if text.trim().is_empty() {
        return Err(OcrError::EmptyText);
    }
    Ok(text)
}
