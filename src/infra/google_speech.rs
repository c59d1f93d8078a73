use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;
use crate::services::{AudioSample, SpeechError, TranscriptionService};

const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Google Cloud Speech-to-Text over its REST API.
pub struct GoogleSpeechClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    language: String,
}

impl GoogleSpeechClient {
    pub fn new(config: &SpeechConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl TranscriptionService for GoogleSpeechClient {
    async fn transcribe(&self, audio: &AudioSample) -> Result<String, SpeechError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SpeechError::ServiceUnavailable("speech API key not configured".to_string())
        })?;

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: audio.sample_rate,
                language_code: &self.language,
            },
            audio: RecognitionAudio {
                content: BASE64_STANDARD.encode(&audio.pcm),
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                SpeechError::ServiceUnavailable(format!("failed to call speech service: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::ServiceUnavailable(format!(
                "speech service responded with {status}"
            )));
        }

        let payload: RecognizeResponse = response.json().await.map_err(|err| {
            SpeechError::ServiceUnavailable(format!("failed to parse speech response: {err}"))
        })?;

        payload
            .results
            .into_iter()
            .flat_map(|result| result.alternatives.into_iter().take(1))
            .map(|alternative| alternative.transcript.trim().to_string())
            .find(|transcript| !transcript.is_empty())
            .ok_or(SpeechError::Unintelligible)
    }
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}
