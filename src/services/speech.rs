use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech was not understood")]
    Unintelligible,
    #[error("speech service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Raw mono 16-bit little-endian PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
}

#[async_trait]
pub trait AudioCaptureService: Send + Sync {
    /// Samples ambient noise so the following listen can tell speech apart.
    async fn calibrate(&self) -> Result<(), SpeechError>;
    /// Records one utterance. `Ok(None)` means nothing was said before `timeout`.
    async fn listen(&self, timeout: Duration) -> Result<Option<AudioSample>, SpeechError>;
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, audio: &AudioSample) -> Result<String, SpeechError>;
}
