use std::sync::Arc;
use std::time::Duration;

use crate::config::{InputMode, RetryPolicy};
use crate::error::AppResult;
use crate::prompt::Console;
use crate::services::{AudioCaptureService, SpeechError, TranscriptionService};

/// Turns speech or typing into an answer the user has confirmed.
pub struct InputCollector {
    audio: Arc<dyn AudioCaptureService>,
    transcriber: Arc<dyn TranscriptionService>,
    retry: RetryPolicy,
    listen_timeout: Duration,
}

impl InputCollector {
    pub fn new(
        audio: Arc<dyn AudioCaptureService>,
        transcriber: Arc<dyn TranscriptionService>,
        retry: RetryPolicy,
        listen_timeout: Duration,
    ) -> Self {
        Self {
            audio,
            transcriber,
            retry,
            listen_timeout,
        }
    }

    pub async fn collect(
        &self,
        console: &mut dyn Console,
        prompt: &str,
        mode: InputMode,
    ) -> AppResult<String> {
        match mode {
            InputMode::Manual => {
                let typed = console.ask(&format!("{prompt} "))?;
                confirm_answer(console, typed)
            }
            InputMode::Voice => self.collect_voice(console, prompt).await,
        }
    }

    async fn collect_voice(&self, console: &mut dyn Console, prompt: &str) -> AppResult<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            if !self.retry.allows(attempt) {
                tracing::info!(prompt, "voice attempts exhausted, switching to typed input");
                console.say("Too many attempts. Let's type it instead.");
                return type_fallback(console, prompt);
            }

            match self.hear(console, prompt).await {
                Ok(transcript) => return confirm_answer(console, transcript),
                Err(SpeechError::Unintelligible) => {
                    console.say("Could not understand. Please try again.");
                }
                Err(SpeechError::ServiceUnavailable(reason)) => {
                    tracing::warn!(%reason, "speech service unavailable, switching to typed input");
                    console.say("Voice recognition is unavailable right now.");
                    return type_fallback(console, prompt);
                }
            }
        }
    }

    async fn hear(&self, console: &mut dyn Console, prompt: &str) -> Result<String, SpeechError> {
        self.audio.calibrate().await?;
        console.say(prompt);
        match self.audio.listen(self.listen_timeout).await? {
            Some(sample) => self.transcriber.transcribe(&sample).await,
            None => Err(SpeechError::Unintelligible),
        }
    }
}

fn type_fallback(console: &mut dyn Console, prompt: &str) -> AppResult<String> {
    let typed = console.ask(&format!("{prompt} (type your answer): "))?;
    confirm_answer(console, capitalize_first(&typed))
}

/// The draft is never final until the user accepts it or types a replacement.
fn confirm_answer(console: &mut dyn Console, draft: String) -> AppResult<String> {
    console.say(&format!("Heard: {draft}"));
    if console.confirm("Is this correct? (y/n): ")? {
        Ok(draft)
    } else {
        console.ask("Please type the correct text: ")
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
