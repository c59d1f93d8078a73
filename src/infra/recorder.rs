use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::SpeechConfig;
use crate::services::{AudioCaptureService, AudioSample, SpeechError};

const SAMPLE_RATE: u32 = 16_000;
const FRAME: Duration = Duration::from_millis(30);
const MIN_THRESHOLD: f64 = 300.0;
const AMBIENT_MARGIN: f64 = 1.5;
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// Captures microphone audio through an external SoX-compatible recorder.
pub struct SoxRecorder {
    program: String,
    calibration: Duration,
    threshold: Mutex<f64>,
}

impl SoxRecorder {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            program: config.recorder.clone(),
            calibration: config.calibration,
            threshold: Mutex::new(MIN_THRESHOLD),
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
            .lock()
            .map(|guard| *guard)
            .unwrap_or(MIN_THRESHOLD)
    }

    async fn record(&self, duration: Duration) -> Result<Vec<u8>, SpeechError> {
        let mut command = Command::new(&self.program);
        command
            .args(["-q", "-t", "raw", "-r"])
            .arg(SAMPLE_RATE.to_string())
            .args(["-b", "16", "-c", "1", "-e", "signed-integer", "-", "trim", "0"])
            .arg(format!("{:.2}", duration.as_secs_f64()))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(duration + EXIT_GRACE, command.output()).await {
            Ok(result) => result.map_err(|err| {
                SpeechError::ServiceUnavailable(format!("cannot start {}: {err}", self.program))
            })?,
            Err(_) => {
                tracing::debug!(program = %self.program, "recorder overran its window");
                return Ok(Vec::new());
            }
        };

        if !output.status.success() {
            return Err(SpeechError::ServiceUnavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl AudioCaptureService for SoxRecorder {
    async fn calibrate(&self) -> Result<(), SpeechError> {
        let ambient = self.record(self.calibration).await?;
        let threshold = speech_threshold(&ambient);
        tracing::debug!(threshold, "calibrated for ambient noise");
        if let Ok(mut guard) = self.threshold.lock() {
            *guard = threshold;
        }
        Ok(())
    }

    async fn listen(&self, timeout: Duration) -> Result<Option<AudioSample>, SpeechError> {
        let pcm = self.record(timeout).await?;
        if !contains_speech(&pcm, self.threshold()) {
            return Ok(None);
        }
        Ok(Some(AudioSample {
            pcm,
            sample_rate: SAMPLE_RATE,
        }))
    }
}

fn frame_energies(pcm: &[u8]) -> Vec<f64> {
    let samples_per_frame = (SAMPLE_RATE as usize * FRAME.as_millis() as usize) / 1000;
    pcm.chunks(samples_per_frame * 2)
        .map(|frame| {
            let samples = frame
                .chunks_exact(2)
                .map(|pair| f64::from(i16::from_le_bytes([pair[0], pair[1]])))
                .collect::<Vec<_>>();
            if samples.is_empty() {
                return 0.0;
            }
            let mean_square = samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64;
            mean_square.sqrt()
        })
        .collect()
}

/// Energy a frame must exceed to count as speech over this ambient sample.
fn speech_threshold(ambient: &[u8]) -> f64 {
    let loudest = frame_energies(ambient).into_iter().fold(0.0, f64::max);
    (loudest * AMBIENT_MARGIN).max(MIN_THRESHOLD)
}

fn contains_speech(pcm: &[u8], threshold: f64) -> bool {
    frame_energies(pcm).into_iter().any(|energy| energy > threshold)
}
