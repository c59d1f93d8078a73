pub mod issue_tracker;
pub mod settings_store;
pub mod speech;

pub use issue_tracker::{IssueTrackerService, TrackerError, TrackerResult};
pub use settings_store::SettingsStore;
pub use speech::{AudioCaptureService, AudioSample, SpeechError, TranscriptionService};
