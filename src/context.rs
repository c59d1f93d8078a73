use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{AudioCaptureService, IssueTrackerService, TranscriptionService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub audio: Arc<dyn AudioCaptureService>,
    pub transcriber: Arc<dyn TranscriptionService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        issue_tracker: Arc<dyn IssueTrackerService>,
        audio: Arc<dyn AudioCaptureService>,
        transcriber: Arc<dyn TranscriptionService>,
    ) -> Self {
        Self {
            config,
            issue_tracker,
            audio,
            transcriber,
        }
    }
}
