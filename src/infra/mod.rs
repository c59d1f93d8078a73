pub mod google_speech;
pub mod jira;
pub mod recorder;
pub mod settings_file;
