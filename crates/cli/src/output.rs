// Output formatting for CLI

use anyhow::Result;
use jobpoll::StatusResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Summary of one poll
#[derive(Debug, Serialize)]
pub struct PollReport<'a> {
    pub base_url: &'a str,
    #[serde(flatten)]
    pub result: &'a StatusResult,
    pub updates: &'a [String],
}

impl PollReport<'_> {
    /// Render the report in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(format!("Final Status: {}", self.result)),
        }
    }
}

/// Line printed for every status update in text mode
pub fn update_line(status: &str) -> String {
    format!("Status Updated: {}", status)
}
