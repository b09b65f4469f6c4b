// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to decode JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream request to {url} failed with status {status}: {body}")]
    Upstream { url: String, status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Job {0} is not in the current table")]
    UnknownJob(u64),

    #[error("Action '{control}' is not available for job {job_id}")]
    ActionUnavailable { job_id: u64, control: String },

    #[error("Job {0} has no result path")]
    NoResult(u64),

    #[error("Chart is not ready to receive data")]
    ChartNotReady,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
