// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One unit of pipeline work as reported by the job service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub job_id: u64,
    pub task_name: String,
    pub created: String,
    pub pipeline_state: PipelineState,
    #[serde(default)]
    pub result_path: Option<String>,
}

/// The nested status object the service reports for each job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineState {
    #[serde(default)]
    pub last_activity_time: Option<String>,
    #[serde(default)]
    pub progress: Progress,
    pub state: JobState,
    #[serde(default)]
    pub exception: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Success,
    Failure,
    /// Anything that is not terminal yet (PENDING, RUNNING, STARTED, ...).
    Other(String),
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SUCCESS" => JobState::Success,
            "FAILURE" => JobState::Failure,
            _ => JobState::Other(value),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Success => write!(f, "SUCCESS"),
            JobState::Failure => write!(f, "FAILURE"),
            JobState::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Row classification used for styling and for deciding which action a row offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowClass {
    Success,
    Danger,
    Info,
}

impl RowClass {
    pub fn css(&self) -> &'static str {
        match self {
            RowClass::Success => "success",
            RowClass::Danger => "danger",
            RowClass::Info => "info",
        }
    }
}

impl JobState {
    pub fn row_class(&self) -> RowClass {
        match self {
            JobState::Success => RowClass::Success,
            JobState::Failure => RowClass::Danger,
            JobState::Other(_) => RowClass::Info,
        }
    }
}

/// Completion percentage. The service sends either a number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn clamped(&self) -> Self {
        Self(self.0.clamp(0.0, 100.0))
    }
}

impl Progress {
    /// Reads the leading number of `text` the way a browser's `parseFloat` does:
    /// `"42.5"` and `"42%"` give 42.5 and 42, text with no leading number gives NaN.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim_start();
        let candidate: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
            .collect();

        let value = (1..=candidate.len())
            .rev()
            .find_map(|end| candidate[..end].parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        Self(value)
    }

    /// False when the service sent something that is not a number.
    pub fn is_known(&self) -> bool {
        !self.0.is_nan()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self(f64::NAN)
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(serde_json::Value),
        }

        let progress = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Progress(n),
            Raw::Text(s) => Progress::from_text(&s),
            Raw::Other(_) => Progress::default(),
        };
        if !progress.is_known() {
            log::warn!("Job reported a non-numeric progress value, showing it as NaN");
        }
        Ok(progress)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display already drops a trailing ".0" (50.0 -> "50")
        write!(f, "{}", self.0)
    }
}

/// An immutable view of the job list as of one successful poll.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub jobs: Vec<JobRecord>,
    pub fetched_at: DateTime<Utc>,
    pub sequence: u64,
}

impl JobSnapshot {
    pub fn new(jobs: Vec<JobRecord>, sequence: u64) -> Self {
        Self {
            jobs,
            fetched_at: Utc::now(),
            sequence,
        }
    }
}

/// Data behind a result chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResultPayload {
    #[serde(default)]
    pub data: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint", into = "[f64; 2]")]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair([f64; 2]),
    Object { x: f64, y: f64 },
}

impl From<RawPoint> for ScatterPoint {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair([x, y]) => ScatterPoint { x, y },
            RawPoint::Object { x, y } => ScatterPoint { x, y },
        }
    }
}

impl From<ScatterPoint> for [f64; 2] {
    fn from(point: ScatterPoint) -> Self {
        [point.x, point.y]
    }
}
