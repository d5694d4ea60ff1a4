use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Name handed to the save action for every artifact.
pub const SUGGESTED_NAME: &str = "instagram-content";

/// Sentinel the service uses for missing uploader and date values.
pub const UNKNOWN: &str = "Desconocido";

/// Output formats the conversion service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mp3,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Mp4, OutputFormat::Mp3];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mp3 => "mp3",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format {0:?}")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub url: String,
    pub format: OutputFormat,
}

/// Metadata for one remote item, as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub title: String,
    pub uploader: String,
    /// `YYYYMMDD` or [`UNKNOWN`].
    pub upload_date: String,
    /// `None` when the service did not report a (non-zero) duration.
    pub duration_seconds: Option<u64>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_video: bool,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct JobProgress {
    percent: u8,
}

impl JobProgress {
    pub const COMPLETE: JobProgress = JobProgress { percent: 100 };

    /// Builds a progress value from whatever the server reported, clamped to `0..=100`.
    pub fn clamped(raw: i64) -> Self {
        Self {
            percent: raw.clamp(0, 100) as u8,
        }
    }

    pub fn percent(self) -> u8 {
        self.percent
    }

    pub fn is_complete(self) -> bool {
        self.percent >= 100
    }
}

/// Binary result of a finished job. Consumed by delivery, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub payload: Bytes,
    pub suggested_name: String,
    pub format: OutputFormat,
}

impl Artifact {
    pub fn new(payload: impl Into<Bytes>, format: OutputFormat) -> Self {
        Self {
            payload: payload.into(),
            suggested_name: SUGGESTED_NAME.to_string(),
            format,
        }
    }
}
