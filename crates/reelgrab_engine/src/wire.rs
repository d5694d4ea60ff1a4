//! JSON bodies exchanged with the conversion service.
use reelgrab_core::{ContentMetadata, OutputFormat, UNKNOWN};
use serde::{Deserialize, Serialize};

const UNTITLED: &str = "Sin título";

#[derive(Debug, Serialize)]
pub(crate) struct MetadataRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobRequest<'a> {
    pub url: &'a str,
    pub format: OutputFormat,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// Any field may be missing or null; the service fills gaps inconsistently.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MetadataResponse {
    title: Option<String>,
    uploader: Option<String>,
    upload_date: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    comment_count: Option<u64>,
    is_video: Option<bool>,
    description: Option<String>,
    thumbnail: Option<String>,
}

impl From<MetadataResponse> for ContentMetadata {
    fn from(raw: MetadataResponse) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            uploader: raw.uploader.unwrap_or_else(|| UNKNOWN.to_string()),
            upload_date: raw.upload_date.unwrap_or_else(|| UNKNOWN.to_string()),
            duration_seconds: raw
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 1.0)
                .map(|secs| secs.floor() as u64),
            view_count: raw.view_count.unwrap_or(0),
            like_count: raw.like_count.unwrap_or(0),
            comment_count: raw.comment_count.unwrap_or(0),
            is_video: raw.is_video.unwrap_or(false),
            description: raw.description,
            thumbnail: raw.thumbnail,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressResponse {
    pub progress: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ContentMetadata {
        serde_json::from_str::<MetadataResponse>(json).unwrap().into()
    }

    #[test]
    fn full_body_maps_every_field() {
        let meta = parse(
            r#"{"title":"Sunset","uploader":"ana","upload_date":"20230115","duration":125,
                "view_count":1234567,"like_count":3,"comment_count":1,"is_video":true,
                "description":"d","thumbnail":"https://cdn/x.jpg"}"#,
        );
        assert_eq!(meta.title, "Sunset");
        assert_eq!(meta.duration_seconds, Some(125));
        assert_eq!(meta.view_count, 1234567);
        assert!(meta.is_video);
        assert_eq!(meta.thumbnail.as_deref(), Some("https://cdn/x.jpg"));
    }

    #[test]
    fn nulls_and_gaps_fall_back() {
        let meta = parse(r#"{"title":null,"duration":0,"view_count":null}"#);
        assert_eq!(meta.title, UNTITLED);
        assert_eq!(meta.uploader, UNKNOWN);
        assert_eq!(meta.upload_date, UNKNOWN);
        assert_eq!(meta.duration_seconds, None);
        assert_eq!(meta.view_count, 0);
        assert!(!meta.is_video);
    }

    #[test]
    fn fractional_duration_is_truncated() {
        assert_eq!(parse(r#"{"duration":59.8}"#).duration_seconds, Some(59));
    }

    #[test]
    fn job_request_uses_wire_format_names() {
        let body = serde_json::to_value(JobRequest {
            url: "u",
            format: OutputFormat::Mp3,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"url": "u", "format": "mp3"}));
    }
}
