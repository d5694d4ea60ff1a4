//! Human-readable rendering of content metadata (es-ES conventions).
use chrono::NaiveDate;

use crate::types::{ContentMetadata, UNKNOWN};

/// `YYYYMMDD` -> `DD/MM/YYYY`. The unknown sentinel and empty input render as the sentinel;
/// anything else that is not a calendar date is shown as received.
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() || raw == UNKNOWN {
        return UNKNOWN.to_string();
    }
    parse_compact_date(raw)
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_compact_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw[0..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `M:SS`, minutes unbounded.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Groups thousands with `.`. Four-digit values stay ungrouped, as es-ES does.
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 4 {
        return digits;
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataView {
    pub title: String,
    pub uploader: String,
    pub date: String,
    pub duration: Option<String>,
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub show_format_selector: bool,
}

impl MetadataView {
    /// Labelled rows in display order. Duration is omitted when unknown.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        let mut lines = vec![
            ("Título", self.title.as_str()),
            ("Autor", self.uploader.as_str()),
            ("Fecha", self.date.as_str()),
        ];
        if let Some(duration) = &self.duration {
            lines.push(("Duración", duration.as_str()));
        }
        lines.push(("Vistas", self.views.as_str()));
        lines.push(("Me gusta", self.likes.as_str()));
        lines.push(("Comentarios", self.comments.as_str()));
        lines
    }
}

impl From<&ContentMetadata> for MetadataView {
    fn from(meta: &ContentMetadata) -> Self {
        Self {
            title: meta.title.clone(),
            uploader: meta.uploader.clone(),
            date: format_date(&meta.upload_date),
            duration: meta.duration_seconds.map(format_duration),
            views: format_number(meta.view_count),
            likes: format_number(meta.like_count),
            comments: format_number(meta.comment_count),
            show_format_selector: meta.is_video,
        }
    }
}
