use std::time::Duration;

use reelgrab_core::OutputFormat;
use url::Url;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000/";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the conversion service; endpoint paths are joined onto it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Applies to the metadata and progress queries.
    pub request_timeout: Duration,
    /// Applies to the job request, which stays open for the whole conversion.
    pub download_timeout: Duration,
    pub poll_interval: Duration,
    pub max_artifact_bytes: u64,
    /// Format the selector starts on for video content.
    pub preselected_format: OutputFormat,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(1),
            max_artifact_bytes: 2 * 1024 * 1024 * 1024,
            preselected_format: OutputFormat::default(),
        }
    }
}

impl ClientSettings {
    /// Settings pointing at `server`. A trailing slash is added so relative joins keep the path.
    pub fn for_server(server: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: normalize_base(server)?,
            ..Self::default()
        })
    }
}

pub(crate) fn normalize_base(server: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(server)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_SERVER).expect("default server url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keeps_subpath() {
        let settings = ClientSettings::for_server("http://host:8080/grab").unwrap();
        assert_eq!(settings.base_url.as_str(), "http://host:8080/grab/");
        assert_eq!(
            settings.base_url.join("progress").unwrap().as_str(),
            "http://host:8080/grab/progress"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(ClientSettings::for_server("not a url").is_err());
    }
}
