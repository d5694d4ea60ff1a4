//! Optional RON config file, overridden by command-line flags.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::LogDestination;
use reelgrab_core::OutputFormat;
use reelgrab_engine::ClientSettings;
use serde::{Deserialize, Serialize};

use super::cli::Cli;

const DEFAULT_CONFIG_FILENAME: &str = "reelgrab.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: Option<String>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `explicit` if given (it must exist), else `./reelgrab.ron` if present.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: ClientSettings,
    pub output_dir: PathBuf,
    pub log: LogDestination,
}

/// Flags win over the file; the file wins over built-in defaults.
pub fn resolve(cli: &Cli, file: AppConfig) -> anyhow::Result<Resolved> {
    let mut settings = match cli.server.as_deref().or(file.server.as_deref()) {
        Some(server) => ClientSettings::for_server(server)
            .with_context(|| format!("invalid server url {server:?}"))?,
        None => ClientSettings::default(),
    };

    if let Some(format) = cli.format.map(OutputFormat::from).or(file.format) {
        settings.preselected_format = format;
    }
    if let Some(ms) = cli.poll_ms.or(file.poll_interval_ms) {
        anyhow::ensure!(ms > 0, "poll interval must be positive");
        settings.poll_interval = Duration::from_millis(ms);
    }
    if let Some(secs) = file.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.download_timeout_secs {
        settings.download_timeout = Duration::from_secs(secs);
    }

    let output_dir = cli
        .output
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let log = match cli.log.clone().or(file.log_file) {
        Some(path) => LogDestination::File(path),
        None => LogDestination::Terminal,
    };

    Ok(Resolved {
        settings,
        output_dir,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["reelgrab"];
        argv.extend_from_slice(args);
        argv.push("https://www.instagram.com/p/abc/");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_partial_ron() {
        let config = AppConfig::parse(
            r#"(server: Some("http://media.local:5000"), format: Some(mp3), poll_interval_ms: Some(250))"#,
        )
        .unwrap();
        assert_eq!(config.server.as_deref(), Some("http://media.local:5000"));
        assert_eq!(config.format, Some(OutputFormat::Mp3));
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn flags_override_file() {
        let file = AppConfig {
            server: Some("http://file.local/".into()),
            format: Some(OutputFormat::Mp3),
            poll_interval_ms: Some(250),
            output_dir: Some(PathBuf::from("from-file")),
            ..AppConfig::default()
        };
        let resolved = resolve(
            &cli(&["--server", "http://flag.local/api", "--format", "mp4"]),
            file,
        )
        .unwrap();

        assert_eq!(resolved.settings.base_url.as_str(), "http://flag.local/api/");
        assert_eq!(resolved.settings.preselected_format, OutputFormat::Mp4);
        assert_eq!(resolved.settings.poll_interval, Duration::from_millis(250));
        assert_eq!(resolved.output_dir, PathBuf::from("from-file"));
        assert_eq!(resolved.log, LogDestination::Terminal);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(resolve(&cli(&["--poll-ms", "0"]), AppConfig::default()).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.ron"))).is_err());

        let path = dir.path().join("reelgrab.ron");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "(log_file: Some(\"grab.log\"))").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("grab.log")));
    }
}
