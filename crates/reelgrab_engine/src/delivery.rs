use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use reelgrab_core::{Artifact, OrchestrationError, OutputFormat};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<DeliveryError> for OrchestrationError {
    fn from(err: DeliveryError) -> Self {
        OrchestrationError::delivery(err.to_string())
    }
}

/// What a save action is handed: a staged copy of the payload that only lives
/// for the duration of the call.
#[derive(Debug)]
pub struct StagedArtifact<'a> {
    pub path: &'a Path,
    pub suggested_name: &'a str,
    pub format: OutputFormat,
    pub len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The user declined to save.
    Cancelled,
}

/// The user-facing "save as" step.
pub trait SaveAction: Send + Sync {
    fn save(&self, staged: &StagedArtifact<'_>) -> Result<SaveOutcome, DeliveryError>;
}

/// Stages artifacts in a scoped temporary file and hands them to a [`SaveAction`].
#[derive(Debug, Clone, Default)]
pub struct ArtifactDelivery {
    staging_dir: Option<PathBuf>,
}

impl ArtifactDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage in `dir` instead of the system temp directory.
    pub fn with_staging_dir(dir: PathBuf) -> Self {
        Self {
            staging_dir: Some(dir),
        }
    }

    /// The staged file is removed when this returns, whatever the save action did.
    pub fn deliver(
        &self,
        artifact: &Artifact,
        action: &dyn SaveAction,
    ) -> Result<SaveOutcome, DeliveryError> {
        let mut staged = match &self.staging_dir {
            Some(dir) => {
                ensure_output_dir(dir)?;
                NamedTempFile::new_in(dir)?
            }
            None => NamedTempFile::new()?,
        };
        staged.write_all(&artifact.payload)?;
        staged.flush()?;

        let outcome = action.save(&StagedArtifact {
            path: staged.path(),
            suggested_name: &artifact.suggested_name,
            format: artifact.format,
            len: artifact.payload.len() as u64,
        });

        if let Err(err) = staged.close() {
            engine_warn!("Failed to release staged artifact: {}", err);
        }
        outcome
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DeliveryError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DeliveryError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Saves into a fixed directory as `{suggested_name}.{ext}`, adding `-1`, `-2`, ...
/// rather than replacing an existing file. The copy lands atomically.
#[derive(Debug, Clone)]
pub struct DirectorySaveAction {
    dir: PathBuf,
}

impl DirectorySaveAction {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn target_for(&self, staged: &StagedArtifact<'_>, attempt: u32) -> PathBuf {
        let ext = staged.format.extension();
        let name = if attempt == 0 {
            format!("{}.{ext}", staged.suggested_name)
        } else {
            format!("{}-{attempt}.{ext}", staged.suggested_name)
        };
        self.dir.join(name)
    }
}

impl SaveAction for DirectorySaveAction {
    fn save(&self, staged: &StagedArtifact<'_>) -> Result<SaveOutcome, DeliveryError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        io::copy(&mut fs::File::open(staged.path)?, tmp.as_file_mut())?;
        tmp.as_file_mut().sync_all()?;

        let mut attempt = 0;
        loop {
            let target = self.target_for(staged, attempt);
            match tmp.persist_noclobber(&target) {
                Ok(_) => {
                    engine_info!("Saved {} bytes to {:?}", staged.len, target);
                    return Ok(SaveOutcome::Saved(target));
                }
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                    attempt += 1;
                }
                Err(err) => return Err(DeliveryError::Io(err.error)),
            }
        }
    }
}
