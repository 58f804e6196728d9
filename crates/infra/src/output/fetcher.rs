//! Streams job output artifacts to disk or to a caller-supplied writer

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pingintel_domain::{OutputArtifact, PingError, Result};
use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::errors::InfraError;

/// What to do when the destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    #[default]
    Always,
    Skip,
}

/// Where a downloaded artifact goes
pub enum DownloadTarget<'w> {
    /// Always receives the bytes, dry mode included.
    Writer(&'w mut dyn Write),
    /// Exact file path.
    Path(PathBuf),
    /// The artifact's own filename inside this directory.
    Directory(PathBuf),
    /// The artifact's own filename in the working directory.
    Default,
}

/// Outcome of one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub filename: String,
    /// File written, `None` for writers and dry runs.
    pub path: Option<PathBuf>,
    pub bytes: u64,
    /// The destination existed and the policy said to keep it.
    pub skipped: bool,
}

/// Downloads [`OutputArtifact`]s through an [`ApiClient`]
pub struct OutputFetcher<'c> {
    client: &'c ApiClient,
    actually_write: bool,
    overwrite: OverwritePolicy,
}

impl<'c> OutputFetcher<'c> {
    pub fn new(client: &'c ApiClient) -> Self {
        Self { client, actually_write: true, overwrite: OverwritePolicy::Always }
    }

    /// With `false`, file targets are downloaded in full but nothing is
    /// written to disk.
    pub fn actually_write(mut self, actually_write: bool) -> Self {
        self.actually_write = actually_write;
        self
    }

    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// File path a file target resolves to.
    ///
    /// # Errors
    /// `Validation` when the artifact has no usable filename.
    pub fn target_path(artifact: &OutputArtifact, directory: Option<&Path>) -> Result<PathBuf> {
        let name = Path::new(&artifact.filename)
            .file_name()
            .ok_or_else(|| {
                PingError::Validation(format!("Output {} has no filename", artifact.url))
            })?
            .to_owned();
        Ok(match directory {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        })
    }

    /// Download one artifact.
    pub fn fetch(
        &self,
        artifact: &OutputArtifact,
        target: DownloadTarget<'_>,
    ) -> Result<DownloadReport> {
        let path = match target {
            DownloadTarget::Writer(writer) => {
                let bytes = self.stream(artifact, writer)?;
                return Ok(self.report(artifact, None, bytes));
            }
            DownloadTarget::Path(path) => path,
            DownloadTarget::Directory(dir) => Self::target_path(artifact, Some(&dir))?,
            DownloadTarget::Default => Self::target_path(artifact, None)?,
        };

        if !self.actually_write {
            let bytes = self.stream(artifact, &mut io::sink())?;
            return Ok(self.report(artifact, None, bytes));
        }

        if path.exists() && self.overwrite == OverwritePolicy::Skip {
            info!(path = %path.display(), "Keeping existing file");
            return Ok(DownloadReport {
                filename: artifact.filename.clone(),
                path: Some(path),
                bytes: 0,
                skipped: true,
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&path)?;
        let bytes = self.stream(artifact, &mut file)?;
        file.flush()?;
        info!(
            description = %artifact.description,
            path = %path.display(),
            bytes,
            "Downloaded output"
        );
        Ok(self.report(artifact, Some(path), bytes))
    }

    /// Download every artifact into `directory` (working directory if `None`).
    pub fn fetch_all(
        &self,
        artifacts: &[OutputArtifact],
        directory: Option<&Path>,
    ) -> Result<Vec<DownloadReport>> {
        artifacts
            .iter()
            .map(|artifact| {
                let target = match directory {
                    Some(dir) => DownloadTarget::Directory(dir.to_path_buf()),
                    None => DownloadTarget::Default,
                };
                self.fetch(artifact, target)
            })
            .collect()
    }

    fn stream(&self, artifact: &OutputArtifact, writer: &mut dyn Write) -> Result<u64> {
        debug!(url = %artifact.url, "Requesting output");
        let mut response = self.client.download(&artifact.url)?;

        let size_mb = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(|len| len as f64 / 1024.0 / 1024.0)
            .unwrap_or_default();
        info!(
            description = %artifact.description,
            size_mb = %format!("{size_mb:.2}"),
            "Streaming output"
        );

        response.copy_to(writer).map_err(|err| PingError::from(InfraError::from(err)))
    }

    fn report(
        &self,
        artifact: &OutputArtifact,
        path: Option<PathBuf>,
        bytes: u64,
    ) -> DownloadReport {
        DownloadReport { filename: artifact.filename.clone(), path, bytes, skipped: false }
    }
}
