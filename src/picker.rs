use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::AppResult;
use crate::security::InputValidator;
use crate::uploader::UploadFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct PickedFiles {
    pub accepted: Vec<UploadFile>,
    pub rejected: Vec<RejectedFile>,
}

/// Turns user-selected paths into an upload batch.
///
/// No limit on the number of files; each one is checked against the size
/// ceiling and the accepted document types.
#[derive(Debug, Clone)]
pub struct FilePicker {
    max_file_size_mb: u64,
    accepted_extensions: Vec<String>,
}

impl FilePicker {
    pub fn new(max_file_size_mb: u64, accepted_extensions: Vec<String>) -> Self {
        Self {
            max_file_size_mb,
            accepted_extensions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_file_size_mb, config.accepted_extensions.clone())
    }

    pub async fn pick(&self, paths: &[PathBuf]) -> PickedFiles {
        let mut picked = PickedFiles::default();

        for path in paths {
            match self.load(path).await {
                Ok(file) => picked.accepted.push(file),
                Err(e) => {
                    if e.is_permanent() {
                        log::warn!("Skipping {}: {}", path.display(), e);
                    } else {
                        log::error!("Failed to read {}: {}", path.display(), e);
                    }
                    picked.rejected.push(RejectedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Picked {} files ({} rejected)",
            picked.accepted.len(),
            picked.rejected.len()
        );
        picked
    }

    async fn load(&self, path: &Path) -> AppResult<UploadFile> {
        let path_str = path.to_string_lossy();
        InputValidator::validate_document_file(
            &path_str,
            self.max_file_size_mb,
            &self.accepted_extensions,
        )?;

        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(UploadFile::new(name, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pick_splits_accepted_and_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.md");
        let image = dir.path().join("photo.png");
        let big = dir.path().join("big.txt");
        std::fs::write(&notes, "# notes").unwrap();
        std::fs::write(&image, [0u8; 4]).unwrap();
        std::fs::write(&big, vec![b'x'; 1024 * 1024 + 1]).unwrap();
        let missing = dir.path().join("missing.pdf");

        let picker = FilePicker::new(1, vec!["md".to_string(), "txt".to_string()]);
        let picked = picker
            .pick(&[notes, image.clone(), big.clone(), missing.clone()])
            .await;

        assert_eq!(picked.accepted.len(), 1);
        assert_eq!(picked.accepted[0].name, "notes.md");
        assert_eq!(&picked.accepted[0].content[..], b"# notes");

        let rejected: Vec<&PathBuf> = picked.rejected.iter().map(|r| &r.path).collect();
        assert_eq!(rejected, vec![&image, &big, &missing]);
        assert!(picked.rejected[1].reason.contains("File too large"));
    }

    #[tokio::test]
    async fn test_pick_empty_selection() {
        let picker = FilePicker::from_config(&Config::default());
        let picked = picker.pick(&[]).await;
        assert!(picked.accepted.is_empty());
        assert!(picked.rejected.is_empty());
    }
}
