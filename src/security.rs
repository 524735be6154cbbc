use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};

const BYTES_PER_MB: u64 = 1024 * 1024;

fn unsafe_filename_chars() -> &'static Regex {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("filename pattern is valid")
    })
}

pub struct InputValidator;

impl InputValidator {
    pub fn validate_file_path(path: &str) -> AppResult<()> {
        if path.trim().is_empty() {
            return Err(AppError::validation("file_path", "File path cannot be empty"));
        }

        let path_obj = Path::new(path);

        if !path_obj.exists() {
            return Err(AppError::file_not_found(path));
        }

        if !path_obj.is_file() {
            return Err(AppError::validation("file_path", "Path is not a file"));
        }

        Ok(())
    }

    pub fn validate_extension(path: &str, accepted_extensions: &[String]) -> AppResult<()> {
        let extension = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .ok_or_else(|| AppError::unsupported_file_type(path))?;

        if accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&extension))
        {
            Ok(())
        } else {
            Err(AppError::unsupported_file_type(path))
        }
    }

    /// Validate a picked document and return its size in bytes.
    pub fn validate_document_file(
        path: &str,
        max_file_size_mb: u64,
        accepted_extensions: &[String],
    ) -> AppResult<u64> {
        Self::validate_file_path(path)?;
        Self::validate_extension(path, accepted_extensions)?;

        let size = std::fs::metadata(path)?.len();
        if size > max_file_size_mb * BYTES_PER_MB {
            return Err(AppError::file_too_large(path, max_file_size_mb));
        }

        Ok(size)
    }

    pub fn sanitize_filename(filename: &str) -> String {
        let sanitized = unsafe_filename_chars().replace_all(filename.trim(), "_");

        // Limit length
        if sanitized.chars().count() > 255 {
            let truncated: String = sanitized.chars().take(252).collect();
            format!("{}...", truncated)
        } else {
            sanitized.to_string()
        }
    }
}
