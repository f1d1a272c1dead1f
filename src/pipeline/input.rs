//! Input resolution: normalise a user-supplied path or URL to a local file
//! and check that it matches the declared [`FileType`].
//!
//! URLs are downloaded into a `TempDir` that lives as long as the returned
//! [`ResolvedInput`], so the layout backends always get a file-system path.

use crate::config::FileType;
use crate::error::DocTranslateError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A local path, or a downloaded temp file kept alive with its directory.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the file lives in `_temp_dir` until drop.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the input file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file of the given type.
pub async fn resolve_input(
    input: &str,
    file_type: FileType,
    timeout_secs: u64,
) -> Result<ResolvedInput, DocTranslateError> {
    if input.trim().is_empty() {
        return Err(DocTranslateError::InvalidInput {
            input: input.to_string(),
        });
    }
    let resolved = if is_url(input) {
        download_url(input, file_type, timeout_secs).await?
    } else {
        ResolvedInput::Local(PathBuf::from(input))
    };
    check_file(resolved.path(), file_type)?;
    debug!("Resolved {} input: {}", file_type, resolved.path().display());
    Ok(resolved)
}

/// Map a failed open/read of a local input to the matching error.
pub(crate) fn read_error(path: &Path, err: &std::io::Error) -> DocTranslateError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => DocTranslateError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocTranslateError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}

/// Validate existence, readability and content type of a local file.
pub fn check_file(path: &Path, file_type: FileType) -> Result<(), DocTranslateError> {
    if !path.exists() {
        return Err(DocTranslateError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = std::fs::File::open(path).map_err(|e| read_error(path, &e))?;

    let mut head = [0u8; 16];
    let n = file.read(&mut head).unwrap_or(0);
    let head = &head[..n];

    match file_type {
        FileType::Pdf => {
            if !head.starts_with(b"%PDF") {
                let mut magic = [0u8; 4];
                let len = head.len().min(4);
                magic[..len].copy_from_slice(&head[..len]);
                return Err(DocTranslateError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        FileType::Image => {
            image::guess_format(head).map_err(|e| DocTranslateError::NotAnImage {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        }
    }
    Ok(())
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(
    url: &str,
    file_type: FileType,
    timeout_secs: u64,
) -> Result<ResolvedInput, DocTranslateError> {
    info!("Downloading {} from: {}", file_type, url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocTranslateError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DocTranslateError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocTranslateError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DocTranslateError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url, file_type);
    let temp_dir = TempDir::new().map_err(|e| DocTranslateError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DocTranslateError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| DocTranslateError::Internal(format!("Failed to write temp file: {e}")))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment if it looks like a file name, else a default
/// name for the file type.
fn filename_from_url(url: &str, file_type: FileType) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    match file_type {
        FileType::Pdf => "downloaded.pdf".to_string(),
        FileType::Image => "downloaded.png".to_string(),
    }
}
