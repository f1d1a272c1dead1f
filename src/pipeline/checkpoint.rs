//! Per-page checkpoints of the translated layout.
//!
//! After each page the whole [`LayoutDocument`] is written as JSON (temp
//! file + rename, so a crash never leaves half a file). On the next run
//! [`restore`] copies translations back onto elements that still match by
//! page number, element index and original text; everything else is
//! translated again.

use crate::error::DocTranslateError;
use crate::layout::LayoutDocument;
use std::path::Path;
use tracing::{debug, info, warn};

/// Copy translations from the checkpoint at `path` onto `layout`.
///
/// Returns the number of elements restored. A missing file restores nothing.
pub async fn restore(
    layout: &mut LayoutDocument,
    path: &Path,
) -> Result<usize, DocTranslateError> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(DocTranslateError::CheckpointFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        }
    };
    let saved = LayoutDocument::from_json(&json).map_err(|e| DocTranslateError::CheckpointFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut restored = 0;
    for page in &mut layout.pages {
        let Some(saved_page) = saved.pages.iter().find(|p| p.page_number == page.page_number)
        else {
            continue;
        };
        for (idx, element) in page.layout_elements.iter_mut().enumerate() {
            if element.translated_text.is_some() {
                continue;
            }
            let Some(saved_element) = saved_page.layout_elements.get(idx) else {
                continue;
            };
            if saved_element.text == element.text {
                if let Some(ref t) = saved_element.translated_text {
                    element.translated_text = Some(t.clone());
                    restored += 1;
                }
            }
        }
    }

    let saved_translations = saved
        .elements()
        .filter(|(_, _, e)| e.translated_text.is_some())
        .count();

    if restored > 0 {
        info!(
            "Restored {} translations from checkpoint {}",
            restored,
            path.display()
        );
    } else if saved_translations == 0 {
        debug!("Checkpoint {} holds no translations yet", path.display());
    } else {
        warn!(
            "Checkpoint {} did not match the extracted layout; translating from scratch",
            path.display()
        );
    }
    Ok(restored)
}

/// Atomically write `layout` to `path`.
pub async fn save(layout: &LayoutDocument, path: &Path) -> Result<(), DocTranslateError> {
    let json = layout
        .to_json_pretty()
        .map_err(|e| DocTranslateError::Internal(format!("Checkpoint serialisation: {e}")))?;
    write_atomic(path, json.as_bytes()).await
}

/// Write via a sibling temp file and rename, creating parent directories.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocTranslateError> {
    let write_err = |source: std::io::Error| DocTranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
