//! Plain-text document downloads.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::documents::DocumentKind;

/// Number of idea characters considered for the filename suffix.
const IDEA_PREFIX_CHARS: usize = 20;

/// Suffix used when nothing usable remains of the idea.
const FALLBACK_SUFFIX: &str = "document";

/// Filename-safe suffix derived from the idea.
///
/// Takes the first 20 characters, keeps ASCII letters and digits only and
/// lowercases the result.
pub fn sanitize_idea_prefix(idea: &str) -> String {
    idea.chars()
        .take(IDEA_PREFIX_CHARS)
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `<Display_Name>_<idea-prefix>.txt` for a document of `kind`.
pub fn download_filename(kind: DocumentKind, idea: &str) -> String {
    let name = kind
        .display_name()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let suffix = sanitize_idea_prefix(idea);
    let suffix = if suffix.is_empty() {
        FALLBACK_SUFFIX
    } else {
        suffix.as_str()
    };
    format!("{name}_{suffix}.txt")
}

/// Write `content` as UTF-8 text into `dir` under the download filename.
///
/// Creates `dir` if needed and overwrites an existing file of the same name.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn save_document(
    dir: &Path,
    kind: DocumentKind,
    idea: &str,
    content: &str,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(download_filename(kind, idea));
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(kind = %kind, path = %path.display(), bytes = content.len(), "document saved");
    Ok(path)
}
