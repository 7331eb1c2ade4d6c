//! Discovery of the source files a scan looks at.

use std::path::{Path, PathBuf};

use crate::config::ScanSettings;
use crate::error::Result;
use crate::parser::Language;

/// A source file included in the scan.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub content: String,
}

/// Collect JS/TS sources under `root`. A `root` that is a file yields just
/// that file, whatever the exclude patterns say.
pub fn collect_source_files(root: &Path, settings: &ScanSettings) -> Result<Vec<SourceFile>> {
    if root.is_file() {
        let language = Language::from_path(root);
        if matches!(language, Language::Unknown) {
            return Ok(Vec::new());
        }
        return Ok(vec![SourceFile {
            path: root.to_path_buf(),
            language,
            content: std::fs::read_to_string(root)?,
        }]);
    }

    let excludes: Vec<glob::Pattern> = settings
        .exclude
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!(pattern = %p, error = %e, "ignoring invalid exclude pattern");
                None
            }
        })
        .collect();

    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let language = Language::from_path(path);
        if matches!(language, Language::Unknown) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.iter().any(|p| p.matches_path(relative)) {
            tracing::debug!(file = %relative.display(), "excluded by pattern");
            continue;
        }

        if let Some(file) = load_source(path, language, settings) {
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Read one walked file. Files that can't be read or are too large are
/// logged and left out.
fn load_source(path: &Path, language: Language, settings: &ScanSettings) -> Option<SourceFile> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to stat source");
            return None;
        }
    };
    if metadata.len() > settings.max_file_size {
        tracing::debug!(
            file = %path.display(),
            size = metadata.len(),
            "skipping oversized file"
        );
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(SourceFile {
            path: path.to_path_buf(),
            language,
            content,
        }),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to read source");
            None
        }
    }
}
