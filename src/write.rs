//! Incremental writer (C11, §4.11): hash-compares against on-disk state,
//! writes only changed files, and optionally sweeps files the generator no
//! longer produces.

use crate::emit::GeneratedFile;
use crate::error::CodegenError;
use crate::hash::ContentHash;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    pub removed: Vec<String>,
}

fn to_io_error(path: &Path, source: std::io::Error) -> CodegenError {
    CodegenError::Io { path: path.display().to_string(), source }
}

/// Writes `files` under `output_dir`. When `clean` is set, any file already
/// under `output_dir` whose relative path is absent from `files` is deleted
/// and recorded in `removed`. A write failure aborts immediately; files
/// already written remain on disk (§4.11 partial-failure semantics).
#[instrument(skip_all, name = "write", fields(output_dir = %output_dir.display()))]
pub fn write(files: &[GeneratedFile], output_dir: &Path, clean: bool) -> Result<WriteReport, CodegenError> {
    std::fs::create_dir_all(output_dir).map_err(|e| to_io_error(output_dir, e))?;

    let mut report = WriteReport::default();
    let mut generated_paths: HashSet<PathBuf> = HashSet::new();

    for file in files {
        let dest = output_dir.join(&file.path);
        generated_paths.insert(relative_to(output_dir, &dest));

        let new_hash = ContentHash::of_str(&file.content);
        let existing = std::fs::read(&dest).ok();
        let unchanged = existing.as_ref().map(|bytes| ContentHash::of_bytes(bytes) == new_hash).unwrap_or(false);

        if unchanged {
            report.skipped.push(file.path.clone());
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| to_io_error(parent, e))?;
        }
        std::fs::write(&dest, &file.content).map_err(|e| to_io_error(&dest, e))?;
        report.written.push(file.path.clone());
    }

    if clean {
        for entry in WalkDir::new(output_dir).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = relative_to(output_dir, entry.path());
            if !generated_paths.contains(&relative) {
                std::fs::remove_file(entry.path()).map_err(|e| to_io_error(entry.path(), e))?;
                report.removed.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        removed = report.removed.len(),
        "wrote generated files"
    );
    Ok(report)
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![GeneratedFile::new("a.ts", "x"), GeneratedFile::new("nested/b.ts", "y")];
        let report = write(&files, dir.path(), false).unwrap();
        assert_eq!(report.written.len(), 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn second_write_with_same_bytes_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![GeneratedFile::new("a.ts", "x")];
        write(&files, dir.path(), false).unwrap();
        let report = write(&files, dir.path(), false).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped, vec!["a.ts".to_string()]);
    }

    #[test]
    fn clean_removes_stale_file_not_in_generated_set() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stale.ts"), "old").unwrap();
        let files = vec![GeneratedFile::new("a.ts", "x")];
        let report = write(&files, dir.path(), true).unwrap();
        assert_eq!(report.removed, vec!["stale.ts".to_string()]);
        assert!(!dir.path().join("stale.ts").exists());
    }

    #[test]
    fn changed_content_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        write(&[GeneratedFile::new("a.ts", "x")], dir.path(), false).unwrap();
        let report = write(&[GeneratedFile::new("a.ts", "y")], dir.path(), false).unwrap();
        assert_eq!(report.written, vec!["a.ts".to_string()]);
    }
}
