//! Formatter bridge (C10, §4.10): routes generated files through an
//! external formatting process, passing them through unchanged on any
//! failure. The formatter is a best-effort pretty-print, never a
//! correctness gate (§9).

use crate::emit::GeneratedFile;
use std::io::Read;
use std::path::Path;
use std::process::Command;
use tracing::{instrument, warn};

/// Describes how to invoke an external formatter: a program plus arguments,
/// and a standalone config file dropped into the scratch directory
/// alongside the generated files.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    pub program: String,
    pub args: Vec<String>,
    pub config_file_name: String,
    pub config_file_contents: String,
}

const TEXT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "json", "md"];

fn is_text_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Runs `files` through `formatter` in a fresh scratch directory. Returns
/// `files` unchanged (in the same order) if `formatter` is `None`, if the
/// process exits non-zero, or if the scratch directory can't be prepared or
/// read back; the scratch directory is released on every exit path.
#[instrument(skip_all, name = "format")]
pub fn format_files(files: Vec<GeneratedFile>, formatter: Option<&FormatterConfig>) -> Vec<GeneratedFile> {
    let Some(formatter) = formatter else {
        return files;
    };

    match run_formatter(&files, formatter) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(error = %err, "formatter pass-through: returning unformatted files");
            files
        }
    }
}

fn run_formatter(files: &[GeneratedFile], formatter: &FormatterConfig) -> std::io::Result<Vec<GeneratedFile>> {
    let scratch = tempfile::tempdir()?;
    let root = scratch.path();

    for file in files {
        let dest = root.join(&file.path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, &file.content)?;
    }
    std::fs::write(root.join(&formatter.config_file_name), &formatter.config_file_contents)?;

    let status = Command::new(&formatter.program).args(&formatter.args).current_dir(root).status()?;

    if !status.success() {
        warn!(code = ?status.code(), "formatter exited non-zero");
        return Ok(files.to_vec());
    }

    let mut out = Vec::with_capacity(files.len());
    for file in files {
        if !is_text_file(&file.path) {
            out.push(file.clone());
            continue;
        }
        let dest = root.join(&file.path);
        let mut content = String::new();
        std::fs::File::open(&dest)?.read_to_string(&mut content)?;
        out.push(GeneratedFile::new(file.path.clone(), content));
    }
    Ok(out)
}
