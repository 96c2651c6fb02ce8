use std::fs;
use std::path::Path;

use anyhow::Context;
use intake_core::SourceFile;
use intake_logging::{intake_debug, intake_warn};

/// Reads a document from disk, guessing its media type from the extension.
pub fn load_source_file(path: &Path) -> anyhow::Result<SourceFile> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path).first_raw().unwrap_or_default();
    intake_debug!("Loaded {} ({} bytes, {:?})", name, bytes.len(), media_type);
    Ok(SourceFile::new(name, media_type, bytes))
}

/// Loads every readable path; unreadable ones are reported and skipped.
pub fn load_source_files(paths: &[impl AsRef<Path>]) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|path| match load_source_file(path.as_ref()) {
            Ok(file) => Some(file),
            Err(err) => {
                intake_warn!("Skipping {}: {:#}", path.as_ref().display(), err);
                eprintln!("Skipping {}: {:#}", path.as_ref().display(), err);
                None
            }
        })
        .collect()
}
