use crate::error::EtlError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const INPUT_SUFFIX: &str = ".json";

/// One input file to process.
#[derive(Clone, Debug)]
pub struct FileJob {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// List `*.json` files directly inside `dir`, in directory-listing order
/// (not sorted; depends on the filesystem).
pub fn discover_inputs(dir: &Path) -> Result<Vec<FileJob>, EtlError> {
    let meta = fs::metadata(dir).map_err(|source| EtlError::InputDir { path: dir.to_path_buf(), source })?;
    if !meta.is_dir() {
        return Err(EtlError::InputDir {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let mut jobs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let ent = match entry {
            Ok(ent) => ent,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !ent.file_type().is_file() {
            continue;
        }
        let Some(name) = ent.file_name().to_str() else { continue };
        if !name.ends_with(INPUT_SUFFIX) {
            continue;
        }
        let size = ent.metadata().map(|m| m.len()).unwrap_or(0);
        jobs.push(FileJob { path: ent.path().to_path_buf(), name: name.to_string(), size });
    }
    Ok(jobs)
}
