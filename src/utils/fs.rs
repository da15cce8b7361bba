use crate::error::{Result, ShardError};
use std::path::Path;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ShardError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ShardError::from(e),
        })?;
    }
    Ok(())
}

/// Whether `name` is safe to join onto a directory as a single file name.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Every regular file under `root`, relative to it, sorted.
#[cfg(test)]
pub fn list_files_relative(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if root.exists() {
        collect_files(root, root, &mut files)?;
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
