use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::EmitError;

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), EmitError> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}

/// Replace `path` with `data` in one step.
///
/// The bytes go to a sibling temp file that is synced and renamed over the
/// destination. On failure the temp file is removed and the destination keeps
/// its previous content, if any.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let result = write_and_rename(&tmp_path, path, data);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result.map_err(EmitError::from)
}

fn write_and_rename(tmp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            sync_dir(parent)?;
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, EmitError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| EmitError::InvalidPath(path.display().to_string()))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datafreeze-{label}-{}", uuid::Uuid::new_v4()));
        create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = scratch_dir("atomic");
        let path = dir.join("FrozenData.cs");
        std::fs::write(&path, "old").unwrap();

        write_bytes_atomic(&path, b"new content").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");
        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["FrozenData.cs"]);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = scratch_dir("nested");
        let path = dir.join("a").join("b").join("report.json");

        write_json_atomic(&path, &serde_json::json!({ "rows": 3 })).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"rows\": 3"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rejects_paths_without_file_name() {
        assert!(matches!(
            write_bytes_atomic(Path::new("/"), b"x"),
            Err(EmitError::InvalidPath(_))
        ));
    }
}
