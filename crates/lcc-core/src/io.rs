use crate::error::Result;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialize `value` as YAML and stage it in a hidden tempfile beside
/// `path`, creating `.lcc/` and `.lcc/workflows/` on first use.
fn stage_yaml<T: Serialize>(path: &Path, value: &T) -> Result<NamedTempFile> {
    let data = serde_yaml::to_string(value)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".lcc-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    Ok(tmp)
}

/// Write a config or workflow file. The rename is atomic, so a reader sees
/// either the old document or the new one.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    stage_yaml(path, value)?
        .persist(path)
        .map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_yaml`], but leaves an existing file untouched.
/// Returns `true` when the file was created.
pub fn write_yaml_if_missing<T: Serialize>(path: &Path, value: &T) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    match stage_yaml(path, value)?.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn doc(version: u32) -> BTreeMap<&'static str, u32> {
        BTreeMap::from([("version", version)])
    }

    #[test]
    fn write_yaml_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lcc/workflows/triage.yaml");
        write_yaml(&path, &doc(1)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1\n");
    }

    #[test]
    fn write_yaml_replaces_and_leaves_no_tempfiles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        write_yaml(&path, &doc(1)).unwrap();
        write_yaml(&path, &doc(2)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 2\n");

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["config.yaml"]);
    }

    #[test]
    fn write_yaml_if_missing_only_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lcc/config.yaml");
        assert!(write_yaml_if_missing(&path, &doc(1)).unwrap());
        assert!(!write_yaml_if_missing(&path, &doc(2)).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1\n");
    }

    #[test]
    fn write_yaml_if_missing_keeps_hand_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "# edited by hand\n").unwrap();
        assert!(!write_yaml_if_missing(&path, &doc(1)).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited by hand\n");
    }
}
