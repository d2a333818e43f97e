use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::errors::Result;

use super::KeyValueStore;

const ENTRY_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Stores each key as `<root>/<canonical key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), ENTRY_EXTENSION))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "entry".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_canonicalized_into_file_names() {
        assert_eq!(canonical_key("car-funnel-lead"), "car-funnel-lead");
        assert_eq!(canonical_key("Car Funnel/Lead"), "car_funnel_lead");
        assert_eq!(canonical_key("  "), "entry");
    }

    #[test]
    fn set_replaces_previous_value_without_leaving_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.set("car-funnel-lead", "{\"a\":1}").unwrap();
        store.set("car-funnel-lead", "{\"a\":2}").unwrap();

        assert_eq!(
            store.get("car-funnel-lead").unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["car-funnel-lead.json".to_string()]);
    }

    #[test]
    fn missing_entries_read_as_none_and_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state")).unwrap();
        assert_eq!(store.get("nothing").unwrap(), None);
        store.remove("nothing").unwrap();
    }
}
