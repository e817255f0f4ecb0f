//! JSON document I/O. Writes go through a temp file in the target's
//! directory and are renamed over it, so readers see whole documents only.

use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// `None` when the document does not exist.
pub fn read_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Missing documents read as `T::default()`.
pub fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    Ok(read_opt(path)?.unwrap_or_default())
}

pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    log::trace!(target: "store", "wrote {}", path.display());
    Ok(())
}
