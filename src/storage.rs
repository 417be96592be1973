use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{EngineError, Result};

/// Length of the fingerprint prefix used in stored names.
const KEY_PREFIX_LEN: usize = 12;

/// Flat directory of uploaded images and derived visualizations. Stored
/// names are content-addressed (`<sha256 prefix>_<display name>`) so two
/// unrelated uploads sharing a filename cannot clobber each other; the
/// user-facing filename is kept only as display metadata.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(UploadStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes uploaded bytes under a content-addressed name and returns it.
    /// Re-uploading identical bytes under the same name is idempotent.
    pub fn save(&self, display_name: &str, sha256: &str, bytes: &[u8]) -> Result<String> {
        let display_name = sanitize_name(display_name)?;
        let prefix = sha256.get(..KEY_PREFIX_LEN).ok_or_else(|| {
            EngineError::InvalidInput(format!("malformed sha256 digest: {sha256}"))
        })?;

        let stored_name = format!("{prefix}_{display_name}");
        fs::write(self.root.join(&stored_name), bytes)?;
        Ok(stored_name)
    }

    /// Resolves a stored name to its path, rejecting names that were never
    /// stored before any analysis work starts.
    pub fn resolve(&self, stored_name: &str) -> Result<PathBuf> {
        let stored_name = sanitize_name(stored_name)?;
        let path = self.root.join(stored_name);
        if !path.is_file() {
            return Err(EngineError::FileNotFound(stored_name.to_string()));
        }
        Ok(path)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Recovers the display filename from a stored name.
    pub fn display_name(stored_name: &str) -> &str {
        match stored_name.split_once('_') {
            Some((prefix, rest))
                if prefix.len() == KEY_PREFIX_LEN
                    && prefix.bytes().all(|b| b.is_ascii_hexdigit()) =>
            {
                rest
            }
            _ => stored_name,
        }
    }

    /// Name of the ELA visualization derived from a stored upload.
    pub fn ela_name(stored_name: &str) -> String {
        let stem = Path::new(stored_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| stored_name.to_string());
        format!("ela_{stem}.png")
    }
}

/// Strips any directory components and rejects empty names.
pub(crate) fn sanitize_name(name: &str) -> Result<&str> {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if base.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "not a usable file name: {name:?}"
        )));
    }
    Ok(base)
}
