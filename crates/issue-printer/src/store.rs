//! Directory-backed content store.
//!
//! Both the image cache and the rendered documents are keyed files in a
//! directory: a key that is present has already been produced and is never
//! rewritten. A re-run after a crash resumes by skipping present keys.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Files addressed by key
pub trait ContentStore {
    /// Whether `key` has already been stored
    fn has(&self, key: &str) -> bool;

    /// Store `bytes` under `key`, replacing any previous content
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Where `key` lives on disk
    fn path_of(&self, key: &str) -> PathBuf;
}

/// A [`ContentStore`] over one flat directory
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) the store directory
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        // Already existing is fine
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl ContentStore for DirStore {
    fn has(&self, key: &str) -> bool {
        self.path_of(key).exists()
    }

    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.path_of(key);
        // Written aside then renamed, so a present key is always complete
        let partial = self.dir.join(format!(".{}.partial", key));
        fs::write(&partial, bytes)?;
        fs::rename(&partial, &target)
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}
