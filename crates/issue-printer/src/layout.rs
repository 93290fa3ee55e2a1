use std::path::{Path, PathBuf};

/// Directory holding downloaded images, also the link prefix written into documents
pub const IMAGES_DIR: &str = "images";
pub const MARKDOWN_DIR: &str = "markdown_files";
pub const RAW_LOG_FILE: &str = "raw_json.json";

/// Working locations used before the archive step, relative to `root`
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at the process's working directory
    pub fn current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.root.join(MARKDOWN_DIR)
    }

    pub fn raw_log_path(&self) -> PathBuf {
        self.root.join(RAW_LOG_FILE)
    }

    /// Final archive directory for a repository
    pub fn archive_dir(&self, archive_name: &str) -> PathBuf {
        self.root.join(archive_name)
    }
}
