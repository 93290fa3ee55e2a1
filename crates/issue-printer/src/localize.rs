//! Image localization: remote image references in Markdown are rewritten to
//! point at cached local copies named after the MD5 of their URL.

use github_backend::{GitHubClient, GitHubError};
use md5::{Digest, Md5};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::store::ContentStore;

static IMAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

#[derive(Error, Debug)]
pub enum LocalizeError {
    #[error("No extension at the end of {url}")]
    MissingExtension { url: String },

    #[error("Failed to download image {url}")]
    Download {
        url: String,
        #[source]
        source: GitHubError,
    },

    #[error("Failed to store image at {path}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A remote image found in Markdown and the local file it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub file_name: String,
}

/// Something that can fetch image bytes by URL
pub trait ImageSource {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, GitHubError>;
}

impl ImageSource for GitHubClient {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, GitHubError> {
        self.download(url)
    }
}

fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Extension (with its dot) of the last path segment, ignoring query and fragment
fn extension_of(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let dot = segment.rfind('.')?;
    // ".hidden" has no extension, and a trailing dot names nothing
    if dot == 0 || dot + 1 == segment.len() {
        return None;
    }
    Some(&segment[dot..])
}

/// Local file name for an image URL: `<md5 hex of url><extension>`
pub fn image_file_name(url: &str) -> Result<String, LocalizeError> {
    let extension = extension_of(url).ok_or_else(|| LocalizeError::MissingExtension {
        url: url.to_string(),
    })?;
    let hash = Md5::digest(url.as_bytes());
    Ok(format!("{:x}{}", hash, extension))
}

/// Rewrite every remote `![caption](url)` to `![caption](<prefix>/<file>)`.
///
/// Pure: no filesystem or network access. Returns the rewritten text and
/// the images it now refers to, in order of appearance. References that
/// are already local are left alone, so rewriting is idempotent.
pub fn rewrite_images(
    text: &str,
    link_prefix: &str,
) -> Result<(String, Vec<ImageRef>), LocalizeError> {
    let mut out = String::with_capacity(text.len());
    let mut refs = Vec::new();
    let mut last = 0;

    for caps in IMAGE_TAG.captures_iter(text) {
        let (Some(whole), Some(caption), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let url = url.as_str();
        if !is_remote(url) {
            continue;
        }

        let file_name = image_file_name(url)?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&format!(
            "![{}]({}/{})",
            caption.as_str(),
            link_prefix,
            file_name
        ));
        last = whole.end();

        refs.push(ImageRef {
            url: url.to_string(),
            file_name,
        });
    }

    out.push_str(&text[last..]);
    Ok((out, refs))
}

/// Rewrites image references and makes sure each referenced file is cached
pub struct Localizer<'a> {
    store: &'a dyn ContentStore,
    source: &'a dyn ImageSource,
    link_prefix: String,
}

impl<'a> Localizer<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        source: &'a dyn ImageSource,
        link_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            link_prefix: link_prefix.into(),
        }
    }

    /// Rewrite `text`, downloading any image not yet in the store
    pub fn localize(&self, text: &str) -> Result<String, LocalizeError> {
        let (rewritten, refs) = rewrite_images(text, &self.link_prefix)?;

        for image in refs {
            if self.store.has(&image.file_name) {
                debug!(url = %image.url, file = %image.file_name, "image already cached");
                continue;
            }

            let bytes = self
                .source
                .fetch_image(&image.url)
                .map_err(|source| LocalizeError::Download {
                    url: image.url.clone(),
                    source,
                })?;
            self.store
                .put(&image.file_name, &bytes)
                .map_err(|source| LocalizeError::Store {
                    path: self.store.path_of(&image.file_name),
                    source,
                })?;
            info!(url = %image.url, file = %image.file_name, bytes = bytes.len(), "downloaded image");
        }

        Ok(rewritten)
    }
}
