use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SlugError {
    #[error("Repository must look like owner/repository, got '{0}'")]
    Malformed(String),
}

/// A GitHub repository identified as `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    owner: String,
    repo: String,
}

impl RepoSlug {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Directory name the finished archive is moved to (`owner-repo`)
    pub fn archive_name(&self) -> String {
        format!("{}-{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SlugError::Malformed(s.to_string());
        let (owner, repo) = s.split_once('/').ok_or_else(malformed)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(malformed());
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
