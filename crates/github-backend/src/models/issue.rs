use serde::{Deserialize, Serialize};

use super::label::GitHubLabel;

/// Login GitHub shows for content whose author account was deleted
pub const GHOST_LOGIN: &str = "ghost";

/// GitHub user (minimal representation)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubUser {
    pub login: String,
}

impl GitHubUser {
    pub(crate) fn login_or_ghost(user: Option<&GitHubUser>) -> &str {
        user.map(|u| u.login.as_str()).unwrap_or(GHOST_LOGIN)
    }
}

/// GitHub issue as returned by the issues listing
///
/// Pull requests are listed by the same endpoint and deserialize into this
/// type as well.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    pub user: Option<GitHubUser>,
    /// Number of comments on the issue
    #[serde(default)]
    pub comments: u64,
    pub comments_url: String,
}

impl GitHubIssue {
    pub fn author(&self) -> &str {
        GitHubUser::login_or_ghost(self.user.as_ref())
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn has_comments(&self) -> bool {
        self.comments > 0
    }
}
