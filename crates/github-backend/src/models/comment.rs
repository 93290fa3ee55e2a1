use serde::{Deserialize, Serialize};

use super::issue::GitHubUser;

/// GitHub issue comment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubComment {
    pub body: Option<String>,
    pub user: Option<GitHubUser>,
}

impl GitHubComment {
    pub fn author(&self) -> &str {
        GitHubUser::login_or_ghost(self.user.as_ref())
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}
