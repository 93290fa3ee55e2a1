use tracing::debug;
use ureq::Agent;

use crate::error::{GitHubError, Result};
use crate::models::*;
use crate::pagination::{fetch_all_pages, link_has_next, Page, PAGE_SIZE};

/// Default public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Upper bound for a single downloaded image
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// GitHub REST API client (read-only)
pub struct GitHubClient {
    agent: Agent,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    user_agent: String,
}

impl GitHubClient {
    /// Create a new GitHub client targeting api.github.com
    pub fn new(owner: &str, repo: &str, token: &str) -> Self {
        Self::with_base_url(DEFAULT_API_URL, owner, repo, token)
    }

    /// Create a new GitHub client with a custom base URL (for GitHub Enterprise or testing)
    pub fn with_base_url(base_url: &str, owner: &str, repo: &str, token: &str) -> Self {
        // No global timeout: requests block until the transport gives up
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            user_agent: concat!("github-backend/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the User-Agent header sent with every request
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Get the owner for this client
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repo for this client
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build a repo-scoped URL
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url, self.owner, self.repo, path
        )
    }

    /// Build the Authorization header value
    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Authenticated API GET, checked for a successful status
    fn api_get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>> {
        debug!(url, "GET");
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header())
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .call()
            .map_err(GitHubError::Http)?;

        check_response(url, response)
    }

    /// Fetch one page of a JSON listing, noting whether a next page exists
    fn get_page<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Page<T>> {
        let mut response = self.api_get(url)?;
        let has_next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(link_has_next)
            .unwrap_or(false);
        let items: Vec<T> = response.body_mut().read_json()?;
        Ok(Page { items, has_next })
    }

    // ==================== Issue Operations ====================

    /// Fetch one page of the repository's issues listing.
    ///
    /// Items are returned as raw JSON so callers can keep the record exactly
    /// as GitHub sent it. Pull requests are not filtered out.
    pub fn list_issues_page(
        &self,
        state: &str,
        per_page: usize,
        page: usize,
    ) -> Result<Page<serde_json::Value>> {
        let url = format!(
            "{}?per_page={}&page={}&state={}",
            self.repo_url("/issues"),
            per_page,
            page,
            urlencoding::encode(state)
        );
        self.get_page(&url)
    }

    // ==================== Comment Operations ====================

    /// Fetch one page of comments from an issue's `comments_url`
    pub fn get_comments_page(
        &self,
        comments_url: &str,
        per_page: usize,
        page: usize,
    ) -> Result<Page<GitHubComment>> {
        let separator = if comments_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}per_page={}&page={}",
            comments_url, separator, per_page, page
        );
        self.get_page(&url)
    }

    /// Fetch every comment of an issue, in the order GitHub returns them
    pub fn get_all_comments(&self, comments_url: &str) -> Result<Vec<GitHubComment>> {
        fetch_all_pages(|page| self.get_comments_page(comments_url, PAGE_SIZE, page))
    }

    // ==================== Downloads ====================

    /// Download an arbitrary URL and return the raw response body.
    ///
    /// No Authorization header is sent: image URLs usually point at hosts
    /// other than the API.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "download");
        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = check_response(url, response)?;
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()?;
        Ok(bytes)
    }
}

/// Check response status and return error if not successful
fn check_response(
    url: &str,
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<ureq::http::Response<ureq::Body>> {
    let status = response.status().as_u16();

    if (200..300).contains(&status) {
        return Ok(response);
    }

    // Detect rate limiting: 403 with x-ratelimit-remaining: 0
    if status == 403 {
        if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
            if remaining.to_str().unwrap_or("") == "0" {
                return Err(GitHubError::RateLimited);
            }
        }
    }

    if status == 401 {
        return Err(GitHubError::Unauthorized);
    }

    let body = response
        .body_mut()
        .read_to_string()
        .unwrap_or_else(|_| String::new());

    // Prefer the `message` field of a GitHub error document
    let message = if let Ok(error_response) = serde_json::from_str::<serde_json::Value>(&body) {
        error_response
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(&body)
            .to_string()
    } else if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body
    };

    Err(GitHubError::Api {
        status,
        url: url.to_string(),
        message,
    })
}
