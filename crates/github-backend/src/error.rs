use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("Authentication failed (check the token in the credential file)")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("HTTP status {status} on fetching {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, GitHubError>;
