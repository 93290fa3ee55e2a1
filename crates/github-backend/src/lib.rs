pub mod client;
pub mod error;
pub mod models;
pub mod pagination;


pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::{GitHubError, Result};
pub use models::*;
pub use pagination::{Page, PAGE_SIZE};
