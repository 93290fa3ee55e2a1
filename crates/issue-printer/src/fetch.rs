//! Paginated traversal of a repository's issues.
//!
//! Every issue without a rendered document is appended to the audit log,
//! has its comments fetched (when it has any), and is rendered into the
//! document store. Issues that already have a document are skipped, so an
//! interrupted run can simply be started again.

use anyhow::{Context, Result};
use github_backend::{GitHubClient, GitHubIssue, PAGE_SIZE};
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::localize::Localizer;
use crate::render::render_issue;
use crate::store::ContentStore;

/// Issues listing filter: open and closed
const ISSUE_STATE: &str = "all";

/// Document key for an issue number
pub fn document_key(number: u64) -> String {
    format!("{}.md", number)
}

/// Outcome of a completed traversal
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Number of listing pages requested
    pub pages: usize,
    /// Issues rendered during this run, in listing order
    pub written: Vec<u64>,
    /// Issues skipped because their document already existed
    pub skipped: Vec<u64>,
}

pub struct Fetcher<'a> {
    client: &'a GitHubClient,
    documents: &'a dyn ContentStore,
    localizer: &'a Localizer<'a>,
    raw_log: PathBuf,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        client: &'a GitHubClient,
        documents: &'a dyn ContentStore,
        localizer: &'a Localizer<'a>,
        raw_log: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            documents,
            localizer,
            raw_log: raw_log.into(),
        }
    }

    /// Walk every page of the issues listing.
    ///
    /// `on_written` is called with each issue number once its document is
    /// stored. The first failure aborts the traversal.
    pub fn fetch_all(&self, mut on_written: impl FnMut(u64)) -> Result<FetchReport> {
        let mut audit = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.raw_log)
            .with_context(|| format!("Failed to open audit log: {}", self.raw_log.display()))?;

        let mut report = FetchReport::default();
        let mut page = 1;

        loop {
            let listing = self
                .client
                .list_issues_page(ISSUE_STATE, PAGE_SIZE, page)
                .with_context(|| {
                    format!(
                        "Failed to fetch issues page {} of {}/{}",
                        page,
                        self.client.owner(),
                        self.client.repo()
                    )
                })?;
            report.pages += 1;
            debug!(page, items = listing.items.len(), has_next = listing.has_next, "issues page");

            for raw in &listing.items {
                let issue = GitHubIssue::deserialize(raw)
                    .with_context(|| format!("Unexpected issue record on page {}", page))?;

                if self.documents.has(&document_key(issue.number)) {
                    debug!(number = issue.number, "document exists, skipping");
                    report.skipped.push(issue.number);
                    continue;
                }

                self.process_issue(&issue, raw, &mut audit)?;
                report.written.push(issue.number);
                on_written(issue.number);
            }

            if listing.is_last() {
                break;
            }
            page += 1;
        }

        info!(
            pages = report.pages,
            written = report.written.len(),
            skipped = report.skipped.len(),
            "issues fetched"
        );
        Ok(report)
    }

    fn process_issue(
        &self,
        issue: &GitHubIssue,
        raw: &serde_json::Value,
        audit: &mut File,
    ) -> Result<()> {
        let record = serde_json::to_string(raw)?;
        writeln!(audit, "{}", record)
            .with_context(|| format!("Failed to append to {}", self.raw_log.display()))?;

        let comments = if issue.has_comments() {
            self.client
                .get_all_comments(&issue.comments_url)
                .with_context(|| format!("Failed to fetch comments of issue {}", issue.number))?
        } else {
            Vec::new()
        };

        let document = render_issue(issue, &comments, |text| self.localizer.localize(text))
            .with_context(|| format!("Failed to render issue {}", issue.number))?;

        let key = document_key(issue.number);
        self.documents
            .put(&key, document.as_bytes())
            .with_context(|| {
                format!(
                    "Failed to write {}",
                    self.documents.path_of(&key).display()
                )
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localize::ImageSource;
    use crate::store::DirStore;
    use github_backend::GitHubError;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoImages;

    impl ImageSource for NoImages {
        fn fetch_image(&self, url: &str) -> std::result::Result<Vec<u8>, GitHubError> {
            panic!("unexpected image download: {}", url)
        }
    }

    fn mock_issue(server: &str, number: u64, comments: u64) -> serde_json::Value {
        serde_json::json!({
            "number": number,
            "title": format!("Issue {}", number),
            "body": "# Details\nSomething",
            "state": "open",
            "labels": [{"name": "bug", "color": "fc2929"}],
            "user": {"login": "reporter"},
            "comments": comments,
            "comments_url": format!("{}/repos/org/proj/issues/{}/comments", server, number)
        })
    }

    fn next_link(server: &str, page: usize) -> String {
        format!(
            r#"<{}/repos/org/proj/issues?per_page=100&page={}&state=all>; rel="next""#,
            server, page
        )
    }

    struct Harness {
        _tmp: TempDir,
        images: DirStore,
        documents: DirStore,
        raw_log: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            Self {
                images: DirStore::open(tmp.path().join("images")).unwrap(),
                documents: DirStore::open(tmp.path().join("markdown_files")).unwrap(),
                raw_log: tmp.path().join("raw_json.json"),
                _tmp: tmp,
            }
        }

        fn run(&self, client: &GitHubClient) -> Result<FetchReport> {
            let localizer = Localizer::new(&self.images, &NoImages, "images");
            let fetcher = Fetcher::new(client, &self.documents, &localizer, &self.raw_log);
            fetcher.fetch_all(|_| {})
        }

        fn audit_lines(&self) -> Vec<serde_json::Value> {
            fs::read_to_string(&self.raw_log)
                .unwrap_or_default()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[tokio::test]
    async fn test_walks_pages_and_writes_documents() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .and(query_param("page", "1"))
            .and(query_param("state", "all"))
            .and(query_param("per_page", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", next_link(&uri, 2).as_str())
                    .set_body_json(serde_json::json!([
                        mock_issue(&uri, 2, 1),
                        mock_issue(&uri, 1, 0)
                    ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([mock_issue(&uri, 3, 0)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues/2/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"body": "## Me too", "user": {"login": "alice"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let harness = Harness::new();
        let client = GitHubClient::with_base_url(&uri, "org", "proj", "token");
        let report = harness.run(&client).unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.written, vec![2, 1, 3]);
        assert!(report.skipped.is_empty());

        let doc = fs::read_to_string(harness.documents.path_of("2.md")).unwrap();
        assert!(doc.starts_with("# 2 Issue 2\n\n### Reported by reporter\n\n"));
        assert!(doc.contains("## Details\nSomething"));
        assert!(doc.contains("### Comment from alice\n\n##### Me too\n\n"));

        let audit = harness.audit_lines();
        let numbers: Vec<u64> = audit.iter().map(|r| r["number"].as_u64().unwrap()).collect();
        assert_eq!(numbers, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_existing_document_is_skipped() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([
                    mock_issue(&uri, 42, 3),
                    mock_issue(&uri, 43, 0)
                ])),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues/42/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let harness = Harness::new();
        harness.documents.put("42.md", b"already here").unwrap();
        let client = GitHubClient::with_base_url(&uri, "org", "proj", "token");
        let report = harness.run(&client).unwrap();

        assert_eq!(report.skipped, vec![42]);
        assert_eq!(report.written, vec![43]);
        assert_eq!(
            fs::read_to_string(harness.documents.path_of("42.md")).unwrap(),
            "already here"
        );
        let audit = harness.audit_lines();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0]["number"], 43);
    }

    #[tokio::test]
    async fn test_empty_page_ends_pagination() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", next_link(&uri, 2).as_str())
                    .set_body_json(serde_json::json!([])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([mock_issue(&uri, 9, 0)])),
            )
            .expect(0)
            .mount(&server)
            .await;

        let harness = Harness::new();
        let client = GitHubClient::with_base_url(&uri, "org", "proj", "token");
        let report = harness.run(&client).unwrap();

        assert_eq!(report.pages, 1);
        assert!(report.written.is_empty());
        assert!(harness.audit_lines().is_empty());
    }

    #[tokio::test]
    async fn test_audit_log_is_appended_across_runs() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([mock_issue(&uri, 5, 0)])),
            )
            .mount(&server)
            .await;

        let harness = Harness::new();
        fs::write(&harness.raw_log, "{\"number\":4}\n").unwrap();
        let client = GitHubClient::with_base_url(&uri, "org", "proj", "token");
        harness.run(&client).unwrap();

        let numbers: Vec<u64> = harness
            .audit_lines()
            .iter()
            .map(|r| r["number"].as_u64().unwrap())
            .collect();
        assert_eq!(numbers, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_non_success_status_aborts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let harness = Harness::new();
        let client = GitHubClient::with_base_url(&server.uri(), "org", "proj", "token");
        let err = harness.run(&client).unwrap_err();

        assert!(format!("{:#}", err).contains("HTTP status 500"));
        assert!(!harness.documents.has("1.md"));
    }

    #[tokio::test]
    async fn test_missing_image_extension_aborts() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let mut issue = mock_issue(&uri, 8, 0);
        issue["body"] = serde_json::json!("![shot](https://github.com/user-attachments/assets/abc)");

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([issue])))
            .mount(&server)
            .await;

        let harness = Harness::new();
        let client = GitHubClient::with_base_url(&uri, "org", "proj", "token");
        let err = harness.run(&client).unwrap_err();

        assert!(format!("{:#}", err).contains("No extension at the end of"));
        assert!(!harness.documents.has("8.md"));
    }

    #[tokio::test]
    async fn test_malformed_issue_record_aborts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/org/proj/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"number": "not a number", "title": "Broken"}
            ])))
            .mount(&server)
            .await;

        let harness = Harness::new();
        let client = GitHubClient::with_base_url(&server.uri(), "org", "proj", "token");
        let err = harness.run(&client).unwrap_err();

        assert!(err.to_string().contains("Unexpected issue record on page 1"));
        assert!(harness.audit_lines().is_empty());
    }

    #[test]
    fn document_key_uses_issue_number() {
        assert_eq!(document_key(42), "42.md");
    }
}
