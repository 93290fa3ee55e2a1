//! Markdown document rendering for a single issue and its comments.

use github_backend::{GitHubComment, GitHubIssue};
use regex::Regex;
use std::sync::LazyLock;

use crate::localize::LocalizeError;

static HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(#+)").unwrap());

/// Extra heading levels for the issue body (below the `#` title)
pub const BODY_DEMOTION: usize = 1;
/// Extra heading levels for comment bodies (below `### Comment from`)
pub const COMMENT_DEMOTION: usize = 3;

/// Add `levels` `#` characters to every heading marker at the start of a line
pub fn demote_headings(text: &str, levels: usize) -> String {
    let extra = "#".repeat(levels);
    HEADING_MARKER
        .replace_all(text, |caps: &regex::Captures| format!("{}{}", extra, &caps[1]))
        .into_owned()
}

/// Render one issue as a standalone Markdown document.
///
/// `localize` rewrites image references in the body and in every comment,
/// after heading demotion.
pub fn render_issue<F>(
    issue: &GitHubIssue,
    comments: &[GitHubComment],
    mut localize: F,
) -> Result<String, LocalizeError>
where
    F: FnMut(&str) -> Result<String, LocalizeError>,
{
    let mut doc = String::new();

    doc.push_str(&format!("# {} {}\n\n", issue.number, issue.title));
    doc.push_str(&format!("### Reported by {}\n\n", issue.author()));
    doc.push_str(&format!("### State: {}\n\n", issue.state));
    doc.push_str("### Labels:\n");
    for label in &issue.labels {
        doc.push_str(&format!("{}\n{}\n", label.name, label.color));
    }
    doc.push('\n');

    let body = demote_headings(issue.body_text(), BODY_DEMOTION);
    doc.push_str(&localize(&body)?);
    doc.push_str("\n\n");

    for comment in comments {
        doc.push_str(&format!("### Comment from {}\n\n", comment.author()));
        let body = demote_headings(comment.body_text(), COMMENT_DEMOTION);
        doc.push_str(&localize(&body)?);
        doc.push_str("\n\n");
    }

    Ok(doc)
}
