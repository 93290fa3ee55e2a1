//! Built-in checks for the pure rewriting logic, run with `--test`.

use crate::layout::IMAGES_DIR;
use crate::localize::{rewrite_images, LocalizeError};
use crate::render::{demote_headings, BODY_DEMOTION, COMMENT_DEMOTION};

/// What a check expects the rewrite to produce
enum Expect {
    Text(&'static str),
    MissingExtension,
}

struct Check {
    name: &'static str,
    input: &'static str,
    expect: Expect,
}

const IMAGE_CHECKS: &[Check] = &[
    Check {
        name: "image reference is rewritten to the md5-named local copy",
        input: "an image coming up ![caption](http://blah/a/foo.png)",
        expect: Expect::Text(
            "an image coming up ![caption](images/b62082dd8a02ea495f5e3c293eb6ee67.png)",
        ),
    },
    Check {
        name: "query string is dropped from the extension",
        input: "![shot](https://example.com/shot.JPG?raw=true)",
        expect: Expect::Text("![shot](images/a1b120fe132ca6b058c56a41ecaa54c0.JPG)"),
    },
    Check {
        name: "local reference is left alone",
        input: "![caption](images/b62082dd8a02ea495f5e3c293eb6ee67.png)",
        expect: Expect::Text("![caption](images/b62082dd8a02ea495f5e3c293eb6ee67.png)"),
    },
    Check {
        name: "plain link is left alone",
        input: "[notes](http://blah/a/notes.txt)",
        expect: Expect::Text("[notes](http://blah/a/notes.txt)"),
    },
    Check {
        name: "url without extension is rejected",
        input: "![x](https://github.com/user-attachments/assets/7d1c)",
        expect: Expect::MissingExtension,
    },
];

/// Result of one check
#[derive(Debug)]
pub struct Outcome {
    pub name: &'static str,
    /// `None` when the check passed, otherwise what went wrong
    pub failure: Option<String>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

fn run_image_check(check: &Check) -> Outcome {
    let actual = rewrite_images(check.input, IMAGES_DIR).map(|(text, _)| text);
    let failure = match (&check.expect, actual) {
        (Expect::Text(expected), Ok(text)) if text == *expected => None,
        (Expect::Text(expected), Ok(text)) => {
            Some(format!("expected {:?}, got {:?}", expected, text))
        }
        (Expect::Text(_), Err(e)) => Some(format!("unexpected error: {}", e)),
        (Expect::MissingExtension, Err(LocalizeError::MissingExtension { .. })) => None,
        (Expect::MissingExtension, Ok(text)) => {
            Some(format!("expected a missing-extension error, got {:?}", text))
        }
        (Expect::MissingExtension, Err(e)) => Some(format!("wrong error: {}", e)),
    };
    Outcome {
        name: check.name,
        failure,
    }
}

fn run_idempotence_check() -> Outcome {
    let input = "![a](http://blah/a/foo.png) and ![b](https://example.com/shot.JPG?raw=true)";
    let failure = match rewrite_images(input, IMAGES_DIR) {
        Ok((once, _)) => match rewrite_images(&once, IMAGES_DIR) {
            Ok((twice, _)) if twice == once => None,
            Ok((twice, _)) => Some(format!("second pass changed {:?} to {:?}", once, twice)),
            Err(e) => Some(format!("second pass failed: {}", e)),
        },
        Err(e) => Some(format!("first pass failed: {}", e)),
    };
    Outcome {
        name: "rewriting its own output changes nothing",
        failure,
    }
}

fn run_heading_check(name: &'static str, levels: usize, expected: &str) -> Outcome {
    let actual = demote_headings("# Heading\ntext", levels);
    Outcome {
        name,
        failure: (actual != expected)
            .then(|| format!("expected {:?}, got {:?}", expected, actual)),
    }
}

/// Run every check
pub fn run() -> Vec<Outcome> {
    let mut outcomes: Vec<Outcome> = IMAGE_CHECKS.iter().map(run_image_check).collect();
    outcomes.push(run_idempotence_check());
    outcomes.push(run_heading_check(
        "issue body headings gain one level",
        BODY_DEMOTION,
        "## Heading\ntext",
    ));
    outcomes.push(run_heading_check(
        "comment headings gain three levels",
        COMMENT_DEMOTION,
        "#### Heading\ntext",
    ));
    outcomes
}
