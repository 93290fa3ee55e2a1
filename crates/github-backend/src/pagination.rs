/// Page size used for every listing request
pub const PAGE_SIZE: usize = 100;

/// One page of a paginated GitHub listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the `Link` response header advertised a `rel="next"` page
    pub has_next: bool,
}

impl<T> Page<T> {
    /// A page ends the traversal when it is empty or nothing follows it
    pub fn is_last(&self) -> bool {
        self.items.is_empty() || !self.has_next
    }
}

/// Check a `Link` header value for a `rel="next"` relation.
///
/// GitHub sends entries like
/// `<https://api.github.com/...&page=2>; rel="next", <...&page=5>; rel="last"`.
pub fn link_has_next(link: &str) -> bool {
    link.split(',').any(|entry| {
        entry.split(';').skip(1).any(|param| {
            let param = param.trim();
            match param.strip_prefix("rel=") {
                Some(rel) => rel
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|r| r == "next"),
                None => false,
            }
        })
    })
}

/// Walk a paginated listing from page 1 until a page reports it is the last
pub fn fetch_all_pages<T, E, F>(mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize) -> Result<Page<T>, E>,
{
    let mut all_results = Vec::new();
    let mut page = 1;

    loop {
        let current = fetch_page(page)?;
        let last = current.is_last();
        all_results.extend(current.items);
        if last {
            break;
        }
        page += 1;
    }

    Ok(all_results)
}
