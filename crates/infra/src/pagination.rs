//! Cursor pagination over `{results, cursor_id}` listings

use pingintel_domain::{CursorPage, Result};
use tracing::debug;

/// Iterator over the pages of a cursor-paginated listing.
///
/// `fetch` receives `None` for the first page and the previous page's
/// `cursor_id` afterwards. Iteration stops after a page without a cursor, an
/// empty page, or the first error.
pub struct CursorPager<T, F>
where
    F: FnMut(Option<&str>) -> Result<CursorPage<T>>,
{
    fetch: F,
    cursor: Option<String>,
    finished: bool,
    remaining_pages: Option<usize>,
}

impl<T, F> CursorPager<T, F>
where
    F: FnMut(Option<&str>) -> Result<CursorPage<T>>,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch, cursor: None, finished: false, remaining_pages: None }
    }

    /// Stop after `pages` pages even if the server has more.
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.remaining_pages = Some(pages);
        self
    }

    /// Collect every row of every page.
    pub fn collect_rows(self) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        for page in self {
            rows.extend(page?.results);
        }
        Ok(rows)
    }
}

impl<T, F> Iterator for CursorPager<T, F>
where
    F: FnMut(Option<&str>) -> Result<CursorPage<T>>,
{
    type Item = Result<CursorPage<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining_pages == Some(0) {
            return None;
        }
        if let Some(remaining) = self.remaining_pages.as_mut() {
            *remaining -= 1;
        }

        match (self.fetch)(self.cursor.as_deref()) {
            Ok(page) => {
                self.cursor = page.next_cursor().map(str::to_string);
                debug!(
                    rows = page.results.len(),
                    next_cursor = self.cursor.as_deref().unwrap_or_default(),
                    remaining = ?page.remaining_count,
                    "Fetched page"
                );
                self.finished = self.cursor.is_none();
                Some(Ok(page))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pingintel_domain::PingError;

    use super::*;

    fn page(rows: &[u32], cursor: Option<&str>) -> CursorPage<u32> {
        CursorPage {
            results: rows.to_vec(),
            cursor_id: cursor.map(str::to_string),
            prev_cursor_id: None,
            remaining_count: None,
        }
    }

    #[test]
    fn follows_cursors_until_absent() {
        let mut seen = Vec::new();
        let rows = CursorPager::new(|cursor: Option<&str>| {
            seen.push(cursor.map(str::to_string));
            Ok(match cursor {
                None => page(&[1, 2], Some("c2")),
                Some("c2") => page(&[3], Some("c3")),
                _ => page(&[4], None),
            })
        })
        .collect_rows()
        .unwrap();

        assert_eq!(rows, vec![1, 2, 3, 4]);
        assert_eq!(seen, vec![None, Some("c2".to_string()), Some("c3".to_string())]);
    }

    #[test]
    fn empty_page_stops_even_with_cursor() {
        let mut calls = 0;
        let pages: Vec<_> = CursorPager::new(|_: Option<&str>| {
            calls += 1;
            Ok(page(&[], Some("again")))
        })
        .collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn error_ends_iteration() {
        let mut pager = CursorPager::new(|cursor: Option<&str>| match cursor {
            None => Ok(page(&[1], Some("next"))),
            Some(_) => Err(PingError::Transport { status: 404, body: String::new() }),
        });
        assert!(pager.next().unwrap().is_ok());
        assert!(pager.next().unwrap().is_err());
        assert!(pager.next().is_none());
    }

    #[test]
    fn max_pages_limits_requests() {
        let pages =
            CursorPager::new(|_: Option<&str>| Ok(page(&[1], Some("more")))).max_pages(3).count();
        assert_eq!(pages, 3);
    }
}
