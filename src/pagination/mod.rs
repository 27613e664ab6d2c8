//! Cursor-style navigation over the paginated listings.
//!
//! The server never reports a page count; it only says whether a next or
//! previous page exists. Two strategies turn that into navigation:
//! [`PageNumberPager`] recomputes a page number locally, [`LinkPager`]
//! follows the URLs the server hands back.

use serde::{Deserialize, Serialize};

use crate::query::{build_query, FilterSet, PageCursor, Query};

/// Which navigation controls are enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavState {
    pub has_prev: bool,
    pub has_next: bool,
}

/// The `next`/`previous` links of a list response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl PageLinks {
    pub fn nav(&self) -> NavState {
        NavState {
            has_prev: self.previous.is_some(),
            has_next: self.next.is_some(),
        }
    }
}

/// What to fetch for a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRequest {
    Query(Query),
    Url(String),
}

pub trait Pager: Send {
    /// Start over from page one with a new filter set.
    fn submit(&mut self, filters: &FilterSet) -> PageRequest;

    fn next(&mut self, filters: &FilterSet) -> Option<PageRequest>;

    fn previous(&mut self, filters: &FilterSet) -> Option<PageRequest>;

    /// Go straight to a page number; `None` for strategies without one.
    fn jump(&mut self, _filters: &FilterSet, _page: u32) -> Option<PageRequest> {
        None
    }

    /// Record the links of a response that was shown.
    fn observe(&mut self, links: &PageLinks);

    /// Forget server state after a failed request.
    fn invalidate(&mut self) {}

    /// Current page number, when the strategy tracks one.
    fn page(&self) -> Option<u32> {
        None
    }
}

/// Client-recomputed page numbers; `next`/`previous` are presence flags only.
#[derive(Clone, Debug, Default)]
pub struct PageNumberPager {
    cursor: PageCursor,
}

impl PageNumberPager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pager for PageNumberPager {
    fn submit(&mut self, filters: &FilterSet) -> PageRequest {
        self.cursor.reset();
        PageRequest::Query(build_query(filters, self.cursor))
    }

    fn next(&mut self, filters: &FilterSet) -> Option<PageRequest> {
        self.cursor.advance();
        Some(PageRequest::Query(build_query(filters, self.cursor)))
    }

    fn previous(&mut self, filters: &FilterSet) -> Option<PageRequest> {
        if !self.cursor.retreat() {
            return None;
        }
        Some(PageRequest::Query(build_query(filters, self.cursor)))
    }

    fn jump(&mut self, filters: &FilterSet, page: u32) -> Option<PageRequest> {
        self.cursor = PageCursor::at(page);
        Some(PageRequest::Query(build_query(filters, self.cursor)))
    }

    fn observe(&mut self, _links: &PageLinks) {}

    fn page(&self) -> Option<u32> {
        Some(self.cursor.get())
    }
}

/// Follows the exact `next`/`previous` URLs returned by the server.
#[derive(Clone, Debug, Default)]
pub struct LinkPager {
    links: PageLinks,
}

impl LinkPager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pager for LinkPager {
    fn submit(&mut self, filters: &FilterSet) -> PageRequest {
        self.links = PageLinks::default();
        PageRequest::Query(build_query(filters, PageCursor::first()))
    }

    fn next(&mut self, _filters: &FilterSet) -> Option<PageRequest> {
        self.links.next.clone().map(PageRequest::Url)
    }

    fn previous(&mut self, _filters: &FilterSet) -> Option<PageRequest> {
        self.links.previous.clone().map(PageRequest::Url)
    }

    fn observe(&mut self, links: &PageLinks) {
        self.links = links.clone();
    }

    fn invalidate(&mut self) {
        self.links = PageLinks::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ListKind;

    fn rules_filters() -> FilterSet {
        FilterSet::new(ListKind::Rules).with("gid", "1").unwrap()
    }

    fn page_of(request: &PageRequest) -> Option<&str> {
        match request {
            PageRequest::Query(query) => query.get("page"),
            PageRequest::Url(_) => None,
        }
    }

    #[test]
    fn nav_follows_link_presence() {
        let links = PageLinks {
            next: None,
            previous: Some("http://api/rules?page=1".to_string()),
        };
        assert_eq!(
            links.nav(),
            NavState {
                has_prev: true,
                has_next: false
            }
        );
    }

    #[test]
    fn page_number_previous_is_noop_on_first_page() {
        let filters = rules_filters();
        let mut pager = PageNumberPager::new();
        pager.submit(&filters);
        assert!(pager.previous(&filters).is_none());
        assert_eq!(pager.page(), Some(1));
    }

    #[test]
    fn page_number_next_keeps_filters() {
        let filters = rules_filters();
        let mut pager = PageNumberPager::new();
        pager.submit(&filters);
        let request = pager.next(&filters).unwrap();
        assert_eq!(page_of(&request), Some("2"));
        match request {
            PageRequest::Query(query) => assert_eq!(query.get("gid"), Some("1")),
            PageRequest::Url(_) => panic!("expected a query"),
        }
    }

    #[test]
    fn page_number_submit_resets_to_first_page() {
        let filters = rules_filters();
        let mut pager = PageNumberPager::new();
        let request = pager.jump(&filters, 4).unwrap();
        assert_eq!(page_of(&request), Some("4"));
        let request = pager.submit(&filters);
        assert_eq!(page_of(&request), Some("1"));
        assert_eq!(pager.page(), Some(1));
    }

    #[test]
    fn link_pager_follows_server_urls() {
        let filters = FilterSet::new(ListKind::RequestsLog);
        let mut pager = LinkPager::new();
        assert!(pager.next(&filters).is_none());
        pager.observe(&PageLinks {
            next: Some("http://api/requests-log?page=3&period_start=a".to_string()),
            previous: Some("http://api/requests-log?period_start=a".to_string()),
        });
        assert_eq!(
            pager.next(&filters),
            Some(PageRequest::Url(
                "http://api/requests-log?page=3&period_start=a".to_string()
            ))
        );
        assert_eq!(
            pager.previous(&filters),
            Some(PageRequest::Url(
                "http://api/requests-log?period_start=a".to_string()
            ))
        );
        pager.invalidate();
        assert!(pager.previous(&filters).is_none());
    }
}
