//! Per-view list state: filters, pager, and what is currently on screen.
//!
//! A [`ListView`] hands out [`Dispatch`]es (a ticket plus what to fetch) and
//! takes back outcomes through [`ListView::complete`]. Whether a late
//! response may overwrite a newer one is decided by [`ResponseOrder`].

use tracing::{debug, warn};

use crate::client::{ApiClient, ClientError, Item, ListResponse};
use crate::pagination::{LinkPager, NavState, PageNumberPager, PageRequest, Pager};
use crate::query::{FilterSet, ListKind, QueryError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseOrder {
    /// Drop responses to requests that were superseded before they completed.
    #[default]
    LatestIssued,
    /// Show whatever completes last, even if it answers an older request.
    LastArrival,
}

impl ResponseOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "latest-issued" | "latest_issued" | "latest" => Some(Self::LatestIssued),
            "last-arrival" | "last_arrival" | "last" => Some(Self::LastArrival),
            _ => None,
        }
    }
}

/// Rendered state of a list view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Screen {
    pub rows: Vec<Item>,
    /// `None` while the navigation controls are hidden.
    pub nav: Option<NavState>,
    pub banner: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub request: PageRequest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Shown,
    Stale,
}

fn default_pager(kind: ListKind) -> Box<dyn Pager> {
    match kind {
        ListKind::Events | ListKind::Rules => Box::new(PageNumberPager::new()),
        ListKind::RequestsLog => Box::new(LinkPager::new()),
    }
}

pub struct ListView {
    kind: ListKind,
    filters: FilterSet,
    pager: Box<dyn Pager>,
    order: ResponseOrder,
    issued: u64,
    screen: Screen,
}

impl ListView {
    pub fn new(kind: ListKind, order: ResponseOrder) -> Self {
        Self {
            kind,
            filters: FilterSet::new(kind),
            pager: default_pager(kind),
            order,
            issued: 0,
            screen: Screen::default(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn page(&self) -> Option<u32> {
        self.pager.page()
    }

    /// Commit a new filter set and go back to page one.
    pub fn submit(&mut self, filters: FilterSet) -> Result<Dispatch, QueryError> {
        if filters.kind() != self.kind {
            return Err(QueryError::WrongView {
                got: filters.kind().label(),
                expected: self.kind.label(),
            });
        }
        self.filters = filters;
        let request = self.pager.submit(&self.filters);
        Ok(self.issue(request))
    }

    /// Like [`ListView::submit`] but lands on `page` when the pager counts pages.
    pub fn submit_at(&mut self, filters: FilterSet, page: u32) -> Result<Dispatch, QueryError> {
        let dispatch = self.submit(filters)?;
        if page <= 1 {
            return Ok(dispatch);
        }
        match self.pager.jump(&self.filters, page) {
            Some(request) => Ok(self.issue(request)),
            None => Ok(dispatch),
        }
    }

    /// Re-run the committed filters from page one.
    pub fn refresh(&mut self) -> Dispatch {
        let request = self.pager.submit(&self.filters);
        self.issue(request)
    }

    /// `None` when the next control is disabled.
    pub fn next(&mut self) -> Option<Dispatch> {
        if !self.screen.nav.is_some_and(|nav| nav.has_next) {
            return None;
        }
        let request = self.pager.next(&self.filters)?;
        Some(self.issue(request))
    }

    /// `None` when the previous control is disabled or already on page one.
    pub fn previous(&mut self) -> Option<Dispatch> {
        if !self.screen.nav.is_some_and(|nav| nav.has_prev) {
            return None;
        }
        let request = self.pager.previous(&self.filters)?;
        Some(self.issue(request))
    }

    fn issue(&mut self, request: PageRequest) -> Dispatch {
        self.issued += 1;
        Dispatch {
            ticket: Ticket(self.issued),
            request,
        }
    }

    /// Apply the outcome of a dispatched request to the screen.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ListResponse, ClientError>,
    ) -> Applied {
        if self.order == ResponseOrder::LatestIssued && ticket.0 < self.issued {
            debug!(
                view = self.kind.label(),
                ticket = ticket.0,
                latest = self.issued,
                "dropping superseded response"
            );
            return Applied::Stale;
        }

        match outcome {
            Ok(page) => {
                let links = page.links();
                self.pager.observe(&links);
                self.screen = Screen {
                    rows: page.results,
                    nav: Some(links.nav()),
                    banner: None,
                };
            }
            Err(e) => {
                self.pager.invalidate();
                let banner = e.banner();
                if banner.is_none() {
                    warn!(view = self.kind.label(), error = %e, "list request failed");
                }
                self.screen = Screen {
                    rows: Vec::new(),
                    nav: None,
                    banner,
                };
            }
        }
        Applied::Shown
    }

    /// Fetch a dispatch and apply it.
    pub async fn run(&mut self, client: &ApiClient, dispatch: Dispatch) -> Applied {
        let outcome = client.fetch_list(self.kind, &dispatch.request).await;
        self.complete(dispatch.ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn page(value: serde_json::Value) -> ListResponse {
        serde_json::from_value(value).unwrap()
    }

    fn page_param(dispatch: &Dispatch) -> Option<String> {
        match &dispatch.request {
            PageRequest::Query(query) => query.get("page").map(str::to_string),
            PageRequest::Url(_) => None,
        }
    }

    fn decode_error() -> ClientError {
        ClientError::Decode {
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        }
    }

    #[test]
    fn previous_link_only_enables_previous() {
        let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
        let d = view.refresh();
        view.complete(
            d.ticket,
            Ok(page(json!({
                "results": [{"id": 1}],
                "next": null,
                "previous": "http://127.0.0.1:8000/api/v1/events?page=1"
            }))),
        );
        assert_eq!(
            view.screen().nav,
            Some(NavState {
                has_prev: true,
                has_next: false
            })
        );
        assert_eq!(view.screen().rows.len(), 1);
        assert!(view.next().is_none());
    }

    #[test]
    fn bad_request_shows_banner_and_empties_table() {
        let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
        let d = view.refresh();
        view.complete(d.ticket, Ok(page(json!({"results": [{"id": 1}], "next": "x"}))));

        let d = view.refresh();
        view.complete(
            d.ticket,
            Err(ClientError::BadRequest {
                message: "bad sid".to_string(),
            }),
        );
        assert_eq!(view.screen().banner.as_deref(), Some("Error: bad sid"));
        assert!(view.screen().rows.is_empty());
        assert_eq!(view.screen().nav, None);
    }

    #[test]
    fn transport_failure_clears_without_banner() {
        let mut view = ListView::new(ListKind::Rules, ResponseOrder::default());
        let d = view.refresh();
        view.complete(
            d.ticket,
            Ok(page(json!({"results": [{"id": 1}, {"id": 2}], "next": "x"}))),
        );
        let d = view.next().unwrap();
        view.complete(d.ticket, Err(decode_error()));
        assert_eq!(view.screen(), &Screen::default());
    }

    #[test]
    fn success_clears_previous_banner() {
        let mut view = ListView::new(ListKind::Rules, ResponseOrder::default());
        let d = view.refresh();
        view.complete(
            d.ticket,
            Err(ClientError::Status {
                status: 503,
                message: None,
            }),
        );
        assert!(view.screen().banner.is_some());
        let d = view.refresh();
        view.complete(d.ticket, Ok(page(json!({"results": []}))));
        assert_eq!(view.screen().banner, None);
    }

    #[test]
    fn submit_resets_page_and_navigation_keeps_filters() {
        let mut view = ListView::new(ListKind::Rules, ResponseOrder::default());
        let filters = FilterSet::new(ListKind::Rules).with("action", "drop").unwrap();
        let d = view.submit(filters).unwrap();
        assert_eq!(page_param(&d).as_deref(), Some("1"));
        view.complete(d.ticket, Ok(page(json!({"results": [], "next": "x"}))));

        let d = view.next().unwrap();
        assert_eq!(page_param(&d).as_deref(), Some("2"));
        view.complete(
            d.ticket,
            Ok(page(json!({"results": [], "next": "x", "previous": "y"}))),
        );
        assert_eq!(view.filters().get("action"), Some("drop"));

        let d = view
            .submit(FilterSet::new(ListKind::Rules).with("gid", "3").unwrap())
            .unwrap();
        assert_eq!(page_param(&d).as_deref(), Some("1"));
        assert_eq!(view.page(), Some(1));
    }

    #[test]
    fn previous_is_noop_on_first_page() {
        let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
        let d = view.refresh();
        // A server may report a previous link even on page one.
        view.complete(
            d.ticket,
            Ok(page(json!({"results": [], "previous": "http://x/"}))),
        );
        assert!(view.previous().is_none());
        assert_eq!(view.page(), Some(1));
    }

    #[test]
    fn submit_at_starts_on_the_requested_page() {
        let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
        let d = view
            .submit_at(FilterSet::new(ListKind::Events).with("sid", "7").unwrap(), 4)
            .unwrap();
        assert_eq!(page_param(&d).as_deref(), Some("4"));
        assert_eq!(view.page(), Some(4));
        view.complete(
            d.ticket,
            Ok(page(json!({"results": [], "next": "x", "previous": "y"}))),
        );
        let d = view.previous().unwrap();
        assert_eq!(page_param(&d).as_deref(), Some("3"));
    }

    #[test]
    fn submit_rejects_filters_of_another_view() {
        let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
        let err = view.submit(FilterSet::new(ListKind::Rules)).unwrap_err();
        assert!(matches!(err, QueryError::WrongView { .. }));
    }

    #[test]
    fn latest_issued_drops_stale_responses() {
        let mut view = ListView::new(ListKind::Rules, ResponseOrder::LatestIssued);
        let first = view.refresh();
        let second = view.refresh();
        assert_eq!(
            view.complete(second.ticket, Ok(page(json!({"results": [{"id": 2}]})))),
            Applied::Shown
        );
        assert_eq!(
            view.complete(first.ticket, Ok(page(json!({"results": [{"id": 1}]})))),
            Applied::Stale
        );
        assert_eq!(view.screen().rows[0]["id"], json!(2));
    }

    #[test]
    fn last_arrival_lets_late_responses_overwrite() {
        let mut view = ListView::new(ListKind::Rules, ResponseOrder::LastArrival);
        let first = view.refresh();
        let second = view.refresh();
        view.complete(second.ticket, Ok(page(json!({"results": [{"id": 2}]}))));
        assert_eq!(
            view.complete(first.ticket, Ok(page(json!({"results": [{"id": 1}]})))),
            Applied::Shown
        );
        assert_eq!(view.screen().rows[0]["id"], json!(1));
    }

    #[test]
    fn requests_log_threads_server_links() {
        let mut view = ListView::new(ListKind::RequestsLog, ResponseOrder::default());
        let d = view.refresh();
        view.complete(
            d.ticket,
            Ok(page(json!({
                "results": [],
                "next": "http://127.0.0.1:8000/api/v1/requests-log?page=2&period_start=2024-01-01"
            }))),
        );
        let d = view.next().unwrap();
        assert_eq!(
            d.request,
            PageRequest::Url(
                "http://127.0.0.1:8000/api/v1/requests-log?page=2&period_start=2024-01-01"
                    .to_string()
            )
        );
        assert_eq!(view.page(), None);
    }

    #[test]
    fn response_order_parses_names() {
        assert_eq!(
            ResponseOrder::parse("last-arrival"),
            Some(ResponseOrder::LastArrival)
        );
        assert_eq!(
            ResponseOrder::parse(" Latest "),
            Some(ResponseOrder::LatestIssued)
        );
        assert_eq!(ResponseOrder::parse("random"), None);
    }
}
