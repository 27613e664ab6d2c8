use httpmock::prelude::*;
use serde_json::json;
use tokio::sync::mpsc;

use crate::client::{ApiClient, ClientError, ClientOptions, ListResponse};
use crate::output;
use crate::pagination::{NavState, PageRequest};
use crate::query::{FilterSet, ListKind};
use crate::view::{Applied, ListView, ResponseOrder, Screen, Ticket};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ClientOptions {
        base_url: server.url("/api/v1"),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn rules_lookup_by_gid_and_sid_renders_single_row() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/rules")
                .query_param("page", "1")
                .query_param("gid", "1")
                .query_param("sid", "2000001");
            then.status(200).json_body(json!({
                "results": [{
                    "id": 5, "gid": 1, "sid": 2000001, "rev": 3,
                    "action": "alert", "msg": "test"
                }],
                "next": null,
                "previous": null
            }));
        })
        .await;

    let client = client_for(&server);
    let mut view = ListView::new(ListKind::Rules, ResponseOrder::default());
    let filters = FilterSet::new(ListKind::Rules)
        .with("gid", "1")
        .unwrap()
        .with("sid", "2000001")
        .unwrap()
        .with("action", "  ")
        .unwrap();
    let dispatch = view.submit(filters).unwrap();

    let url = client.list_url(ListKind::Rules, &dispatch.request).unwrap();
    assert_eq!(url.query(), Some("page=1&gid=1&sid=2000001"));

    assert_eq!(view.run(&client, dispatch).await, Applied::Shown);
    mock.assert_async().await;

    let screen = view.screen();
    assert_eq!(
        screen.nav,
        Some(NavState {
            has_prev: false,
            has_next: false
        })
    );
    let table = output::items_table(ListKind::Rules, &screen.rows);
    assert_eq!(
        table.rows,
        vec![vec!["5", "1", "2000001", "3", "alert", "test"]]
    );
    assert!(view.next().is_none());
    assert!(view.previous().is_none());
}

#[tokio::test]
async fn bad_request_banner_replaces_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/events");
            then.status(400)
                .json_body(json!({"error": "Bad Request", "message": "bad sid"}));
        })
        .await;

    let client = client_for(&server);
    let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
    let dispatch = view
        .submit(FilterSet::new(ListKind::Events).with("sid", "abc").unwrap())
        .unwrap();
    view.run(&client, dispatch).await;

    assert_eq!(view.screen().banner.as_deref(), Some("Error: bad sid"));
    assert!(view.screen().rows.is_empty());
    assert_eq!(
        output::render_screen_text(ListKind::Events, view.screen(), view.page()),
        "Error: bad sid\n"
    );
}

#[tokio::test]
async fn network_failure_resets_the_screen_silently() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/events");
            then.status(200)
                .json_body(json!({"results": [{"id": 1}], "next": "http://x/next"}));
        })
        .await;

    let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
    let dispatch = view.refresh();
    view.run(&client_for(&server), dispatch).await;
    assert_eq!(view.screen().rows.len(), 1);

    let dead = ApiClient::new(&ClientOptions {
        base_url: "http://127.0.0.1:1/api/v1".to_string(),
        timeout_seconds: 2,
        ..Default::default()
    })
    .unwrap();
    let dispatch = view.next().unwrap();
    view.run(&dead, dispatch).await;

    assert_eq!(view.screen(), &Screen::default());
    assert_eq!(
        output::render_screen_text(ListKind::Events, view.screen(), view.page()),
        ""
    );
}

#[tokio::test]
async fn requests_log_follows_server_supplied_next_url() {
    let server = MockServer::start_async().await;
    let next_url = server.url("/api/v1/requests-log?page=2&period_start=2024-01-01&token=abc");
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/requests-log")
                .query_param("page", "1")
                .query_param("period_start", "2024-01-01");
            then.status(200).json_body(json!({
                "results": [{"id": 1, "endpoint": "/api/v1/rules"}],
                "next": next_url,
                "previous": null
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/requests-log")
                .query_param("page", "2")
                .query_param("token", "abc");
            then.status(200).json_body(json!({
                "results": [{"id": 2, "endpoint": "/api/v1/events"}],
                "next": null,
                "previous": "http://elsewhere/requests-log?page=1"
            }));
        })
        .await;

    let client = client_for(&server);
    let mut view = ListView::new(ListKind::RequestsLog, ResponseOrder::default());
    let dispatch = view
        .submit(
            FilterSet::new(ListKind::RequestsLog)
                .with("period_start", "2024-01-01")
                .unwrap(),
        )
        .unwrap();
    view.run(&client, dispatch).await;
    first.assert_async().await;

    let dispatch = view.next().unwrap();
    assert!(matches!(dispatch.request, PageRequest::Url(ref url) if url.contains("token=abc")));
    view.run(&client, dispatch).await;
    second.assert_async().await;

    assert_eq!(view.screen().rows[0]["id"], json!(2));
    assert_eq!(
        view.previous().map(|d| d.request),
        Some(PageRequest::Url(
            "http://elsewhere/requests-log?page=1".to_string()
        ))
    );
}

#[tokio::test]
async fn spawned_fetches_resolve_through_ticket_order() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/rules").query_param("action", "drop");
            then.status(200)
                .delay(std::time::Duration::from_millis(300))
                .json_body(json!({"results": [{"id": 1, "action": "drop"}]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/rules").query_param("action", "alert");
            then.status(200)
                .json_body(json!({"results": [{"id": 2, "action": "alert"}]}));
        })
        .await;

    let client = client_for(&server);
    let mut view = ListView::new(ListKind::Rules, ResponseOrder::LatestIssued);
    let (tx, mut rx) = mpsc::channel::<(Ticket, Result<ListResponse, ClientError>)>(4);

    for action in ["drop", "alert"] {
        let dispatch = view
            .submit(FilterSet::new(ListKind::Rules).with("action", action).unwrap())
            .unwrap();
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = client.fetch_list(ListKind::Rules, &dispatch.request).await;
            let _ = tx.send((dispatch.ticket, outcome)).await;
        });
    }
    drop(tx);

    let mut applied = Vec::new();
    while let Some((ticket, outcome)) = rx.recv().await {
        applied.push(view.complete(ticket, outcome));
    }
    assert_eq!(applied, vec![Applied::Shown, Applied::Stale]);
    assert_eq!(view.screen().rows[0]["action"], json!("alert"));
}

#[tokio::test]
async fn html_screen_escapes_server_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/events");
            then.status(200).json_body(json!({
                "results": [{"id": 9, "msg": "<script>alert(1)</script>"}],
                "next": null,
                "previous": null
            }));
        })
        .await;

    let mut view = ListView::new(ListKind::Events, ResponseOrder::default());
    let dispatch = view.refresh();
    view.run(&client_for(&server), dispatch).await;

    let html = String::from_utf8(output::report::render_screen_html(
        ListKind::Events,
        view.screen(),
        view.page(),
    ))
    .unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}
