use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use catalogd::api::{build_router, AppState, REQUEST_ID_HEADER};
use catalogd::catalog;
use catalogd::config::Config;
use catalogd::db;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn seed_article(conn: &Connection, id: i64, input_code: &str, exists: Option<bool>) {
    conn.execute(
        "INSERT INTO articles(id, input_code, article_id, article_no, product_name,
            article_exists, supplier_id, created_at, updated_at)
         VALUES(?, ?, ?, ?, 'Part', ?, 1, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        (
            id,
            input_code,
            format!("ext-{}", id),
            format!("NO-{}", id),
            exists.map(|b| if b { 1 } else { 0 }),
        ),
    )
    .expect("insert article");
}

/// Seven articles over four groups plus fourteen import failures.
fn seed_fixture(conn: &Connection) {
    conn.execute("INSERT INTO suppliers(id, name) VALUES(1, 'BOSCH')", [])
        .expect("insert supplier");
    seed_article(conn, 1, "A", None);
    seed_article(conn, 2, "A", None);
    seed_article(conn, 3, "B", None);
    seed_article(conn, 4, "B", None);
    seed_article(conn, 5, "C", None);
    seed_article(conn, 6, "C", Some(true));
    seed_article(conn, 7, "D", Some(false));
    conn.execute(
        "INSERT INTO oem_numbers(article_id, oem_brand, oem_number) VALUES(1, 'RENAULT', '8200')",
        [],
    )
    .expect("insert oem");

    for i in 1..=14 {
        conn.execute(
            "INSERT INTO not_found_articles(id, code, designation, status, created_at)
             VALUES(?, ?, NULL, 'not_found', ?)",
            (i, format!("NF{:02}", i), format!("2024-02-{:02}T08:00:00Z", i)),
        )
        .expect("insert not found");
    }
}

fn setup(prefix: &str, config: &Config) -> (Connection, Router) {
    let path = temp_dir(prefix).join("catalog.sqlite3");
    let conn = db::open_db(&path).expect("open db");
    seed_fixture(&conn);
    let app = build_router(
        AppState::new(db::open_db(&path).expect("open app db")),
        config,
    );
    (conn, app)
}

async fn get_raw(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = get_raw(app, uri).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn codes(body: &Value) -> Vec<String> {
    body["articles"]
        .as_array()
        .expect("articles")
        .iter()
        .map(|a| a["code"].as_str().expect("code").to_string())
        .collect()
}

#[tokio::test]
async fn not_found_list_pages_newest_first() {
    let (_conn, app) = setup("catalogd-not-found-list", &Config::default());

    let (status, body) = get_json(&app, "/api/not-found-articles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalArticles"], 14);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["currentPage"], 1);
    let first = codes(&body);
    assert_eq!(first.len(), 12);
    assert_eq!(first[0], "NF14");
    assert_eq!(first[11], "NF03");
    assert!(body["articles"][0]["designation"].is_null());

    let (_, body) = get_json(&app, "/api/not-found-articles?page=2").await;
    assert_eq!(codes(&body), vec!["NF02", "NF01"]);
    assert_eq!(body["hasMore"], false);

    let (_, body) = get_json(&app, "/api/not-found-articles?page=7").await;
    assert_eq!(body["currentPage"], 2);
    let (_, body) = get_json(&app, "/api/not-found-articles?page=-3").await;
    assert_eq!(body["currentPage"], 1);
}

#[test]
fn not_found_page_windows_newest_first() {
    let path = temp_dir("catalogd-not-found-page").join("catalog.sqlite3");
    let conn = db::open_db(&path).expect("open db");
    seed_fixture(&conn);

    let page = catalog::not_found_page(&conn, 12, 12).expect("page");
    let codes: Vec<&str> = page.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["NF02", "NF01"]);
    assert!(catalog::not_found_page(&conn, 40, 12).expect("past end").is_empty());
    assert_eq!(catalog::not_found_count(&conn).expect("count"), 14);
}

#[tokio::test]
async fn not_found_list_of_empty_table() {
    let path = temp_dir("catalogd-not-found-empty").join("catalog.sqlite3");
    let app = build_router(
        AppState::new(db::open_db(&path).expect("open db")),
        &Config::default(),
    );

    let (status, body) = get_json(&app, "/api/not-found-articles?page=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "articles": [], "totalArticles": 0, "hasMore": false, "currentPage": 1 })
    );
}

#[tokio::test]
async fn stats_count_flag_states_and_import_failures() {
    let (_conn, app) = setup("catalogd-stats", &Config::default());

    let (status, body) = get_json(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 7, "existing": 1, "notExisting": 1, "unmarked": 5, "notFound": 14 })
    );
}

#[tokio::test]
async fn filter_counts_follow_group_classification() {
    let (conn, app) = setup("catalogd-filter-counts", &Config::default());

    let (status, body) = get_json(&app, "/api/filter-counts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "all": 2,
            "renaultNissanDacia": 2,
            "renaultNissanDaciaOnly": 0,
            "noOem": 1,
            "single": 1,
        })
    );

    // After a reset every group is unmarked again: A, B, C multiple and D single.
    let reset = catalog::reset_all_flags(&conn).expect("reset");
    assert_eq!(reset, 7);
    let (_, body) = get_json(&app, "/api/filter-counts").await;
    assert_eq!(body["all"], 3);
    assert_eq!(body["single"], 1);
    let (_, body) = get_json(&app, "/api/stats").await;
    assert_eq!(body["unmarked"], 7);
    assert_eq!(body["existing"], 0);
}

#[tokio::test]
async fn health_reports_ok_and_responses_carry_request_id() {
    let (_conn, app) = setup("catalogd-health", &Config::default());

    let resp = get_raw(&app, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let request_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("request id header")
        .to_string();
    assert_eq!(request_id.len(), 36);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let again = get_raw(&app, "/health").await;
    let second = again
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("request id header");
    assert_ne!(second, request_id);
}

#[tokio::test]
async fn unknown_routes_get_json_not_found() {
    let (_conn, app) = setup("catalogd-unknown-route", &Config::default());

    let (status, body) = get_json(&app, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/articles/update")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn supplier_logos_are_served_from_the_image_dir() {
    let images = temp_dir("catalogd-logo-files");
    std::fs::write(images.join("BOSCH.jpg"), b"\xff\xd8\xff\xe0fake").expect("write logo");
    let config = Config {
        image_dir: images,
        ..Config::default()
    };
    let (_conn, app) = setup("catalogd-logo-serve", &config);

    let (_, body) = get_json(&app, "/api/articles").await;
    let logo = body["groups"][0]["articles"][0]["supplier"]["logo"]
        .as_str()
        .expect("logo")
        .to_string();
    assert_eq!(logo, "/images/suppliers/BOSCH.jpg");

    let resp = get_raw(&app, &logo).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&bytes[..], b"\xff\xd8\xff\xe0fake");

    let resp = get_raw(&app, "/images/suppliers/MISSING.jpg").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
