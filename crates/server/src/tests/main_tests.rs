use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use picker::{GridConfig, Round};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{SessionCreated, ViewModel},
};
use tower::ServiceExt;

fn test_app() -> Router {
    let api = ApiContext::in_memory(GridConfig::default()).expect("context");
    build_router(Arc::new(AppState { api }))
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn text_body(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// The `n`th pick link on a grid page.
fn pick_link(page: &str, n: usize) -> String {
    page.split("href=\"/pick/")
        .nth(n + 1)
        .and_then(|rest| rest.split('"').next())
        .map(|path| format!("/pick/{path}"))
        .expect("pick link")
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response).await, "ok");
}

#[tokio::test]
async fn json_session_runs_a_full_cycle() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/sessions", serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: SessionCreated = json_body(response).await;
    assert_eq!(created.view.cells.len(), 512);
    let base = format!("/api/sessions/{}", created.session_id);

    let picked = created.view.cells[3].hex.clone();
    let response = app
        .clone()
        .oneshot(post_json(&format!("{base}/select"), serde_json::json!({ "index": 3 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let view: ViewModel = json_body(response).await;
    assert_eq!(view.round, Round::Medium);
    assert_eq!(view.center_hex.as_deref(), Some(picked.as_str()));

    let second = view.cells[42].hex.clone();
    let response = app
        .clone()
        .oneshot(post_json(&format!("{base}/select"), serde_json::json!({ "hex": second })))
        .await
        .expect("response");
    let view: ViewModel = json_body(response).await;
    assert_eq!(view.round, Round::Fine);
    assert_eq!(view.cells.len(), 64);

    let third = view.cells[63].hex.clone();
    let response = app
        .clone()
        .oneshot(post_json(&format!("{base}/select"), serde_json::json!({ "index": 63 })))
        .await
        .expect("response");
    let view: ViewModel = json_body(response).await;
    assert_eq!(view.round, Round::Coarse);
    assert_eq!(view.last_selected_hex.as_deref(), Some(third.as_str()));

    let response = app
        .clone()
        .oneshot(post_json(&format!("{base}/background"), serde_json::json!({})))
        .await
        .expect("response");
    let view: ViewModel = json_body(response).await;
    assert!(view.background_is_reversed);
    assert_eq!(view.last_selected_hex.as_deref(), Some(third.as_str()));

    let delete = Request::delete(&base).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(delete).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let show = Request::get(&base).body(Body::empty()).expect("request");
    let response = app.oneshot(show).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::UnknownSession);
}

#[tokio::test]
async fn json_selection_errors_are_typed() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/api/sessions", serde_json::json!({})))
        .await
        .expect("response");
    let created: SessionCreated = json_body(response).await;
    let uri = format!("/api/sessions/{}/select", created.session_id);

    let response = app
        .clone()
        .oneshot(post_json(&uri, serde_json::json!({ "index": 512 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::InvalidSelection);

    let response = app
        .clone()
        .oneshot(post_json(&uri, serde_json::json!({ "hex": "#GGGGGG" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);

    let show = Request::get(format!("/api/sessions/{}", created.session_id))
        .body(Body::empty())
        .expect("request");
    let view: ViewModel = json_body(app.oneshot(show).await.expect("response")).await;
    assert_eq!(view.round, Round::Coarse);
}

#[tokio::test]
async fn first_visit_sets_a_session_cookie_and_renders_the_grid() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("picker_session="));
    let page = text_body(response).await;
    assert_eq!(page.matches("<td ").count(), 512);

    let response = app
        .oneshot(get_with_cookie("/", &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn browser_picks_narrow_then_announce_the_colour() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let cookie = session_cookie(&response);
    let mut page = text_body(response).await;

    for (round, n) in [(0, 3), (1, 7), (2, 11)] {
        let link = pick_link(&page, n);
        assert!(link.starts_with(&format!("/pick/{round}/")));
        let response = app
            .clone()
            .oneshot(get_with_cookie(&link, &cookie))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/"
        );
        let response = app
            .clone()
            .oneshot(get_with_cookie("/", &cookie))
            .await
            .expect("response");
        page = text_body(response).await;
    }

    assert!(page.contains("Last colour selected"));
}

#[tokio::test]
async fn stale_browser_pick_re_renders_the_current_grid() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let cookie = session_cookie(&response);
    let page = text_body(response).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/pick/0/000001", &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = text_body(response).await;
    assert!(body.contains("class=\"notice\""));
    assert_eq!(body.matches("<td ").count(), 512);
    assert_eq!(pick_link(&body, 0), pick_link(&page, 0));
}

#[tokio::test]
async fn pick_from_a_tab_left_behind_is_refused() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let cookie = session_cookie(&response);
    let first_tab = text_body(response).await;
    let second_tab = first_tab.clone();

    let response = app
        .clone()
        .oneshot(get_with_cookie(&pick_link(&second_tab, 100), &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(get_with_cookie(&pick_link(&first_tab, 3), &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = text_body(response).await;
    assert!(body.contains("class=\"notice\""));
    assert!(pick_link(&body, 0).starts_with("/pick/1/"));
}

#[tokio::test]
async fn reverse_link_toggles_the_page_colours() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get_with_cookie("/reverse", &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(get_with_cookie("/", &cookie))
        .await
        .expect("response");
    let page = text_body(response).await;
    assert!(page.contains("background: black; color: white;"));
}

#[tokio::test]
async fn unknown_browser_session_starts_over() {
    let app = test_app();
    let stale = format!("picker_session={}", shared::domain::SessionId::new());
    let response = app
        .oneshot(get_with_cookie("/pick/0/101010", &stale))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let fresh = session_cookie(&response);
    assert_ne!(fresh, stale);
}
