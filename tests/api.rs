use axum::{body::{to_bytes, Body}, http::{header, Request, StatusCode}, Router};
use league_manager_lib::{db, logic::user::{Role, User}, routes};
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "admin-token";
const EDITOR_TOKEN: &str = "editor-token";

async fn app() -> Router {
    let db = db::memory().await.unwrap();
    db::bootstrap_admin(&db, "Admin", "admin@league.test", Some(ADMIN_TOKEN)).await.unwrap();

    let mut editor = User::build("Editor", "editor@league.test", Role::Editor);
    editor.api_token = EDITOR_TOKEN.to_string();
    editor.save(&db).await.unwrap();

    routes::router(db)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn public_pages_need_no_token() {
    let app = app().await;
    let (status, body) = send(&app, request("GET", "/api/leagues", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, request("GET", "/api/cups/42", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_check_the_token() {
    let app = app().await;

    let (status, _) = send(&app, request("GET", "/admin/teams", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request("GET", "/admin/teams", Some("wrong"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request("GET", "/admin/teams", Some(EDITOR_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Only admins manage users.
    let (status, _) = send(&app, request("GET", "/admin/users", Some(EDITOR_TOKEN), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("GET", "/admin/users", Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn new_users_see_their_token_once() {
    let app = app().await;
    let form = json!({ "name": "Kim", "email": "kim@league.test" });

    let (status, body) = send(&app, request("POST", "/admin/users", Some(ADMIN_TOKEN), Some(form))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "Editor");
    let token = body["api_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let (status, body) = send(&app, request("GET", &format!("/admin/users/{}", body["id"]), Some(ADMIN_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("api_token").is_none());

    let (status, _) = send(&app, request("GET", "/admin/leagues", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_input_lists_the_fields() {
    let app = app().await;

    let (status, body) = send(&app, request("POST", "/admin/teams", Some(EDITOR_TOKEN), Some(json!({ "full_name": " " })))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["full_name"], "is required");

    let cup = json!({ "name": "Broken", "no_of_teams": 1, "random_pairing": false, "rounds": null, "legs": 1, "win_only": false });
    let (status, _) = send(&app, request("POST", "/admin/cups", Some(EDITOR_TOKEN), Some(cup))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn a_cup_is_drawn_over_http() {
    let app = app().await;

    let mut ids = Vec::new();
    for name in ["North", "South", "East", "West"] {
        let (status, body) = send(&app, request("POST", "/admin/teams", Some(EDITOR_TOKEN), Some(json!({ "full_name": name })))).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["id"].clone());
    }

    let cup = json!({ "name": "Shield", "no_of_teams": 4, "random_pairing": false, "rounds": null, "legs": 1, "win_only": false });
    let (status, body) = send(&app, request("POST", "/admin/cups", Some(EDITOR_TOKEN), Some(cup))).await;
    assert_eq!(status, StatusCode::CREATED);
    let cup_id = body["id"].clone();

    let (status, _) = send(&app, request("PUT", &format!("/admin/cups/{cup_id}/teams"), Some(EDITOR_TOKEN), Some(json!({ "teams": ids })))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, request("POST", &format!("/admin/cups/{cup_id}/generate"), Some(EDITOR_TOKEN), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rounds"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, request("GET", &format!("/api/cups/{cup_id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cup"]["name"], "Shield");
}
