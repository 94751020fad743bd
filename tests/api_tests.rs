//! Integration tests for the user and session endpoints.
//!
//! Covers account creation, login, token refresh, revocation and the
//! access-token guarded update.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use chirpy::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "04234";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.service_api_key = "polka-test-key".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = chirpy::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    chirpy::api::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create_user(app: &Router, email: &str) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/users",
            &json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn login(app: &Router, email: &str, password: &str) -> Response {
    send(
        app,
        json_request(
            "POST",
            "/api/login",
            &json!({ "email": email, "password": password }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_create_user() {
    let app = spawn_app().await;

    let user = create_user(&app, "walt@example.com").await;
    assert_eq!(user["email"], "walt@example.com");
    assert_eq!(user["is_chirpy_red"], json!(false));
    assert!(user["id"].as_str().is_some());
    assert!(user.get("hashed_password").is_none());
    assert!(user.get("password").is_none());

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            &json!({ "email": "walt@example.com", "password": "other" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            &json!({ "email": "not-an-email", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            &json!({ "email": "jesse@example.com", "password": "" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_errors() {
    let app = spawn_app().await;
    create_user(&app, "walt@example.com").await;

    let response = login(&app, "walt@example.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "nobody@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_refresh_revoke_flow() {
    let app = spawn_app().await;
    let user = create_user(&app, "walt@example.com").await;

    let response = login(&app, "walt@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["id"], user["id"]);
    assert_eq!(data["email"], "walt@example.com");
    assert_eq!(data["is_chirpy_red"], json!(false));
    let access_token = data["token"].as_str().unwrap().to_string();
    let refresh_token = data["refresh_token"].as_str().unwrap().to_string();
    assert_eq!(access_token.split('.').count(), 3);
    assert_eq!(refresh_token.len(), 64);

    let response = send(&app, bearer_request("/api/refresh", &refresh_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert!(refreshed["data"]["token"].as_str().is_some());

    // An access token is not a refresh token.
    let response = send(&app, bearer_request("/api/refresh", &access_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, bearer_request("/api/revoke", &refresh_token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, bearer_request("/api/refresh", &refresh_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, bearer_request("/api/revoke", &refresh_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_only_affects_presented_token() {
    let app = spawn_app().await;
    create_user(&app, "walt@example.com").await;

    let first = body_json(login(&app, "walt@example.com", PASSWORD).await).await;
    let second = body_json(login(&app, "walt@example.com", PASSWORD).await).await;
    let first_refresh = first["data"]["refresh_token"].as_str().unwrap();
    let second_refresh = second["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(first_refresh, second_refresh);

    let response = send(&app, bearer_request("/api/revoke", first_refresh)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, bearer_request("/api/refresh", second_refresh)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_or_malformed_authorization() {
    let app = spawn_app().await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/refresh")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/revoke")
            .header("Authorization", "Basic d2FsdDpwdw==")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, bearer_request("/api/refresh", "not-a-real-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_user_requires_access_token() {
    let app = spawn_app().await;
    let user = create_user(&app, "walt@example.com").await;
    let data = body_json(login(&app, "walt@example.com", PASSWORD).await).await["data"].clone();
    let access_token = data["token"].as_str().unwrap();
    let refresh_token = data["refresh_token"].as_str().unwrap();

    let update = json!({ "email": "heisenberg@example.com", "password": "blue" });

    let response = send(&app, json_request("PUT", "/api/users", &update)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_request("PUT", "/api/users", &update);
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {refresh_token}").parse().unwrap(),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_request("PUT", "/api/users", &update);
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {access_token}").parse().unwrap(),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["id"], user["id"]);
    assert_eq!(updated["email"], "heisenberg@example.com");

    let response = login(&app, "walt@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = login(&app, "heisenberg@example.com", "blue").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_user_email_conflict() {
    let app = spawn_app().await;
    create_user(&app, "walt@example.com").await;
    create_user(&app, "jesse@example.com").await;

    let data = body_json(login(&app, "jesse@example.com", PASSWORD).await).await["data"].clone();
    let access_token = data["token"].as_str().unwrap();

    let mut request = json_request(
        "PUT",
        "/api/users",
        &json!({ "email": "walt@example.com", "password": "x" }),
    );
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {access_token}").parse().unwrap(),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = spawn_app().await;
    create_user(&app, "walt@example.com").await;

    let response = send(
        &app,
        json_request("POST", "/api/login", &json!({ "email": "walt@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some());

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/users")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], json!(false));

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from(r#"{"email":"walt@example.com","password":"04234"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], json!(false));
}
