use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lootvault::config::Config;
use tower::ServiceExt;

/// Default API key seeded by migration (must match m20250614_add_users.rs)
const DEFAULT_API_KEY: &str = "lootvault_default_api_key_please_regenerate";

/// Vaults seeded by the initial migration.
const SEEDED_VAULTS: usize = 3;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // In-memory sqlite is per-connection; a 1-connection pool keeps
    // every query on the migrated database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = lootvault::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lootvault::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_list_vaults_is_public_and_bare() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vaults")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        mime::APPLICATION_JSON.as_ref()
    );

    let json = body_json(response).await;
    let vaults = json.as_array().expect("expected a bare JSON array");
    assert_eq!(vaults.len(), SEEDED_VAULTS);
    assert!(vaults[0]["itemAmount"].is_number());
    assert!(vaults[0]["isLocked"].as_bool().unwrap());
}

#[tokio::test]
async fn test_get_vault_invalid_and_unknown_ids() {
    let app = spawn_app().await;

    // Non-numeric id -> 400
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Negative id -> 400
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults/-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown numeric id -> 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Seeded vault -> 200 with bare body
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vaults/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Gilded Reliquary");
}

#[tokio::test]
async fn test_create_vault_returns_201() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "name": "Test Coffer",
        "description": "Integration test vault",
        "itemAmount": 5,
        "difficulty": "hard"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vaults")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Test Coffer");
    assert_eq!(json["itemAmount"], 5);
    assert_eq!(json["difficulty"], "hard");
    assert_eq!(json["attempts"], 0);
    assert_eq!(json["winners"], 0);
    assert!(json["isLocked"].as_bool().unwrap());
    let id = json["id"].as_i64().unwrap();
    assert!(id > SEEDED_VAULTS as i64, "ids are server-assigned and monotonic");
}

#[tokio::test]
async fn test_create_vault_missing_item_amount_is_400() {
    let app = spawn_app().await;

    let payload = serde_json::json!({ "name": "No Items" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vaults")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(
        json["error"].as_str().unwrap().contains("itemAmount"),
        "error should name the missing field: {json}"
    );
}

#[tokio::test]
async fn test_create_vault_rejects_bad_difficulty_and_unknown_fields() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "name": "Bad Tier",
        "itemAmount": 3,
        "difficulty": "nightmare"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vaults")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = serde_json::json!({
        "name": "Typo Field",
        "itemAmount": 3,
        "itemAmmount": 4
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vaults")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_updates_only_supplied_fields() {
    let app = spawn_app().await;

    let before = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let before = body_json(before).await;

    let patch = serde_json::json!({ "isPopular": true, "attempts": 42 });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/vaults/2")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&patch).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = body_json(response).await;
    assert_eq!(after["isPopular"], true);
    assert_eq!(after["attempts"], 42);
    // Everything not in the patch is preserved.
    assert_eq!(after["name"], before["name"]);
    assert_eq!(after["description"], before["description"]);
    assert_eq!(after["itemAmount"], before["itemAmount"]);
    assert_eq!(after["difficulty"], before["difficulty"]);
    assert_eq!(after["createdAt"], before["createdAt"]);
}

#[tokio::test]
async fn test_patch_invalid_body_and_unknown_vault() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/vaults/1")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{ "itemAmount": "lots" }"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/vaults/9999")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{ "name": "Ghost" }"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_and_bad_credentials() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{ "username": "admin", "password": "wrong" }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{ "username": "admin", "password": "password" }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["username"], "admin");
    assert_eq!(json["data"]["api_key"], DEFAULT_API_KEY);
}

#[tokio::test]
async fn test_password_change_confirmation_mismatch_is_rejected() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "current_password": "password",
        "new_password": "much-better-password",
        "confirm_password": "much-worse-password"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/auth/password")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("confirm_password"));

    // The password was not touched: the old one still logs in.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{ "username": "admin", "password": "password" }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_loot_listing_locked_vault_is_conflict() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vaults/1/items")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
}
