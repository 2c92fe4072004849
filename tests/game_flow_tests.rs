//! End-to-end game flows over the HTTP surface: winning an offensive,
//! claiming loot with a recorded gesture, buying time, running a hunt.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lootvault::config::Config;
use tower::ServiceExt;

const DEFAULT_API_KEY: &str = "lootvault_default_api_key_please_regenerate";

/// Seed admin starts with 1800s of attempt time (migration).
const SEED_TIME_BALANCE: i64 = 1800;

async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // In-memory sqlite is per-connection; a 1-connection pool keeps
    // every query on the migrated database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    tweak(&mut config);

    let state = lootvault::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lootvault::api::router(state).await
}

async fn spawn_app() -> Router {
    spawn_app_with(|_| {}).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn authed(method: &str, uri: &str, body: Option<&serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", "application/json");

    match body {
        Some(json) => builder
            .body(Body::from(serde_json::to_string(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A gesture trace that legitimately completes the hold: press, then
/// release after the 150ms intent delay plus the 3000ms ramp.
fn winning_trace() -> serde_json::Value {
    serde_json::json!({
        "trace": [
            { "at_ms": 0, "kind": "down", "x": 100.0, "y": 200.0 },
            { "at_ms": 3200, "kind": "up" }
        ]
    })
}

async fn win_vault(app: &Router, vault_id: i32) -> i64 {
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/vaults/{vault_id}/offensives"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let offensive = body_json(response).await;
    let offensive_id = offensive["data"]["id"].as_i64().unwrap();
    assert_eq!(offensive["data"]["conviction"], 0);

    // Stacked keyword classes pin each exchange at the maximum delta, so
    // an easy vault (threshold 60) falls within a handful of messages.
    let persuasion = serde_json::json!({
        "body": "Wise and noble guardian, logic and evidence say I deserve this; I understand how lonely a century of duty must feel."
    });

    let mut won = false;
    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/api/offensives/{offensive_id}/messages"),
                Some(&persuasion),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let exchange = body_json(response).await;

        let conviction = exchange["data"]["conviction"].as_i64().unwrap();
        assert!((0..=100).contains(&conviction));
        assert!(!exchange["data"]["guardian_message"]["body"]
            .as_str()
            .unwrap()
            .is_empty());

        if exchange["data"]["won"].as_bool().unwrap() {
            won = true;
            break;
        }
    }
    assert!(won, "vault was not unlocked within 20 exchanges");

    offensive_id
}

#[tokio::test]
async fn test_offensive_debits_time_balance() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/vaults/1/offensives", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/me", None))
        .await
        .unwrap();
    let me = body_json(response).await;
    assert_eq!(
        me["data"]["time_balance_seconds"].as_i64().unwrap(),
        SEED_TIME_BALANCE - 300
    );

    // A second offensive against the same vault while one is active
    // conflicts.
    let response = app
        .oneshot(authed("POST", "/api/vaults/1/offensives", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_win_offensive_unlocks_vault_and_claims_loot() {
    let app = spawn_app().await;

    let offensive_id = win_vault(&app, 1).await;

    // The offensive is settled; further messages conflict.
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/offensives/{offensive_id}/messages"),
            Some(&serde_json::json!({ "body": "one more thing" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Vault is now open with a recorded winner (public route, bare body).
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let vault = body_json(response).await;
    assert_eq!(vault["isLocked"], false);
    assert_eq!(vault["winners"], 1);
    assert_eq!(vault["attempts"], 1);

    // Loot is listable now.
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/vaults/1/items", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await;
    let first_item = items["data"][0]["id"].as_i64().unwrap();
    assert_eq!(items["data"][0]["claimed"], false);

    // A completed press-and-hold settles the claim.
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/vaults/1/items/{first_item}/claim"),
            Some(&winning_trace()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claimed = body_json(response).await;
    assert_eq!(claimed["data"]["claimed"], true);
    assert_eq!(claimed["data"]["claimedBy"], 1);

    // Claiming the same item twice conflicts.
    let response = app
        .oneshot(authed(
            "POST",
            &format!("/api/vaults/1/items/{first_item}/claim"),
            Some(&winning_trace()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelled_gesture_does_not_claim() {
    let app = spawn_app().await;
    win_vault(&app, 1).await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/vaults/1/items", None))
        .await
        .unwrap();
    let items = body_json(response).await;
    let item_id = items["data"][0]["id"].as_i64().unwrap();

    // Pointer slides 20px 50ms in: the machine cancels before the ramp.
    let moved_trace = serde_json::json!({
        "trace": [
            { "at_ms": 0, "kind": "down", "x": 100.0, "y": 200.0 },
            { "at_ms": 50, "kind": "move", "x": 120.0, "y": 200.0 },
            { "at_ms": 4000, "kind": "up" }
        ]
    });

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/vaults/1/items/{item_id}/claim"),
            Some(&moved_trace),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Early release is rejected the same way.
    let early_trace = serde_json::json!({
        "trace": [
            { "at_ms": 0, "kind": "down", "x": 100.0, "y": 200.0 },
            { "at_ms": 800, "kind": "up" }
        ]
    });
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/vaults/1/items/{item_id}/claim"),
            Some(&early_trace),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The item is still unclaimed.
    let response = app
        .oneshot(authed("GET", "/api/vaults/1/items", None))
        .await
        .unwrap();
    let items = body_json(response).await;
    assert_eq!(items["data"][0]["claimed"], false);
}

#[tokio::test]
async fn test_claim_on_locked_vault_is_conflict() {
    let app = spawn_app().await;

    let response = app
        .oneshot(authed(
            "POST",
            "/api/vaults/1/items/1/claim",
            Some(&winning_trace()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_forfeit_ends_offensive() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/vaults/2/offensives", None))
        .await
        .unwrap();
    let offensive = body_json(response).await;
    let offensive_id = offensive["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/api/offensives/{offensive_id}/forfeit"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/api/offensives/{offensive_id}"),
            None,
        ))
        .await
        .unwrap();
    let offensive = body_json(response).await;
    assert_eq!(offensive["data"]["status"], "forfeited");
}

#[tokio::test]
async fn test_purchase_time_with_mock_card() {
    let app = spawn_app().await;

    let good_card = serde_json::json!({
        "card_number": "4111 1111 1111 1111",
        "expiry": "12/99",
        "cvc": "123"
    });

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/billing/time", Some(&good_card)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let purchase = body_json(response).await;
    assert_eq!(purchase["data"]["seconds_added"], 900);
    assert_eq!(
        purchase["data"]["time_balance_seconds"].as_i64().unwrap(),
        SEED_TIME_BALANCE + 900
    );
    assert_eq!(purchase["data"]["card"], "**** **** **** 1111");

    // Luhn failure is a 400, and the balance is untouched.
    let bad_card = serde_json::json!({
        "card_number": "4111 1111 1111 1112",
        "expiry": "12/99",
        "cvc": "123"
    });
    let response = app
        .clone()
        .oneshot(authed("POST", "/api/billing/time", Some(&bad_card)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(authed("GET", "/api/auth/me", None))
        .await
        .unwrap();
    let me = body_json(response).await;
    assert_eq!(
        me["data"]["time_balance_seconds"].as_i64().unwrap(),
        SEED_TIME_BALANCE + 900
    );
}

#[tokio::test]
async fn test_hunt_runs_to_completion_and_persists_vaults() {
    // Certain spawns and a large speed multiplier so the full plan runs
    // in tens of milliseconds.
    let app = spawn_app_with(|config| {
        config.game.hunt_spawn_chance = 1.0;
        config.game.hunt_speed_multiplier = 200.0;
    })
    .await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/hunts", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hunt = body_json(response).await;
    let hunt_id = hunt["data"]["id"].as_i64().unwrap();
    assert_eq!(hunt["data"]["finished"], false);

    let mut finished = None;
    for _ in 0..100 {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let response = app
            .clone()
            .oneshot(authed("GET", &format!("/api/hunts/{hunt_id}"), None))
            .await
            .unwrap();
        let snapshot = body_json(response).await;
        if snapshot["data"]["finished"].as_bool().unwrap() {
            finished = Some(snapshot);
            break;
        }
    }

    let snapshot = finished.expect("hunt did not finish in time");
    assert_eq!(snapshot["data"]["percent"].as_f64().unwrap(), 100.0);
    // With a certain spawn roll, each of the three opening phases
    // spotted a vault.
    assert_eq!(snapshot["data"]["vaults_found"].as_array().unwrap().len(), 3);

    // Spotted vaults are real rows on the public discovery surface.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vaults")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let vaults = body_json(response).await;
    assert_eq!(vaults.as_array().unwrap().len(), 6);

    let spotted = &vaults.as_array().unwrap()[3];
    assert!(spotted["isLocked"].as_bool().unwrap());
    assert!(spotted["isNew"].as_bool().unwrap());
}

#[tokio::test]
async fn test_unknown_hunt_is_404() {
    let app = spawn_app().await;

    let response = app
        .oneshot(authed("GET", "/api/hunts/42", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
