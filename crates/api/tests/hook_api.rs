//! End-to-end tests of `/hook` through the full middleware stack.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::{body_bytes, body_json, build_test_app, post_hook, send, test_config, FakeTracker, MB};
use redactedhook_core::validation::MAX_MIN_RATIO;
use redactedhook_indexer::FetchError;
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: authentication and request shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_or_wrong_token_is_unauthorized() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let body = json!({"indexer": "redacted"}).to_string();

    for token in [None, Some("wrong")] {
        let response = send(&app, Method::POST, token, body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn token_prefix_or_extension_is_unauthorized() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let body = json!({"indexer": "redacted"}).to_string();

    for token in ["test", "test-token-extra", ""] {
        let response = send(&app, Method::POST, Some(token), body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token {token:?}");
    }
}

#[tokio::test]
async fn token_is_checked_before_method() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = send(&app, Method::GET, None, String::new()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_post_is_bad_request() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = send(&app, Method::PUT, Some(common::TOKEN), "{}".into()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "only POST method is supported");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = send(&app, Method::POST, Some(common::TOKEN), "{not json".into()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().starts_with("invalid JSON payload"));
}

// ---------------------------------------------------------------------------
// Test: validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_source_is_reported() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = post_hook(&app, json!({"torrent_id": 1})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "no source provided");
}

#[tokio::test]
async fn unknown_source_is_reported() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = post_hook(&app, json!({"indexer": "btn", "torrent_id": 1})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid source: btn");
}

#[tokio::test]
async fn inverted_size_bounds_fail_before_any_fetch() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let response = post_hook(
        &app,
        json!({"indexer": "redacted", "torrent_id": 1, "minsize": "500MB", "maxsize": "100MB"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(app.tracker.calls(), 0);
}

// ---------------------------------------------------------------------------
// Test: uploader filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uploader_filter_modes() {
    let cases = [
        ("blacklist", "alice,bob", StatusCode::FORBIDDEN),
        ("whitelist", "carol", StatusCode::FORBIDDEN),
        ("whitelist", "alice", StatusCode::OK),
    ];

    for (mode, uploaders, expected) in cases {
        let app = build_test_app(test_config(), FakeTracker::new());
        let response = post_hook(
            &app,
            json!({"indexer": "redacted", "torrent_id": 123, "uploaders": uploaders, "mode": mode}),
        )
        .await;

        assert_eq!(response.status(), expected, "{mode} {uploaders}");
        if expected == StatusCode::FORBIDDEN {
            assert_eq!(body_json(response).await["code"], "UPLOADER_NOT_ALLOWED");
        }
    }
}

// ---------------------------------------------------------------------------
// Test: record label filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_record_label_is_not_found() {
    let app = build_test_app(test_config(), FakeTracker::new().with_label(""));
    let response = post_hook(
        &app,
        json!({"indexer": "ops", "torrent_id": 5, "record_labels": "Warp, Ninja Tune"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RECORD_LABEL_NOT_FOUND");
    assert_eq!(json["error"], "record label not found");
}

#[tokio::test]
async fn unlisted_record_label_is_not_allowed() {
    let app = build_test_app(test_config(), FakeTracker::new().with_label("Sub Pop"));
    let response = post_hook(
        &app,
        json!({"indexer": "ops", "torrent_id": 5, "record_labels": "Warp"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "RECORD_LABEL_NOT_ALLOWED");
}

// ---------------------------------------------------------------------------
// Test: size filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn release_inside_size_range_is_accepted() {
    let app = build_test_app(test_config(), FakeTracker::new().with_size(250 * MB));
    let response = post_hook(
        &app,
        json!({"indexer": "redacted", "torrent_id": 123, "minsize": "100MB", "maxsize": "500MB"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn release_below_size_range_is_rejected() {
    let app = build_test_app(test_config(), FakeTracker::new().with_size(50 * MB));
    let response = post_hook(
        &app,
        json!({"indexer": "redacted", "torrent_id": 123, "minsize": "100MB", "maxsize": "500MB"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "SIZE_OUT_OF_RANGE");
}

// ---------------------------------------------------------------------------
// Test: ratio filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ratio_boundary_is_inclusive() {
    for (ratio, expected) in [(0.59, StatusCode::FORBIDDEN), (0.6, StatusCode::OK)] {
        let app = build_test_app(test_config(), FakeTracker::new().with_ratio(ratio));
        let response = post_hook(
            &app,
            json!({"indexer": "redacted", "red_user_id": 7, "minratio": 0.6}),
        )
        .await;

        assert_eq!(response.status(), expected, "ratio {ratio}");
        if expected == StatusCode::FORBIDDEN {
            assert_eq!(body_json(response).await["code"], "RATIO_BELOW_MINIMUM");
        }
    }
}

#[tokio::test]
async fn ratio_check_without_user_id_is_skipped() {
    let app = build_test_app(test_config(), FakeTracker::new().with_ratio(0.1));
    let response = post_hook(&app, json!({"indexer": "ops", "minratio": 1.0})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.tracker.calls(), 0);
}

#[tokio::test]
async fn user_id_without_min_ratio_skips_ratio_check() {
    let mut config = test_config();
    config.userid.red_user_id = 7;
    let app = build_test_app(config, FakeTracker::new().with_ratio(0.1));

    let response = post_hook(&app, json!({"indexer": "redacted"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.tracker.calls(), 0);
}

// ---------------------------------------------------------------------------
// Test: configured defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn omitted_fields_use_configured_defaults() {
    let mut config = test_config();
    config.userid.red_user_id = 7;
    config.ratio.minratio = 2.0;
    let app = build_test_app(config, FakeTracker::new().with_ratio(1.0));

    let response = post_hook(&app, json!({"indexer": "redacted"})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "RATIO_BELOW_MINIMUM");
}

#[tokio::test]
async fn explicit_zero_disables_configured_filter() {
    let mut config = test_config();
    config.userid.red_user_id = 7;
    config.ratio.minratio = 2.0;
    let app = build_test_app(config, FakeTracker::new().with_ratio(1.0));

    let response = post_hook(&app, json!({"indexer": "redacted", "minratio": 0})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.tracker.calls(), 0);
}

#[tokio::test]
async fn dynamic_ratio_raises_default_in_memory() {
    let mut config = test_config();
    config.userid.red_user_id = 7;
    config.ratio.minratio = 0.6;
    config.dynamic_ratio.enabled = true;
    let app = build_test_app(config, FakeTracker::new().with_ratio(1.2345));

    let response = post_hook(&app, json!({"indexer": "redacted"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.current().ratio.minratio, 1.23);
}

#[tokio::test]
async fn dynamic_ratio_never_exceeds_validation_limit() {
    let mut config = test_config();
    config.userid.red_user_id = 7;
    config.ratio.minratio = 0.6;
    config.dynamic_ratio.enabled = true;
    let app = build_test_app(config, FakeTracker::new().with_ratio(1500.0));

    let response = post_hook(&app, json!({"indexer": "redacted"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.current().ratio.minratio, MAX_MIN_RATIO);

    let response = post_hook(&app, json!({"indexer": "redacted", "torrent_id": 1})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: upstream failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_budget_is_service_unavailable() {
    let app = build_test_app(test_config(), FakeTracker::new());

    for id in 1..=5 {
        let response =
            post_hook(&app, json!({"indexer": "ops", "torrent_id": id, "maxsize": "1GB"})).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response =
        post_hook(&app, json!({"indexer": "ops", "torrent_id": 6, "maxsize": "1GB"})).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()["retry-after"], "10");
    assert_eq!(body_json(response).await["code"], "UPSTREAM_RATE_LIMITED");
    assert_eq!(app.tracker.calls(), 5);
}

#[tokio::test]
async fn repeated_release_is_served_from_cache() {
    let app = build_test_app(test_config(), FakeTracker::new());
    let body = json!({"indexer": "redacted", "torrent_id": 9, "maxsize": "1GB", "uploaders": "alice", "mode": "whitelist"});

    for _ in 0..3 {
        assert_eq!(post_hook(&app, body.clone()).await.status(), StatusCode::OK);
    }
    assert_eq!(app.tracker.calls(), 1);
}

#[tokio::test]
async fn tracker_failure_is_bad_gateway_with_generic_message() {
    let tracker = FakeTracker::new().failing(FetchError::Api {
        indexer: "redacted",
        message: "bad id parameter".into(),
    });
    let app = build_test_app(test_config(), tracker);
    let response = post_hook(&app, json!({"indexer": "redacted", "torrent_id": 1, "maxsize": "1GB"})).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("bad id"));
}

#[tokio::test]
async fn missing_credential_is_upstream_error() {
    let mut config = test_config();
    config.indexer_keys.ops_apikey.clear();
    let app = build_test_app(config, FakeTracker::new());
    let response = post_hook(&app, json!({"indexer": "ops", "torrent_id": 1, "maxsize": "1GB"})).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.tracker.calls(), 0);
}

// ---------------------------------------------------------------------------
// Test: Discord notification on accept
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_release_posts_to_discord() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webhook")
        .with_status(204)
        .create_async()
        .await;

    let mut config = test_config();
    config.notifications.discord_webhook_url = format!("{}/webhook", server.url());
    let app = build_test_app(config, FakeTracker::new());

    let response = post_hook(&app, json!({"indexer": "redacted", "torrent_id": 1})).await;
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..50 {
        if mock.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    mock.assert_async().await;
}
