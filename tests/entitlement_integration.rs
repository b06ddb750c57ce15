// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement integration tests.
//!
//! These tests require the Firestore emulator to be running; they skip
//! themselves when FIRESTORE_EMULATOR_HOST is unset.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use scripthub_api::models::{Role, Script};
use scripthub_api::services::EntitlementService;
use scripthub_api::time_utils::now_millis;
use tower::ServiceExt;

mod common;
use common::{create_app_with_db, create_test_jwt, test_db, test_user, unique_uid};

#[tokio::test]
async fn test_lapsed_premium_is_corrected_in_store() {
    require_emulator!();

    let db = test_db().await;
    let service = EntitlementService::new(db.clone());

    let uid = unique_uid("lapsed");
    let mut user = test_user(&uid);
    user.role = Role::Premium;
    user.premium_expiration = Some(5_000);
    db.upsert_user(&user).await.unwrap();

    // Check well past the expiration
    let access = service.resolve_role(&user, 10_000).await.unwrap();
    assert_eq!(access.role, Role::Basic);
    assert!(access.premium_remaining_ms.is_none());

    // The correction was persisted
    let stored = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Basic);
    assert!(stored.premium_expiration.is_none());

    println!("✓ Lapsed premium corrected: uid={}", uid);
}

#[tokio::test]
async fn test_active_premium_left_untouched() {
    require_emulator!();

    let db = test_db().await;
    let service = EntitlementService::new(db.clone());

    let uid = unique_uid("active");
    let mut user = test_user(&uid);
    user.role = Role::Premium;
    user.premium_expiration = Some(10_000);
    db.upsert_user(&user).await.unwrap();

    let access = service.resolve_role(&user, 4_000).await.unwrap();
    assert_eq!(access.role, Role::Premium);
    assert_eq!(access.premium_remaining_ms, Some(6_000));

    // No write happened; the stored record is unchanged
    let stored = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Premium);
    assert_eq!(stored.premium_expiration, Some(10_000));

    println!("✓ Active premium untouched: uid={}", uid);
}

#[tokio::test]
async fn test_permanent_premium_never_lapses() {
    require_emulator!();

    let db = test_db().await;
    let service = EntitlementService::new(db.clone());

    let uid = unique_uid("permanent");
    let mut user = test_user(&uid);
    user.role = Role::Premium;
    user.premium_expiration = None;
    db.upsert_user(&user).await.unwrap();

    let access = service.resolve_role(&user, i64::MAX).await.unwrap();
    assert_eq!(access.role, Role::Premium);
    assert!(access.premium_remaining_ms.is_none());

    println!("✓ Permanent premium verified: uid={}", uid);
}

#[tokio::test]
async fn test_profile_endpoint_self_heals_expired_premium() {
    require_emulator!();

    let db = test_db().await;
    let (app, state) = create_app_with_db(db.clone());

    let uid = unique_uid("me");
    let mut user = test_user(&uid);
    user.role = Role::Premium;
    user.premium_expiration = Some(1); // expired long ago
    db.upsert_user(&user).await.unwrap();

    let token = create_test_jwt(&uid, &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["role"], "basic");

    // The gating decision also fixed the record
    let stored = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Basic);

    println!("✓ Profile endpoint self-healed: uid={}", uid);
}

#[tokio::test]
async fn test_premium_download_gated_by_live_check() {
    require_emulator!();

    let db = test_db().await;
    let (app, state) = create_app_with_db(db.clone());

    let slug = unique_uid("gated-script");
    db.upsert_script(&Script {
        slug: slug.clone(),
        title: "Gated Script".to_string(),
        description: "premium only".to_string(),
        script_url: "https://storage.example.com/gated.lua".to_string(),
        is_premium: true,
        created_at: "2024-01-15T10:00:00Z".to_string(),
    })
    .await
    .unwrap();

    // A user whose premium expired must be refused even though the stored
    // role still says premium.
    let uid = unique_uid("expired-dl");
    let mut user = test_user(&uid);
    user.role = Role::Premium;
    user.premium_expiration = Some(1);
    db.upsert_user(&user).await.unwrap();

    let token = create_test_jwt(&uid, &state.config.jwt_signing_key);
    let request = |token: &str| {
        Request::builder()
            .method("GET")
            .uri(format!("/api/scripts/{}/download", slug))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A user with an active grant gets the URL
    let uid2 = unique_uid("active-dl");
    let mut user2 = test_user(&uid2);
    user2.role = Role::Premium;
    user2.premium_expiration = Some(now_millis() + 3_600_000);
    db.upsert_user(&user2).await.unwrap();

    let token2 = create_test_jwt(&uid2, &state.config.jwt_signing_key);
    let response = app.oneshot(request(&token2)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["url"], "https://storage.example.com/gated.lua");

    println!("✓ Premium gating verified: slug={}", slug);
}
