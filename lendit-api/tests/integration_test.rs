/// Integration tests for the Lendit API
///
/// These tests verify the full system works end-to-end:
/// - Contract proposal with fee derivation
/// - Party-split flag updates
/// - Mutual acceptance stamping the rental period
/// - Mutual completion deactivating the contract
/// - Role gates and authentication
/// - Item substring search
///
/// All tests here require a PostgreSQL instance and are ignored by default;
/// see `common/mod.rs` for how to run them.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use lendit_shared::models::user::User;
use serde_json::{json, Value};
use tower::Service as _;

/// Sends a request and returns (status, parsed JSON body)
async fn send(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(header) = auth {
        builder = builder.header("authorization", header);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Proposes a contract on the context's item as the given rentee
async fn propose_contract(ctx: &TestContext, rentee: &User, length_days: i32) -> Value {
    let (status, body) = send(
        ctx,
        "POST",
        &format!("/contracts/new/{}", ctx.item.id),
        Some(ctx.auth_header_for(rentee, &["user"])),
        Some(json!({ "length_days": length_days })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_propose_contract_computes_fee() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 7).await;

    // length=7 at rate 26.95 -> 188.65, half-up to cents
    assert_eq!(contract["fee"], json!(188.65));
    assert_eq!(contract["active"], json!(true));
    assert_eq!(contract["rentee_id"], json!(ctx.rentee.id));
    assert_eq!(contract["item_id"], json!(ctx.item.id));
    assert!(contract["start_date"].is_null());
    assert!(contract["end_date"].is_null());
    assert!(contract["id"].as_i64().unwrap() > 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_replace_with_unknown_id_fails_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = send(
        &ctx,
        "PUT",
        "/contracts/contract/999999999",
        Some(ctx.auth_header_for(&ctx.rentee, &["user"])),
        Some(json!({
            "length_days": 7,
            "rentee_username": ctx.rentee.username,
            "item_id": ctx.item.id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
    assert!(body["timestamp"].is_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_lender_patch_cannot_move_rentee_flags() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 7).await;
    let id = contract["id"].as_i64().unwrap();

    // The lender tries to set both accept flags in one patch
    let (status, updated) = send(
        &ctx,
        "PATCH",
        &format!("/contracts/contract/{}", id),
        Some(ctx.auth_header_for(&ctx.lender, &["lender"])),
        Some(json!({ "lender_accept": true, "rentee_accept": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", updated);
    assert_eq!(updated["lender_accept"], json!(true));
    assert_eq!(updated["rentee_accept"], json!(false));
    assert!(updated["start_date"].is_null(), "one-sided acceptance must not stamp dates");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_third_party_update_forbidden() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 7).await;
    let id = contract["id"].as_i64().unwrap();

    let (status, body) = send(
        &ctx,
        "PATCH",
        &format!("/contracts/contract/{}", id),
        Some(ctx.auth_header_for(&ctx.outsider, &["user"])),
        Some(json!({ "rentee_accept": true })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("forbidden"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_mutual_acceptance_stamps_dates() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 3).await;
    let id = contract["id"].as_i64().unwrap();

    // An outsider cannot agree
    let (status, _) = send(
        &ctx,
        "PATCH",
        &format!("/contracts/contract/agree/{}", id),
        Some(ctx.auth_header_for(&ctx.outsider, &["user"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Rentee agrees: still no dates
    let (status, after_first) = send(
        &ctx,
        "PATCH",
        &format!("/contracts/contract/agree/{}", id),
        Some(ctx.auth_header_for(&ctx.rentee, &["user"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(after_first["start_date"].is_null());

    // Lender agrees: the rental period is stamped
    let (status, after_second) = send(
        &ctx,
        "PATCH",
        &format!("/contracts/contract/agree/{}", id),
        Some(ctx.auth_header_for(&ctx.lender, &["lender"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let start: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(after_second["start_date"].clone()).unwrap();
    let end: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(after_second["end_date"].clone()).unwrap();

    // length=3 -> exactly 259200 seconds apart
    assert_eq!((end - start).num_seconds(), 259_200);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_mutual_completion_deactivates_and_can_reopen() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 2).await;
    let id = contract["id"].as_i64().unwrap();
    let uri = format!("/contracts/contract/{}", id);

    // One-sided completion keeps the contract active
    let (_, after_rentee) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(ctx.auth_header_for(&ctx.rentee, &["user"])),
        Some(json!({ "rentee_complete": true })),
    )
    .await;
    assert_eq!(after_rentee["active"], json!(true));

    // Both sides complete: active flips off
    let (_, after_lender) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(ctx.auth_header_for(&ctx.lender, &["lender"])),
        Some(json!({ "lender_complete": true })),
    )
    .await;
    assert_eq!(after_lender["active"], json!(false));

    // No terminal state: clearing one complete flag reactivates
    let (_, reopened) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(ctx.auth_header_for(&ctx.rentee, &["user"])),
        Some(json!({ "rentee_complete": false })),
    )
    .await;
    assert_eq!(reopened["active"], json!(true));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_delete_contract_then_lookup_fails() {
    let ctx = TestContext::new().await.unwrap();

    let contract = propose_contract(&ctx, &ctx.rentee, 7).await;
    let id = contract["id"].as_i64().unwrap();
    let uri = format!("/contracts/contract/{}", id);
    let lender_auth = ctx.auth_header_for(&ctx.lender, &["lender"]);

    let (status, _) = send(&ctx, "DELETE", &uri, Some(lender_auth.clone()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&ctx, "GET", &uri, Some(lender_auth.clone()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again fails the same way
    let (status, _) = send(&ctx, "DELETE", &uri, Some(lender_auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_item_substring_search_is_case_insensitive() {
    let ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header_for(&ctx.rentee, &["user"]);

    // The context item is named "test rig <suffix>"; mixed case must match
    let (status, matches) = send(
        &ctx,
        "GET",
        "/items/item/name/like/RiG",
        Some(auth.clone()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let found = matches
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"] == json!(ctx.item.id));
    assert!(found, "expected the test item among: {}", matches);

    // No match returns an empty list, not an error
    let (status, empty) = send(
        &ctx,
        "GET",
        "/items/item/name/like/zzqy-no-such-item",
        Some(auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!([]));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_list_contracts_requires_admin_role() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = send(
        &ctx,
        "GET",
        "/contracts/contracts",
        Some(ctx.auth_header_for(&ctx.rentee, &["user"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &ctx,
        "GET",
        "/contracts/contracts",
        Some(ctx.auth_header_for(&ctx.rentee, &["admin"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = send(
        &ctx,
        "GET",
        &format!("/contracts/contract/{}", 1),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("unauthorized"));

    ctx.cleanup().await.unwrap();
}
