// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Auth Integration Tests
//!
//! Wire-level tests of the session endpoints, driven with raw requests so
//! the JSON shapes themselves are under test: login, refresh rotation and
//! replay rejection, logout, and the ADMIN-gated account operations.
//!
//! ## Test Categories
//!
//! - `test_login_*`: Credential verification and the issued pair
//! - `test_refresh_*`: Rotation, replay, and rejection paths
//! - `test_logout_*`: Session invalidation
//! - `test_register_*`: Account creation behind the ADMIN gate
//! - `test_edit_role_*`: Role changes behind the ADMIN gate
//! - `test_check_*`: Session confirmation

use reqwest::StatusCode;

use steward_tests::common::{init_test_logging, TestAccount, TestServer};

// =============================================================================
// Test Helpers
// =============================================================================

/// Logs an account in, asserting success, and returns the response body.
async fn login(server: &TestServer, account: &TestAccount) -> serde_json::Value {
    let response = reqwest::Client::new()
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({
            "email": account.email,
            "password": account.password,
        }))
        .send()
        .await
        .expect("login request");
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    response.json().await.expect("login body")
}

/// Posts a refresh token to the rotation endpoint.
async fn post_refresh(server: &TestServer, token: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/auth/refresh"))
        .json(&serde_json::json!({ "refreshToken": token }))
        .send()
        .await
        .expect("refresh request")
}

/// Extracts a string field from a response body.
fn field(body: &serde_json::Value, name: &str) -> String {
    body[name]
        .as_str()
        .unwrap_or_else(|| panic!("missing field {name}"))
        .to_string()
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_pair_and_role() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;

    let body = login(&server, &TestAccount::admin()).await;
    let access = field(&body, "accessToken");
    let refresh = field(&body, "refreshToken");

    assert_eq!(body["role"], "ADMIN");
    // Signed JWTs: three dot-separated segments, and the classes differ
    assert_eq!(access.split('.').count(), 3);
    assert_eq!(refresh.split('.').count(), 3);
    assert_ne!(access, refresh);
}

#[tokio::test]
async fn test_login_failures_indistinguishable() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;

    let client = reqwest::Client::new();
    let wrong_password = client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({
            "email": TestAccount::admin().email,
            "password": "incorrect",
        }))
        .send()
        .await
        .expect("request");
    let unknown_email = client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "nobody@steward.test",
            "password": "incorrect",
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Identical bodies: the response never reveals whether the account exists
    let a: serde_json::Value = wrong_password.json().await.expect("body");
    let b: serde_json::Value = unknown_email.json().await.expect("body");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_login_issues_fresh_pair_each_time() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;

    let first = login(&server, &TestAccount::admin()).await;
    let second = login(&server, &TestAccount::admin()).await;

    assert_ne!(field(&first, "refreshToken"), field(&second, "refreshToken"));

    // The later login owns the stored session; the earlier pair is dead
    let stale = post_refresh(&server, &field(&first, "refreshToken")).await;
    assert_eq!(stale.status(), StatusCode::FORBIDDEN);
    let live = post_refresh(&server, &field(&second, "refreshToken")).await;
    assert_eq!(live.status(), StatusCode::OK);
}

// =============================================================================
// Refresh Rotation
// =============================================================================

#[tokio::test]
async fn test_refresh_rotates_pair() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;
    let body = login(&server, &TestAccount::admin()).await;
    let first = field(&body, "refreshToken");

    let response = post_refresh(&server, &first).await;
    assert_eq!(response.status(), StatusCode::OK);

    let rotated: serde_json::Value = response.json().await.expect("rotation body");
    let second = field(&rotated, "refreshToken");
    assert!(rotated["accessToken"].as_str().is_some());
    assert_ne!(second, first);

    // The rotated token is the one the server now honors
    let response = post_refresh(&server, &second).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_replay_rejected() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;
    let body = login(&server, &TestAccount::admin()).await;
    let first = field(&body, "refreshToken");

    // Redeem once
    let response = post_refresh(&server, &first).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated: serde_json::Value = response.json().await.expect("rotation body");
    let second = field(&rotated, "refreshToken");

    // Replay the consumed token: the signature still verifies, but the
    // stored comparison fails
    let replay = post_refresh(&server, &first).await;
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    let error: serde_json::Value = replay.json().await.expect("error body");
    assert_eq!(error["error"]["code"], "INVALID_TOKEN");

    // The failed replay leaves the live token untouched
    let response = post_refresh(&server, &second).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_garbage_token_rejected() {
    init_test_logging();
    let server = TestServer::spawn().await;

    let response = post_refresh(&server, "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let error: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(error["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_refresh_missing_token_required() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Absent field
    let response = client
        .post(server.url("/auth/refresh"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(error["error"]["message"], "Refresh token required");

    // Empty string reads the same
    let response = client
        .post(server.url("/auth/refresh"))
        .json(&serde_json::json!({ "refreshToken": "" }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_access_token_not_accepted() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;
    let body = login(&server, &TestAccount::admin()).await;

    // The classes are signed with independent secrets; an access token
    // presented as a refresh token fails verification
    let response = post_refresh(&server, &field(&body, "accessToken")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_ends_session() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::admin()).await;
    let body = login(&server, &TestAccount::admin()).await;

    let response = reqwest::Client::new()
        .post(server.url("/auth/logout"))
        .bearer_auth(field(&body, "accessToken"))
        .send()
        .await
        .expect("logout request");
    assert_eq!(response.status(), StatusCode::OK);
    let ack: serde_json::Value = response.json().await.expect("logout body");
    assert_eq!(ack["message"], "Logged out");

    // The surviving refresh token no longer matches anything stored
    let response = post_refresh(&server, &field(&body, "refreshToken")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_requires_token() {
    init_test_logging();
    let server = TestServer::spawn().await;

    let response = reqwest::Client::new()
        .post(server.url("/auth/logout"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Register
// =============================================================================

#[tokio::test]
async fn test_register_requires_admin() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::developer()).await;
    let token = server.issue_access_for(&summary);

    let payload = serde_json::json!({
        "name": "New Person",
        "email": "new@steward.test",
        "password": "new-password-1",
        "role": "DEVELOPER",
    });

    // A verified DEVELOPER is forbidden, not unauthenticated
    let response = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No token at all stops at the session gate
    let response = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_login() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::admin()).await;
    let token = server.issue_access_for(&summary);

    let response = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "name": "New Person",
            "email": "new@steward.test",
            "password": "new-password-1",
            "role": "DEVELOPER",
        }))
        .send()
        .await
        .expect("register request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let ack: serde_json::Value = response.json().await.expect("register body");
    assert_eq!(ack["message"], "User created");

    // The created account can log in with the registered password
    let account = TestAccount {
        name: "New Person".to_string(),
        email: "new@steward.test".to_string(),
        password: "new-password-1".to_string(),
        role: steward_core::Role::Developer,
    };
    let body = login(&server, &account).await;
    assert_eq!(body["role"], "DEVELOPER");
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::admin()).await;
    server.seed_account(&TestAccount::developer()).await;
    let token = server.issue_access_for(&summary);

    let response = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "name": "Copycat",
            "email": TestAccount::developer().email,
            "password": "copycat-password",
            "role": "DEVELOPER",
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let error: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(error["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_empty_fields_rejected() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::admin()).await;
    let token = server.issue_access_for(&summary);

    let response = reqwest::Client::new()
        .post(server.url("/auth/register"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "name": "No Password",
            "email": "empty@steward.test",
            "password": "",
            "role": "DEVELOPER",
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Edit Role
// =============================================================================

#[tokio::test]
async fn test_edit_role_promotes_account() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::admin()).await;
    server.seed_account(&TestAccount::developer()).await;
    let token = server.issue_access_for(&summary);

    let response = reqwest::Client::new()
        .put(server.url("/auth/edit-role"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "email": TestAccount::developer().email,
            "role": "LEAD",
        }))
        .send()
        .await
        .expect("edit-role request");
    assert_eq!(response.status(), StatusCode::OK);
    let ack: serde_json::Value = response.json().await.expect("body");
    assert_eq!(ack["message"], "User role updated");

    // The next login reflects the new role
    let body = login(&server, &TestAccount::developer()).await;
    assert_eq!(body["role"], "LEAD");
}

#[tokio::test]
async fn test_edit_role_unknown_user_is_404() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let summary = server.seed_account(&TestAccount::admin()).await;
    let token = server.issue_access_for(&summary);

    let response = reqwest::Client::new()
        .put(server.url("/auth/edit-role"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "email": "ghost@steward.test",
            "role": "LEAD",
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(error["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Session Check
// =============================================================================

#[tokio::test]
async fn test_check_returns_profile() {
    init_test_logging();
    let server = TestServer::spawn().await;
    server.seed_account(&TestAccount::developer()).await;
    let body = login(&server, &TestAccount::developer()).await;

    let response = reqwest::Client::new()
        .get(server.url("/auth/check"))
        .bearer_auth(field(&body, "accessToken"))
        .send()
        .await
        .expect("check request");
    assert_eq!(response.status(), StatusCode::OK);

    let check: serde_json::Value = response.json().await.expect("check body");
    assert_eq!(check["user"]["email"], TestAccount::developer().email);
    assert_eq!(check["user"]["role"], "DEVELOPER");
    // Only the public profile rides along
    assert!(check["user"].get("passwordHash").is_none());
    assert!(check["user"].get("refreshToken").is_none());
}

#[tokio::test]
async fn test_check_reads_fresh_profile() {
    init_test_logging();
    let server = TestServer::spawn().await;
    let admin = server.seed_account(&TestAccount::admin()).await;
    server.seed_account(&TestAccount::developer()).await;
    let body = login(&server, &TestAccount::developer()).await;
    let access = field(&body, "accessToken");

    // Promote the developer while their access token is still live
    let response = reqwest::Client::new()
        .put(server.url("/auth/edit-role"))
        .bearer_auth(server.issue_access_for(&admin))
        .json(&serde_json::json!({
            "email": TestAccount::developer().email,
            "role": "LEAD",
        }))
        .send()
        .await
        .expect("edit-role request");
    assert_eq!(response.status(), StatusCode::OK);

    // The check reads the store, not the claim baked into the token
    let response = reqwest::Client::new()
        .get(server.url("/auth/check"))
        .bearer_auth(access)
        .send()
        .await
        .expect("check request");
    let check: serde_json::Value = response.json().await.expect("check body");
    assert_eq!(check["user"]["role"], "LEAD");
}
