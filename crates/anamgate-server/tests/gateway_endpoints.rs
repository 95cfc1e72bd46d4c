mod common;

use assert_json_diff::assert_json_include;
use serde_json::{Value, json};

use anamgate_auth::token::{SessionClaims, TokenService};
use anamgate_core::Credentials;

use common::{MockPortal, TEST_SECRET, start_server, test_config};

fn token_service() -> TokenService {
    let cfg = test_config();
    TokenService::new(
        TEST_SECRET,
        cfg.auth.signing_algorithm(),
        cfg.auth.access_token_expire_minutes,
    )
}

fn valid_token() -> String {
    token_service()
        .issue(&Credentials::new("u1", "p1"))
        .unwrap()
}

#[tokio::test]
async fn health_needs_no_auth() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn login_issues_decodable_token() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"identifier": "u1", "secret": "p1"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "bearer");

    // The issued token must decode back to the submitted credentials.
    let token = body["access_token"].as_str().unwrap();
    let credentials = token_service().decode(token).unwrap();
    assert_eq!(credentials, Credentials::new("u1", "p1"));

    // The validation session was opened once and torn down.
    assert_eq!(portal.connects(), 1);
    assert_eq!(portal.closes(), 1);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn rejected_login_is_http_200_failure() {
    let portal = MockPortal::rejecting("비밀번호가 일치하지 않습니다");
    let (base, shutdown_tx, handle) = start_server(portal).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"identifier": "u1", "secret": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("로그인 실패"));
    assert!(body.get("access_token").is_none());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn login_rejects_empty_fields_before_the_portal() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"identifier": "", "secret": "p1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(portal.connects(), 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/reservations"))
        .json(&json!({"start_date": 20240101, "end_date": 20240131}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(portal.connects(), 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn expired_and_tampered_tokens_get_401() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();
    let body = json!({"start_date": 20240101, "end_date": 20240131});

    let expired = token_service()
        .encode(&SessionClaims::new(&Credentials::new("u1", "p1"), -600))
        .unwrap();
    let resp = client
        .post(format!("{base}/api/reservations"))
        .bearer_auth(&expired)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let reply: Value = resp.json().await.unwrap();
    assert_eq!(reply["detail"], "유효하지 않은 인증 토큰입니다.");

    let mut tampered = valid_token();
    tampered.pop();
    tampered.push('x');
    let resp = client
        .post(format!("{base}/api/reservations"))
        .bearer_auth(&tampered)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Neither rejected request may reach the portal.
    assert_eq!(portal.connects(), 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn missing_required_field_is_client_error_and_skips_portal() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    for (path, body) in [
        ("/api/reservations", json!({"start_date": 20240101})),
        ("/api/lab-tests", json!({"end_date": 20240131})),
        ("/api/medications", json!({})),
        ("/api/outpatient-history", json!({"start_date": 20240101})),
        ("/api/hospitalization-history", json!({"end_date": 1})),
        ("/api/payments", json!({"start_date": 20240101})),
        ("/api/payments/detail", json!({"facility_code": "AA"})),
    ] {
        let resp = client
            .post(format!("{base}{path}"))
            .bearer_auth(valid_token())
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(
            resp.status().is_client_error(),
            "{path} accepted an incomplete body"
        );
    }
    assert_eq!(portal.connects(), 0);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn omitted_facility_matches_explicit_default() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    for body in [
        json!({"start_date": 20240101, "end_date": 20240131}),
        json!({"start_date": 20240101, "end_date": 20240131, "facility_code": "AA"}),
    ] {
        let resp = client
            .post(format!("{base}/api/reservations"))
            .bearer_auth(valid_token())
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let calls = portal.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0]["facility"], "AA");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn query_wraps_upstream_payload_verbatim() {
    let payload = json!([{"apstYmd": 20240105, "dept": "IM"}]);
    let portal = MockPortal::with_payload(payload.clone());
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/reservations"))
        .bearer_auth(valid_token())
        .json(&json!({"start_date": 20240101, "end_date": 20240131}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_json_include!(actual: body, expected: json!({"success": true, "data": payload}));

    // One session per request, closed after the single query.
    assert_eq!(portal.connects(), 1);
    assert_eq!(portal.closes(), 1);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn upstream_failure_collapses_into_the_envelope() {
    let portal = MockPortal::failing_queries("점검 중입니다");
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/medications"))
        .bearer_auth(valid_token())
        .json(&json!({"start_date": 20240101, "end_date": 20240131}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("점검 중입니다"));
    assert!(body.get("data").is_none());

    // The session is torn down on the failure path too.
    assert_eq!(portal.closes(), 1);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn sign_in_failure_on_query_is_an_envelope_too() {
    let portal = MockPortal::rejecting("만료된 비밀번호");
    let (base, shutdown_tx, handle) = start_server(portal).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/reservations"))
        .bearer_auth(valid_token())
        .json(&json!({"start_date": 20240101, "end_date": 20240131}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn care_history_discriminators_are_fixed_per_endpoint() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();
    let body = json!({"start_date": 20240101, "end_date": 20240131});

    for path in ["/api/outpatient-history", "/api/hospitalization-history"] {
        let resp = client
            .post(format!("{base}{path}"))
            .bearer_auth(valid_token())
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let calls = portal.calls();
    assert_eq!(calls[0]["op"], "care_history");
    assert_eq!(calls[0]["kind"], 2);
    assert_eq!(calls[1]["kind"], 3);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn payment_division_defaults_to_outpatient() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/payments"))
        .bearer_auth(valid_token())
        .json(&json!({"start_date": 20240101, "end_date": 20240131}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .post(format!("{base}/api/payments"))
        .bearer_auth(valid_token())
        .json(&json!({
            "start_date": 20240101,
            "end_date": 20240131,
            "code_division": "I"
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let calls = portal.calls();
    assert_eq!(calls[0]["division"], "O");
    assert_eq!(calls[1]["division"], "I");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn payment_detail_passes_the_receipt_number() {
    let portal = MockPortal::accepting();
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/payments/detail"))
        .bearer_auth(valid_token())
        .json(&json!({"payment_number": 982_113}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let calls = portal.calls();
    assert_eq!(calls[0]["op"], "paid_detail");
    assert_eq!(calls[0]["payment_number"], 982_113);
    assert_eq!(calls[0]["facility"], "AA");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn user_info_replays_the_token_credentials() {
    let portal = MockPortal::with_payload(json!({"memId": "u7"}));
    let (base, shutdown_tx, handle) = start_server(portal.clone()).await;
    let client = reqwest::Client::new();

    let login: Value = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"identifier": "u7", "secret": "pw7"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["access_token"].as_str().unwrap();

    let resp = client
        .get(format!("{base}/api/user/info"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["memId"], "u7");

    // Login plus the query each opened and closed their own session.
    assert_eq!(portal.connects(), 2);
    assert_eq!(portal.closes(), 2);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
