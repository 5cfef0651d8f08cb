use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_identity::{HttpIdentityVerifier, IdentityError, IdentityVerifier};

#[tokio::test]
async fn valid_token_yields_requester_context() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Authentication/Validate"))
        .and(header("Authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "account_id": "acct-42",
            "role": "manager"
        })))
        .mount(&mock_server)
        .await;

    let verifier = HttpIdentityVerifier::with_url(format!(
        "{}/api/Authentication/Validate",
        mock_server.uri()
    ));

    let ctx = verifier.verify("good-token").await.unwrap();
    assert_eq!(ctx.account_id, "acct-42");
    assert!(ctx.is_staff());
}

#[tokio::test]
async fn rejected_token_maps_to_invalid_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Authentication/Validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let verifier = HttpIdentityVerifier::with_url(format!(
        "{}/api/Authentication/Validate",
        mock_server.uri()
    ));

    let err = verifier.verify("bad-token").await.unwrap_err();
    assert_matches!(err, IdentityError::InvalidToken);
}

#[tokio::test]
async fn valid_false_body_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Authentication/Validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false
        })))
        .mount(&mock_server)
        .await;

    let verifier = HttpIdentityVerifier::with_url(format!(
        "{}/api/Authentication/Validate",
        mock_server.uri()
    ));

    let err = verifier.verify("stale-token").await.unwrap_err();
    assert_matches!(err, IdentityError::InvalidToken);
}

#[tokio::test]
async fn patient_role_is_not_staff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Authentication/Validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "account_id": "acct-7",
            "role": "patient"
        })))
        .mount(&mock_server)
        .await;

    let verifier = HttpIdentityVerifier::with_url(format!(
        "{}/api/Authentication/Validate",
        mock_server.uri()
    ));

    let ctx = verifier.verify("patient-token").await.unwrap();
    assert!(!ctx.is_staff());
}
