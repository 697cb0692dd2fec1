//! Integration tests for tower-oidc-rules
//!
//! Tests the full authorization request validation flow with the built-in
//! rules, and the token endpoint's CORS preflight handling behind axum.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use tower::ServiceExt;
use tower_oidc_rules::checker::rules::{
    ClientIdRule, CodeChallengeMethodRule, RedirectUriRule, RequiredOpenIdScopeRule, ScopeRule,
    StateRule, data_keys, keys,
};
use tower_oidc_rules::checker::{RequestRulesManager, RuleResult};
use tower_oidc_rules::oauth::{
    ClientEntity, ErrorCode, InMemoryClientRepository, StaticAllowedOrigins, TokenEndpointLayer,
};
use tower_oidc_rules::{Error, ServerRequest};

// =============================================================================
// Test fixtures
// =============================================================================

const AUTHORIZATION_RULES: [&str; 6] = [
    keys::STATE,
    keys::CLIENT_ID,
    keys::REDIRECT_URI,
    keys::SCOPE,
    keys::REQUIRED_OPENID_SCOPE,
    keys::CODE_CHALLENGE_METHOD,
];

fn create_test_manager() -> RequestRulesManager {
    let clients = InMemoryClientRepository::new().client(
        ClientEntity::new("web-app", "Web App")
            .redirect_uri("https://rp.example/cb")
            .scope("openid")
            .scope("profile")
            .scope("email"),
    );

    let mut manager = RequestRulesManager::new()
        .rule(StateRule)
        .rule(ClientIdRule::new(clients))
        .rule(RedirectUriRule)
        .rule(ScopeRule::new(["openid", "profile", "email", "offline_access"]))
        .rule(RequiredOpenIdScopeRule)
        .rule(CodeChallengeMethodRule);
    manager.set_data(data_keys::DEFAULT_SCOPE, "openid".to_string());
    manager
}

fn authorize(query: &str) -> ServerRequest {
    ServerRequest::from_request(
        Request::builder()
            .uri(format!("/authorize?{}", query))
            .body(Bytes::new())
            .unwrap(),
    )
}

const VALID_QUERY: &str = "client_id=web-app&redirect_uri=https%3A%2F%2Frp.example%2Fcb\
                           &scope=openid+email&state=st-1&code_challenge_method=S256";

// =============================================================================
// Authorization request validation
// =============================================================================

#[test]
fn test_valid_authorization_request() {
    let mut manager = create_test_manager();
    let results = manager
        .check(&authorize(VALID_QUERY), &AUTHORIZATION_RULES, false)
        .unwrap();

    let client = results
        .get(keys::CLIENT_ID)
        .and_then(|r| r.value::<ClientEntity>())
        .unwrap();
    assert_eq!(client.id, "web-app");
    assert_eq!(
        results.get(keys::SCOPE).and_then(|r| r.value::<Vec<String>>()),
        Some(&vec!["openid".to_string(), "email".to_string()])
    );
    assert_eq!(
        results
            .get(keys::CODE_CHALLENGE_METHOD)
            .and_then(|r| r.value::<String>())
            .map(String::as_str),
        Some("S256")
    );
    // The openid check caches nothing
    assert!(!results.has(keys::REQUIRED_OPENID_SCOPE));
    assert_eq!(
        results.keys().collect::<Vec<_>>(),
        vec![
            keys::STATE,
            keys::CLIENT_ID,
            keys::REDIRECT_URI,
            keys::SCOPE,
            keys::CODE_CHALLENGE_METHOD
        ]
    );
}

#[test]
fn test_default_scope_applies_without_scope_param() {
    let mut manager = create_test_manager();
    let results = manager
        .check(
            &authorize("client_id=web-app&redirect_uri=https%3A%2F%2Frp.example%2Fcb"),
            &AUTHORIZATION_RULES,
            false,
        )
        .unwrap();
    assert_eq!(
        results.get(keys::SCOPE).and_then(|r| r.value::<Vec<String>>()),
        Some(&vec!["openid".to_string()])
    );
}

#[test]
fn test_code_flow_error_uses_query() {
    let mut manager = create_test_manager();
    let err = manager
        .check(
            &authorize(
                "client_id=web-app&redirect_uri=https%3A%2F%2Frp.example%2Fcb\
                 &scope=openid+offline_access&state=abc",
            ),
            &AUTHORIZATION_RULES,
            false,
        )
        .unwrap_err();

    let protocol = err.as_protocol().unwrap();
    assert_eq!(protocol.code(), ErrorCode::InvalidScope);
    let location = protocol.redirect_location().unwrap();
    assert!(location.starts_with("https://rp.example/cb?error=invalid_scope"));
    assert!(location.ends_with("state=abc"));
}

#[test]
fn test_implicit_flow_error_uses_fragment() {
    let mut manager = create_test_manager();
    let err = manager
        .check(
            &authorize(
                "client_id=web-app&redirect_uri=https%3A%2F%2Frp.example%2Fcb&scope=profile",
            ),
            &AUTHORIZATION_RULES,
            true,
        )
        .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://rp.example/cb#error=invalid_request"));
}

#[test]
fn test_unknown_client_stops_pipeline() {
    let mut manager = create_test_manager();
    let err = manager
        .check(
            &authorize("client_id=nobody&redirect_uri=https%3A%2F%2Frp.example%2Fcb"),
            &AUTHORIZATION_RULES,
            false,
        )
        .unwrap_err();

    let protocol = err.as_protocol().unwrap();
    assert_eq!(protocol.code(), ErrorCode::InvalidClient);
    // Untrusted redirect URI is never used for the error
    assert!(protocol.redirect_location().is_none());
    assert!(manager.result_bag().has(keys::STATE));
    assert!(!manager.result_bag().has(keys::REDIRECT_URI));
}

#[test]
fn test_predefined_client_skips_lookup() {
    // Client already authenticated at the HTTP layer; its rule is not run
    let mut manager = create_test_manager();
    manager.predefine_result(RuleResult::new(
        keys::CLIENT_ID,
        ClientEntity::new("pre-authenticated", "Pre").redirect_uri("https://pre.example/cb"),
    ));

    let results = manager
        .check(
            &authorize("redirect_uri=https%3A%2F%2Fpre.example%2Fcb&scope=openid"),
            &[keys::STATE, keys::REDIRECT_URI, keys::SCOPE],
            false,
        )
        .unwrap();

    assert_eq!(
        results
            .get(keys::CLIENT_ID)
            .and_then(|r| r.value::<ClientEntity>())
            .map(|c| c.id.as_str()),
        Some("pre-authenticated")
    );
    assert!(results.has(keys::SCOPE));
}

#[test]
fn test_missing_dependency_is_configuration_error() {
    let mut manager = create_test_manager();
    let err = manager
        .check(&authorize(VALID_QUERY), &[keys::SCOPE], false)
        .unwrap_err();
    assert!(matches!(err, Error::ResultNotSet(_)));
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_unregistered_rule_key() {
    let mut manager = create_test_manager();
    let err = manager
        .check(&authorize(VALID_QUERY), &[keys::STATE, "prompt"], false)
        .unwrap_err();
    assert!(matches!(err, Error::RuleNotDefined(ref key) if key == "prompt"));
    assert!(!err.is_protocol());
}

#[test]
fn test_prepared_manager_cloned_per_request() {
    let template = create_test_manager();

    let mut first = template.clone();
    first
        .check(&authorize(VALID_QUERY), &AUTHORIZATION_RULES, false)
        .unwrap();

    let second = template.clone();
    assert!(first.result_bag().has(keys::CLIENT_ID));
    assert!(second.result_bag().is_empty());
    assert!(template.result_bag().is_empty());
}

#[tokio::test]
async fn test_post_body_parameters() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/authorize")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(VALID_QUERY))
        .unwrap();
    let request = ServerRequest::from_body_request(request, 16 * 1024)
        .await
        .unwrap();

    let mut manager = create_test_manager();
    let results = manager.check(&request, &AUTHORIZATION_RULES, false).unwrap();
    assert_eq!(
        results
            .get(keys::STATE)
            .and_then(|r| r.value::<Option<String>>())
            .cloned()
            .flatten()
            .as_deref(),
        Some("st-1")
    );
}

// =============================================================================
// Token endpoint CORS preflight
// =============================================================================

fn token_app() -> Router {
    Router::new()
        .route("/token", post(|| async { "{\"access_token\":\"t\"}" }))
        .layer(TokenEndpointLayer::new(StaticAllowedOrigins::new([
            "https://app.example",
        ])))
}

fn preflight(origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::OPTIONS).uri("/token");
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_preflight_allowed_origin() {
    let response = token_app()
        .oneshot(preflight(Some("https://app.example")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Authorization");
}

#[tokio::test]
async fn test_preflight_disallowed_origin() {
    let response = token_app()
        .oneshot(preflight(Some("https://evil.example")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "access_denied");
    assert!(
        body["hint"]
            .as_str()
            .unwrap()
            .contains("https://evil.example")
    );
}

#[tokio::test]
async fn test_preflight_without_origin() {
    let response = token_app().oneshot(preflight(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "request_not_supported");
}

#[tokio::test]
async fn test_token_request_reaches_inner_service() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = token_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"{\"access_token\":\"t\"}");
}
