//! End-to-end tests of the rulesets client over HTTP.

use cloudflare_rulesets::{
    ApiConfig, Credentials, Error, Rule, RulesetClient, RulesetRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE: &str = "023e105f4ecef8ad9ca31a8372d0c353";
const RULESET: &str = "67013aa153df4388ab6b8ab1f0c7bd32";

fn test_client(server: &MockServer) -> RulesetClient {
    let config = ApiConfig::new(format!("{}/client/v4", server.uri())).unwrap();
    RulesetClient::builder(config)
        .with_credentials(Credentials::token("test-token"))
        .build()
        .unwrap()
}

fn ruleset_path() -> String {
    format!("/client/v4/zones/{ZONE}/rulesets/{RULESET}")
}

#[tokio::test]
async fn list_and_filter_by_phase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/client/v4/zones/{ZONE}/rulesets")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [
                { "id": "a", "phase": "http_request_dynamic_redirect" },
                { "id": "b", "phase": "http_request_firewall_custom" }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.list_zone_rulesets(ZONE).await.unwrap().len(), 2);

    let redirects = client
        .get_rulesets_by_phase(ZONE, "http_request_dynamic_redirect")
        .await
        .unwrap();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].id(), Some("a"));
}

#[tokio::test]
async fn create_ruleset_sends_typed_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/client/v4/zones/{ZONE}/rulesets")))
        .and(body_json(json!({
            "name": "Redirects",
            "kind": "zone",
            "phase": "http_request_dynamic_redirect",
            "rules": [{
                "action": "redirect",
                "expression": "(http.request.uri.path eq \"/news\")",
                "description": "News to blog"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": { "id": RULESET, "version": "1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = RulesetRequest::zone("Redirects", "http_request_dynamic_redirect").with_rules(
        vec![Rule::new("redirect", "(http.request.uri.path eq \"/news\")")
            .with_description("News to blog")],
    );

    let created = test_client(&server)
        .create_ruleset(ZONE, &request)
        .await
        .unwrap();
    assert_eq!(created.id(), Some(RULESET));
    assert_eq!(created.version(), Some("1"));
}

#[tokio::test]
async fn delete_rule_by_name_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ruleset_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "id": RULESET,
                "name": "Redirects",
                "rules": [
                    { "id": "1", "description": "News to blog" },
                    { "id": "2", "description": "Support to contact" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(ruleset_path()))
        .and(body_json(json!({
            "rules": [{ "id": "2", "description": "Support to contact" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "id": RULESET,
                "rules": [{ "id": "2", "description": "Support to contact" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = test_client(&server)
        .delete_rule_by_name(ZONE, RULESET, "News to blog")
        .await
        .unwrap();
    assert!(deleted);
}

#[tokio::test]
async fn delete_ruleset_reads_success_flag() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(ruleset_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(test_client(&server)
        .delete_ruleset(ZONE, RULESET)
        .await
        .unwrap());
}

#[tokio::test]
async fn api_errors_propagate_from_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ruleset_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 10005, "message": "ruleset not found" }],
            "messages": [],
            "result": null
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .get_ruleset(ZONE, RULESET)
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotFound("ruleset not found (code 10005)".to_string()));
}

#[tokio::test]
async fn hostile_ids_stay_under_zone_rulesets() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(
            "/client/v4/zones/..%2F..%2Faccounts%2Facc/rulesets/r%3Fx%3D1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client
        .delete_ruleset("../../accounts/acc", "r?x=1")
        .await
        .unwrap());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.path().starts_with("/client/v4/zones/"));
    assert!(requests[0].url.query().is_none());
}
