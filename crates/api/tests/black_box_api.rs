use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use userhub_api::app::{AppState, build_router};
use userhub_auth::Hs256JwtVerifier;
use userhub_core::Username;
use userhub_infra::directory::{NewAccount, UserProfile};
use userhub_infra::{InMemoryUserDirectory, UserDirectory};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    directory: Arc<InMemoryUserDirectory>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let verifier = Arc::new(Hs256JwtVerifier::new(JWT_SECRET));

        // Same router as prod, in-memory directory, ephemeral port.
        let app = build_router(AppState::new(directory.clone()), verifier);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            directory,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn seed(&self, username: &str, full_name: &str, authority: &str, department: &str) {
        self.directory
            .insert_account(NewAccount {
                username: Username::new(username).unwrap(),
                password_hash: "{argon2}$seed".to_string(),
                authority: authority.to_string(),
                profile: UserProfile {
                    full_name: Some(full_name.to_string()),
                    email: Some(format!("{}@corp.example", username.to_lowercase())),
                    department: Some(department.to_string()),
                    ..Default::default()
                },
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, extra: Value) -> String {
    let exp = (Utc::now() + ChronoDuration::minutes(10)).timestamp();
    let mut claims = json!({ "sub": "alice", "exp": exp });
    if let (Some(claims), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            claims.insert(k.clone(), v.clone());
        }
    }

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin_token() -> String {
    mint_jwt(JWT_SECRET, json!({ "roles": ["ADMIN"] }))
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/health", "/actuator/health", "/actuator/health/liveness", "/actuator/health/readiness"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/secret")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let forged = mint_jwt("some-other-secret", json!({ "roles": ["ADMIN"] }));
    let res = client
        .get(srv.url("/users"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let exp = (Utc::now() - ChronoDuration::minutes(10)).timestamp();
    let token = mint_jwt(JWT_SECRET, json!({ "exp": exp, "roles": ["ADMIN"] }));

    let res = reqwest::Client::new()
        .get(srv.url("/secret"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_without_authorities_is_forbidden_from_gates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(JWT_SECRET, json!({}));

    let res = client.get(srv.url("/secret")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["message"], "secret for you");

    let res = client.get(srv.url("/admin")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await.unwrap()["error"], "forbidden");
}

#[tokio::test]
async fn roles_claim_wins_over_scope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(JWT_SECRET, json!({ "roles": ["ADMIN"], "scope": "u.test" }));

    let res = client.get(srv.url("/admin")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["message"], "admin role for you");

    // Scope is ignored once roles are present.
    let res = client.get(srv.url("/admin/scope")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn scope_claim_grants_scope_gate_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(JWT_SECRET, json!({ "scope": "openid u.test" }));

    let res = client.get(srv.url("/admin/scope")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/admin")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.get(srv.url("/access_token")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["principal"], "alice");
    assert_eq!(body["access_token"], token);
    assert_eq!(body["authorities"], json!(["SCOPE_openid", "SCOPE_u.test"]));
    assert_eq!(body["scope"], "openid u.test");
}

#[tokio::test]
async fn role_gate_is_case_sensitive() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(JWT_SECRET, json!({ "roles": ["admin"] }));

    let res = reqwest::Client::new()
        .get(srv.url("/users"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_pages_clamps_and_filters() {
    let srv = TestServer::spawn().await;
    for i in 0..25 {
        let authority = if i % 5 == 0 { "ROLE_ADMIN" } else { "ROLE_USER" };
        let department = if i < 3 { "Legal" } else { "Sales" };
        srv.seed(&format!("USER{i:02}"), &format!("Person {i}"), authority, department)
            .await;
    }
    let client = reqwest::Client::new();
    let token = admin_token();

    let res = client.get(srv.url("/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["totalElements"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 0);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["hasNext"], true);
    assert_eq!(body["hasPrevious"], false);
    assert_eq!(body["content"][0]["username"], "USER00");

    // Past the end: clamped to the last page.
    let res = client
        .get(srv.url("/users?pageNo=5&pageSize=10"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["content"].as_array().unwrap().len(), 5);
    assert_eq!(body["hasNext"], false);
    assert_eq!(body["hasPrevious"], true);

    let res = client
        .get(srv.url("/users?filterBy=legal&filterRole=ROLE_ADMIN"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["content"][0]["username"], "USER00");

    let res = client
        .get(srv.url("/users?filterRole=ALL&pageSize=100"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["totalElements"], 25);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn invalid_page_size_is_bad_request() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/users?pageSize=0"))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap()["error"], "validation_error");
}

#[tokio::test]
async fn malformed_paging_params_get_a_json_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    for query in ["pageNo=abc", "pageSize=ten", "pageNo=1.5"] {
        let res = client
            .get(srv.url(&format!("/users?{query}")))
            .bearer_auth(admin_token())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "validation_error", "{query}");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{query}");
    }
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/users/NOBODY1"))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_lifecycle_create_update_status_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token();

    // Create
    let res = client
        .post(srv.url("/users/add"))
        .bearer_auth(&token)
        .json(&json!({
            "fullName": "Nguyen Ngoc Anh",
            "role": "hr",
            "email": "anh@corp.example",
            "department": "People"
        }))
        .send()
        .await
        .unwrap();
    if res.status() != StatusCode::OK {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        panic!("expected 200 OK from create, got {status} body={body}");
    }
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["username"], "ANHNN1");
    assert_eq!(created["password"].as_str().unwrap().len(), 12);

    let res = client.get(srv.url("/users/ANHNN1")).bearer_auth(&token).send().await.unwrap();
    let user: Value = res.json().await.unwrap();
    assert_eq!(user["authority"], "ROLE_HR");
    assert_eq!(user["position"], "hr");
    assert_eq!(user["enabled"], true);

    // Update
    let res = client
        .put(srv.url("/users/update/ANHNN1"))
        .bearer_auth(&token)
        .json(&json!({ "department": "Finance", "note": "transferred" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let user: Value = res.json().await.unwrap();
    assert_eq!(user["department"], "Finance");
    assert_eq!(user["fullName"], "Nguyen Ngoc Anh");

    // Status
    let res = client
        .put(srv.url("/users/ANHNN1/status"))
        .bearer_auth(&token)
        .json(&json!({ "status": "inactive" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap()["enabled"], false);

    let res = client
        .put(srv.url("/users/ANHNN1/status"))
        .bearer_auth(&token)
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap()["enabled"], true);

    // Soft delete: still listed, now disabled.
    let res = client
        .delete(srv.url("/users/delete/ANHNN1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/users")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["content"][0]["enabled"], false);
}

#[tokio::test]
async fn create_with_single_name_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/users/add"))
        .bearer_auth(admin_token())
        .json(&json!({ "fullName": "Madonna", "role": "user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_management_requires_admin() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(JWT_SECRET, json!({ "roles": ["USER"] }));

    let res = client
        .delete(srv.url("/users/delete/ANYONE1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
