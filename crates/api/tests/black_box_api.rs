use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use storefront_api::app::services::AppServices;
use storefront_auth::{JwtClaims, Role};
use storefront_core::UserId;
use storefront_infra::{AppConfig, InMemoryMailer};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    mailer: Arc<InMemoryMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig::from_lookup(|name| match name {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "PUBLIC_BASE_URL" => Some("http://tienda.test".to_string()),
            _ => None,
        })
        .expect("test config");
        let mailer = Arc::new(InMemoryMailer::new());
        let services = AppServices::in_memory(&config, mailer.clone());

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = storefront_api::app::build_app(Arc::new(services));
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
            mailer,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt_with(role: Role, issued_ago: ChronoDuration, ttl: ChronoDuration) -> String {
    let iat = Utc::now() - issued_ago;
    let claims = JwtClaims {
        sub: UserId::new(),
        username: format!("{}-test", role.as_str()),
        role,
        iat: iat.timestamp(),
        exp: (iat + ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn mint_jwt(role: Role) -> String {
    mint_jwt_with(role, ChronoDuration::zero(), ChronoDuration::minutes(10))
}

async fn create_product(
    client: &reqwest::Client,
    srv: &TestServer,
    admin: &str,
    code: &str,
    category: &str,
    stock: i64,
) -> String {
    let res = client
        .post(srv.url("/productos"))
        .bearer_auth(admin)
        .json(&json!({
            "nombre": format!("Producto {code}"),
            "precio": 12.5,
            "codigo": code,
            "categoria": category,
            "stock": stock,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["_id"].as_str().unwrap().to_string()
}

async fn stock_of(client: &reqwest::Client, srv: &TestServer, token: &str, id: &str) -> i64 {
    let res = client
        .get(srv.url(&format!("/productos/{id}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["stock"].as_i64().unwrap()
}

async fn checkout(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = client
        .post(srv.url("/checkout"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/productos")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/productos"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let expired = mint_jwt_with(
        Role::Admin,
        ChronoDuration::hours(2),
        ChronoDuration::minutes(10),
    );
    let res = client
        .get(srv.url("/productos"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/checkout"))
        .json(&json!({ "productos": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_are_forbidden_for_customers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin);
    let customer = mint_jwt(Role::Customer);
    let id = create_product(&client, &srv, &admin, "A-1", "General", 4).await;

    let res = client
        .post(srv.url("/productos/restablecer-stock"))
        .bearer_auth(&customer)
        .json(&json!({ "stock_default": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(stock_of(&client, &srv, &customer, &id).await, 4);

    let res = client
        .post(srv.url("/productos"))
        .bearer_auth(&customer)
        .json(&json!({ "nombre": "x", "precio": 1, "codigo": "X", "categoria": "y" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Authorization runs before the body is parsed.
    for path in ["/productos/restablecer-stock", "/productos"] {
        let res = client
            .post(srv.url(path))
            .bearer_auth(&customer)
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "POST {path}");
    }

    let res = client
        .delete(srv.url("/productos/not-an-id"))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/usuarios"))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_lifecycle_create_query_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin);

    // Create with defaults
    let res = client
        .post(srv.url("/productos"))
        .bearer_auth(&admin)
        .json(&json!({
            "nombre": "Café molido",
            "precio": 8.75,
            "codigo": "CAF-01",
            "categoria": "Bebidas",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["imagen"], "./img/default.jpg");
    assert_eq!(created["stock"], 0);

    // Missing fields / duplicate code
    let res = client
        .post(srv.url("/productos"))
        .bearer_auth(&admin)
        .json(&json!({ "nombre": "Sin precio" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_fields");

    let res = client
        .post(srv.url("/productos"))
        .bearer_auth(&admin)
        .json(&json!({ "nombre": "Otro", "precio": 1, "codigo": "CAF-01", "categoria": "Bebidas" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_code");

    create_product(&client, &srv, &admin, "TE-01", "Infusiones", 3).await;

    // Category filter is case-insensitive; "todos" lists everything
    let res = client
        .get(srv.url("/productos?categoria=bebidas"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let res = client
        .get(srv.url("/productos?categoria=todos"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);

    // Search over code and name
    let res = client
        .get(srv.url("/productos/buscar?q=caf"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let found: serde_json::Value = res.json().await.unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["codigo"], "CAF-01");

    // Partial update
    let res = client
        .put(srv.url(&format!("/productos/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "stock": 12, "descripcion": "Tueste medio" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["stock"], 12);
    assert_eq!(updated["descripcion"], "Tueste medio");
    assert_eq!(updated["nombre"], "Café molido");

    let res = client
        .put(srv.url(&format!("/productos/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "codigo": "TE-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Delete, then lookups fail
    let res = client
        .delete(srv.url(&format!("/productos/{id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/productos/{id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url("/productos/no-es-un-id"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn checkout_is_all_or_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin);
    let customer = mint_jwt(Role::Customer);

    let a = create_product(&client, &srv, &admin, "A", "General", 5).await;
    let b = create_product(&client, &srv, &admin, "B", "General", 0).await;

    // B is out of stock: nothing changes
    let (status, body) = checkout(
        &client,
        &srv,
        &customer,
        json!({ "productos": [{ "id": a, "cantidad": 3 }, { "id": b, "cantidad": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "insufficient_stock");
    assert!(body["message"].as_str().unwrap().contains("Disponible: 0"));
    assert_eq!(stock_of(&client, &srv, &customer, &a).await, 5);

    // Buying the exact stock drains it; `_id` is accepted too
    let (status, body) = checkout(
        &client,
        &srv,
        &customer,
        json!({ "productos": [{ "_id": a, "cantidad": 5 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productos_actualizados"], 1);
    assert_eq!(body["mensaje"], "Compra procesada exitosamente");
    assert_eq!(stock_of(&client, &srv, &customer, &a).await, 0);

    let (status, _) = checkout(
        &client,
        &srv,
        &customer,
        json!({ "productos": [{ "id": a, "cantidad": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_rejects_empty_unknown_and_malformed_carts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let customer = mint_jwt(Role::Customer);

    let (status, body) = checkout(&client, &srv, &customer, json!({ "productos": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_cart");

    let (status, body) = checkout(&client, &srv, &customer, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_cart");

    let missing = UserId::new().to_string();
    let (status, _) = checkout(
        &client,
        &srv,
        &customer,
        json!({ "productos": [{ "id": missing, "cantidad": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = checkout(
        &client,
        &srv,
        &customer,
        json!({ "productos": [{ "id": "xyz", "cantidad": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin);
    let id = create_product(&client, &srv, &admin, "LIM", "General", 7).await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = srv.url("/checkout");
        let token = mint_jwt(Role::Customer);
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "productos": [{ "id": id, "cantidad": 2 }] }))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut ok = 0;
    for task in tasks {
        if task.await.unwrap() == StatusCode::OK {
            ok += 1;
        }
    }
    assert_eq!(ok, 3);
    assert_eq!(stock_of(&client, &srv, &admin, &id).await, 1);
}

#[tokio::test]
async fn reset_stock_sets_every_product() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin);
    let a = create_product(&client, &srv, &admin, "A", "General", 1).await;
    let b = create_product(&client, &srv, &admin, "B", "General", 40).await;

    // No body: default of 10
    let res = client
        .post(srv.url("/productos/restablecer-stock"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["productos_actualizados"], 2);
    assert_eq!(body["mensaje"], "Stock restablecido a 10 unidades");
    assert_eq!(stock_of(&client, &srv, &admin, &a).await, 10);
    assert_eq!(stock_of(&client, &srv, &admin, &b).await, 10);

    // Idempotent: the count is every product, changed or not
    let res = client
        .post(srv.url("/productos/restablecer-stock"))
        .bearer_auth(&admin)
        .json(&json!({ "stock_default": 10 }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["productos_actualizados"], 2);

    // A body that is not declared as JSON is refused, not treated as absent.
    let res = client
        .post(srv.url("/productos/restablecer-stock"))
        .bearer_auth(&admin)
        .header("content-type", "text/plain")
        .body(r#"{"stock_default":0}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(stock_of(&client, &srv, &admin, &a).await, 10);

    let res = client
        .post(srv.url("/productos/restablecer-stock"))
        .bearer_auth(&admin)
        .json(&json!({ "stock_default": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&client, &srv, &admin, &a).await, 10);
}

#[tokio::test]
async fn register_login_and_profile() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/auth/register"))
        .json(&json!({ "usuario": "ana", "email": "ana@example.com", "contrasena": "secreta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let session: serde_json::Value = res.json().await.unwrap();
    assert_eq!(session["usuario"], "ana");
    assert_eq!(session["role"], "cliente");

    let res = client
        .post(srv.url("/auth/register"))
        .json(&json!({ "usuario": "ana2", "email": "ana@example.com", "contrasena": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "usuario": "ana", "contrasena": "mala" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "usuario": "ana", "contrasena": "secreta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: serde_json::Value = res.json().await.unwrap();
    let token = session["token"].as_str().unwrap();

    let res = client
        .get(srv.url("/mi-perfil"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: serde_json::Value = res.json().await.unwrap();
    assert_eq!(profile["usuario"], "ana");
    assert_eq!(profile["email"], "ana@example.com");
    assert_eq!(profile["role"], "cliente");
}

#[tokio::test]
async fn password_recovery_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client
        .post(srv.url("/auth/register"))
        .json(&json!({ "usuario": "luis", "email": "luis@example.com", "contrasena": "vieja" }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(srv.url("/auth/recuperar-contrasena"))
        .json(&json!({ "email": "nadie@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/auth/recuperar-contrasena"))
        .json(&json!({ "email": "luis@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let sent = srv.mailer.sent();
    assert_eq!(sent.len(), 1);
    let marker = "http://tienda.test/restablecer-contrasena/";
    let start = sent[0].html_body.find(marker).unwrap() + marker.len();
    let token = sent[0].html_body[start..].split('"').next().unwrap();

    let res = client
        .post(srv.url("/auth/restablecer-contrasena"))
        .json(&json!({ "token": token, "nueva_contrasena": "nueva" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "usuario": "luis", "contrasena": "nueva" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/auth/restablecer-contrasena"))
        .json(&json!({ "token": "basura", "nueva_contrasena": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_administration() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let root = mint_jwt(Role::Admin);

    let res = client
        .post(srv.url("/auth/register"))
        .json(&json!({ "usuario": "eva", "email": "eva@example.com", "contrasena": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(srv.url("/usuarios"))
        .bearer_auth(&root)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: serde_json::Value = res.json().await.unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("password_hash").is_none());
    let eva_id = users[0]["_id"].as_str().unwrap().to_string();

    let res = client
        .put(srv.url(&format!("/usuarios/{eva_id}/rol")))
        .bearer_auth(&root)
        .json(&json!({ "role": "superuser" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(srv.url(&format!("/usuarios/{eva_id}/rol")))
        .bearer_auth(&root)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["nuevo_rol"], "admin");

    // Eva logs in as an admin and cannot delete herself
    let res = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "usuario": "eva", "contrasena": "pw" }))
        .send()
        .await
        .unwrap();
    let session: serde_json::Value = res.json().await.unwrap();
    assert_eq!(session["role"], "admin");
    let eva_token = session["token"].as_str().unwrap().to_string();

    let res = client
        .delete(srv.url(&format!("/usuarios/{eva_id}")))
        .bearer_auth(&eva_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(srv.url(&format!("/usuarios/{eva_id}")))
        .bearer_auth(&root)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["usuario_eliminado"], "eva");

    let res = client
        .delete(srv.url(&format!("/usuarios/{eva_id}")))
        .bearer_auth(&root)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
