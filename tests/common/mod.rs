#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use coachdesk::auth::{Claims, Role};

const SECRET: &[u8] = b"mock-backend-secret";
pub const ADMIN_INVITE: &str = "ADMIN-INVITE";

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse";
pub const USER_EMAIL: &str = "coach@example.com";
pub const USER_PASSWORD: &str = "password123";

struct Account {
    id: String,
    password: String,
}

struct Fault {
    method: Option<Method>,
    collection: String,
    status: StatusCode,
}

#[derive(Default)]
struct Db {
    accounts: HashMap<String, Account>,
    collections: HashMap<String, Vec<Value>>,
    faults: Vec<Fault>,
    requests: HashMap<String, usize>,
    revoked: bool,
}

type Shared = Arc<Mutex<Db>>;

/// In-process API backend on a free port, one per test
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    db: Shared,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let db: Shared = Arc::new(Mutex::new(seed()));

        let app = Router::new()
            .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/:collection", get(list).post(create))
            .route("/api/v1/:collection/:id", get(fetch).patch(update).delete(remove))
            .layer(TraceLayer::new_for_http())
            .with_state(db.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, db })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Answer every `method` request on `collection` with `status` (any method when `None`)
    pub fn fail(&self, method: Option<Method>, collection: &str, status: u16) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.db.lock().unwrap().faults.push(Fault { method, collection: collection.to_string(), status });
    }

    /// Requests that reached the backend for `collection` (`auth` for the auth routes)
    pub fn requests(&self, collection: &str) -> usize {
        self.db.lock().unwrap().requests.get(collection).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.db.lock().unwrap().requests.values().sum()
    }

    /// Reject every bearer token from now on, as if the server-side session ended
    pub fn revoke_tokens(&self) {
        self.db.lock().unwrap().revoked = true;
    }

    pub fn clear(&self, collection: &str) {
        self.db.lock().unwrap().collections.insert(collection.to_string(), Vec::new());
    }

    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.db.lock().unwrap().collections.get(collection).cloned().unwrap_or_default()
    }
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A token signed the way the backend signs them
pub fn mint_token(role: Role, ttl_secs: i64) -> String {
    let email = match role {
        Role::Admin => ADMIN_EMAIL,
        Role::User => USER_EMAIL,
    };
    let claims = Claims {
        subject_id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        role,
        exp: Utc::now().timestamp() + ttl_secs,
        iat: Some(Utc::now().timestamp()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).expect("sign token")
}

fn seed() -> Db {
    let mut db = Db::default();
    let now = Utc::now().to_rfc3339();

    let admin_id = Uuid::new_v4().to_string();
    let coach_id = Uuid::new_v4().to_string();
    let client_id = Uuid::new_v4().to_string();

    db.accounts.insert(ADMIN_EMAIL.into(), Account { id: admin_id.clone(), password: ADMIN_PASSWORD.into() });
    db.accounts.insert(USER_EMAIL.into(), Account { id: coach_id.clone(), password: USER_PASSWORD.into() });

    db.collections.insert(
        "users".into(),
        vec![
            json!({"id": admin_id, "email": ADMIN_EMAIL, "name": "Ada Admin", "role": "admin", "is_active": true, "created_at": now}),
            json!({"id": coach_id, "email": USER_EMAIL, "name": "Casey Coach", "role": "user", "is_active": true, "created_at": now}),
            json!({"id": client_id, "email": "client@example.com", "name": "Robin Client", "role": "user", "is_active": false, "created_at": now}),
        ],
    );
    db.collections.insert(
        "subscriptions".into(),
        vec![
            json!({"id": Uuid::new_v4(), "user_id": coach_id, "plan": "pro", "status": "active", "amount": "49.99", "renews_at": now}),
            json!({"id": Uuid::new_v4(), "user_id": client_id, "plan": "basic", "status": "past_due", "amount": "10.00", "renews_at": null}),
            json!({"id": Uuid::new_v4(), "user_id": admin_id, "plan": "pro", "status": "cancelled", "amount": "49.99", "renews_at": null}),
        ],
    );
    db.collections.insert(
        "flags".into(),
        vec![
            json!({"id": Uuid::new_v4(), "key": "weekly_digest", "enabled": false, "description": "Weekly email digest", "config": {}}),
            json!({"id": Uuid::new_v4(), "key": "ai_notes", "enabled": true, "description": "Session notes", "config": {"model": "small"}}),
        ],
    );
    db.collections.insert(
        "feedback".into(),
        vec![
            json!({"id": Uuid::new_v4(), "coach_id": coach_id, "client_id": client_id, "rating": 5, "comment": "Great session", "created_at": now}),
            json!({"id": Uuid::new_v4(), "coach_id": coach_id, "client_id": client_id, "rating": 4, "comment": null, "created_at": now}),
        ],
    );
    db
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

fn wrapped(status: StatusCode, data: Value) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn record(db: &mut Db, method: &Method, collection: &str) -> Option<Response> {
    *db.requests.entry(collection.to_string()).or_insert(0) += 1;
    db.faults
        .iter()
        .find(|f| f.collection == collection && f.method.as_ref().map_or(true, |m| m == method))
        .map(|f| error(f.status, "injected failure"))
}

fn bearer(db: &Db, headers: &HeaderMap) -> Result<Claims, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    if db.revoked {
        return Err(error(StatusCode::UNAUTHORIZED, "session revoked"));
    }
    decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| error(StatusCode::UNAUTHORIZED, "invalid token"))
}

fn authorize(db: &Db, headers: &HeaderMap, collection: &str) -> Result<Claims, Response> {
    let claims = bearer(db, headers)?;
    let admin_only = matches!(collection, "users" | "subscriptions" | "flags");
    if admin_only && claims.role != Role::Admin {
        return Err(error(StatusCode::FORBIDDEN, "admin only"));
    }
    Ok(claims)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn login(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::POST, "auth") {
        return fault;
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(account) = db.accounts.get(email).filter(|a| a.password == password) else {
        return error(StatusCode::UNAUTHORIZED, "invalid credentials");
    };
    let role = db.collections["users"]
        .iter()
        .find(|u| u["id"] == account.id.as_str())
        .and_then(|u| serde_json::from_value::<Role>(u["role"].clone()).ok())
        .unwrap_or(Role::User);

    let claims = Claims {
        subject_id: account.id.clone(),
        email: email.to_string(),
        role,
        exp: Utc::now().timestamp() + 3600,
        iat: Some(Utc::now().timestamp()),
    };
    match encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)) {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(_) => error(StatusCode::INTERNAL_SERVER_ERROR, "could not sign token"),
    }
}

async fn register(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::POST, "auth") {
        return fault;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.accounts.contains_key(&email) {
        return error(StatusCode::CONFLICT, "email already registered");
    }

    let role = if body["invitation_code"] == ADMIN_INVITE { "admin" } else { "user" };
    let id = Uuid::new_v4().to_string();
    let user = json!({
        "id": id,
        "email": email,
        "name": body["name"],
        "role": role,
        "is_active": true,
        "created_at": Utc::now().to_rfc3339(),
    });
    db.accounts.insert(
        email,
        Account { id, password: body["password"].as_str().unwrap_or_default().to_string() },
    );
    db.collections.entry("users".into()).or_default().push(user.clone());
    wrapped(StatusCode::CREATED, user)
}

async fn me(State(db): State<Shared>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::GET, "auth") {
        return fault;
    }
    let claims = match bearer(&db, &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    match db.collections["users"].iter().find(|u| u["email"] == claims.email.as_str()) {
        Some(user) => wrapped(StatusCode::OK, user.clone()),
        None => error(StatusCode::NOT_FOUND, "no such user"),
    }
}

async fn logout(State(db): State<Shared>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::POST, "auth") {
        return fault;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list(
    State(db): State<Shared>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::GET, &collection) {
        return fault;
    }
    if let Err(response) = authorize(&db, &headers, &collection) {
        return response;
    }
    let Some(rows) = db.collections.get(&collection) else {
        return error(StatusCode::NOT_FOUND, "no such collection");
    };

    let offset = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(usize::MAX);
    let search = params.get("search").map(|s| s.to_lowercase());

    let matched: Vec<Value> = rows
        .iter()
        .filter(|row| {
            params
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "limit" | "offset" | "search"))
                .all(|(k, v)| row.get(k).map(text).as_deref() == Some(v.as_str()))
        })
        .filter(|row| match &search {
            Some(needle) => row
                .as_object()
                .map(|o| o.values().any(|v| text(v).to_lowercase().contains(needle)))
                .unwrap_or(false),
            None => true,
        })
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    wrapped(StatusCode::OK, Value::Array(matched))
}

async fn fetch(State(db): State<Shared>, Path((collection, id)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::GET, &collection) {
        return fault;
    }
    if let Err(response) = authorize(&db, &headers, &collection) {
        return response;
    }
    match db.collections.get(&collection).and_then(|rows| rows.iter().find(|r| r["id"] == id.as_str())) {
        Some(row) => wrapped(StatusCode::OK, row.clone()),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn create(
    State(db): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::POST, &collection) {
        return fault;
    }
    if let Err(response) = authorize(&db, &headers, &collection) {
        return response;
    }
    let Value::Object(mut row) = body else {
        return error(StatusCode::BAD_REQUEST, "body must be an object");
    };
    row.insert("id".into(), json!(Uuid::new_v4()));
    row.entry("created_at").or_insert_with(|| json!(Utc::now().to_rfc3339()));
    let row = Value::Object(row);
    db.collections.entry(collection).or_default().push(row.clone());
    wrapped(StatusCode::CREATED, row)
}

async fn update(
    State(db): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::PATCH, &collection) {
        return fault;
    }
    if let Err(response) = authorize(&db, &headers, &collection) {
        return response;
    }
    let Some(row) = db
        .collections
        .get_mut(&collection)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id.as_str()))
    else {
        return error(StatusCode::NOT_FOUND, "not found");
    };
    if let (Some(target), Some(patch)) = (row.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    wrapped(StatusCode::OK, row.clone())
}

async fn remove(State(db): State<Shared>, Path((collection, id)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(fault) = record(&mut db, &Method::DELETE, &collection) {
        return fault;
    }
    if let Err(response) = authorize(&db, &headers, &collection) {
        return response;
    }
    let Some(rows) = db.collections.get_mut(&collection) else {
        return error(StatusCode::NOT_FOUND, "no such collection");
    };
    let before = rows.len();
    rows.retain(|r| r["id"] != id.as_str());
    if rows.len() == before {
        return error(StatusCode::NOT_FOUND, "not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
