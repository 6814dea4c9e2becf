//! In-process stand-in for the catalogue service.
//!
//! Runs an `actix-web` server on an ephemeral port in its own thread and
//! mimics the token-auth and listing endpoints closely enough to exercise the
//! HTTP adapters end to end: trailing-slash paths, `Token <t>` headers, 401 for
//! unknown tokens, field-keyed validation bodies and `icontains` filtering.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Mutex, mpsc};
use std::thread;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use url::Url;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct Account {
    id: u64,
    username: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct StubState {
    accounts: Mutex<Vec<Account>>,
    tokens: Mutex<HashMap<String, String>>,
    shorts: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

enum Caller {
    Anonymous,
    Known(String),
    Unknown,
}

impl StubState {
    fn record(&self, req: &HttpRequest, body: &[u8]) {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        self.requests.lock().expect("requests lock").push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_owned(),
            query: req.query_string().to_owned(),
            authorization,
            body: body.to_vec(),
        });
    }

    fn caller(&self, req: &HttpRequest) -> Caller {
        let Some(value) = req.headers().get(header::AUTHORIZATION) else {
            return Caller::Anonymous;
        };
        let token = value
            .to_str()
            .ok()
            .and_then(|raw| raw.strip_prefix("Token "))
            .unwrap_or_default();
        match self.tokens.lock().expect("tokens lock").get(token) {
            Some(username) => Caller::Known(username.clone()),
            None => Caller::Unknown,
        }
    }

    fn account_json(&self, username: &str) -> Option<Value> {
        self.accounts
            .lock()
            .expect("accounts lock")
            .iter()
            .find(|account| account.username == username)
            .map(|account| json!({"id": account.id, "username": account.username, "email": account.email}))
    }
}

fn invalid_token() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({"detail": "Invalid token."}))
}

fn not_provided() -> HttpResponse {
    HttpResponse::Unauthorized()
        .json(json!({"detail": "Authentication credentials were not provided."}))
}

async fn login(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    state.record(&req, &body);
    let payload: Value = serde_json::from_slice(&body).unwrap_or_default();
    let username = payload["username"].as_str().unwrap_or_default();
    let password = payload["password"].as_str().unwrap_or_default();
    let matches = state
        .accounts
        .lock()
        .expect("accounts lock")
        .iter()
        .any(|account| account.username == username && account.password == password);
    if !matches {
        return HttpResponse::BadRequest().json(json!({
            "non_field_errors": ["Unable to log in with provided credentials."]
        }));
    }
    let token = format!("tok-{username}");
    state
        .tokens
        .lock()
        .expect("tokens lock")
        .insert(token.clone(), username.to_owned());
    HttpResponse::Ok().json(json!({"auth_token": token}))
}

async fn logout(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    state.record(&req, &body);
    match state.caller(&req) {
        Caller::Known(username) => {
            state
                .tokens
                .lock()
                .expect("tokens lock")
                .retain(|_, owner| *owner != username);
            HttpResponse::NoContent().finish()
        }
        Caller::Unknown => invalid_token(),
        Caller::Anonymous => not_provided(),
    }
}

async fn register(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    state.record(&req, &body);
    let payload: Value = serde_json::from_slice(&body).unwrap_or_default();
    let username = payload["username"].as_str().unwrap_or_default().to_owned();
    let email = payload["email"].as_str().unwrap_or_default().to_owned();
    let password = payload["password"].as_str().unwrap_or_default().to_owned();

    let mut accounts = state.accounts.lock().expect("accounts lock");
    if accounts.iter().any(|account| account.username == username) {
        return HttpResponse::BadRequest().json(json!({
            "username": ["A user with that username already exists."]
        }));
    }
    let id = accounts.len() as u64 + 1;
    accounts.push(Account {
        id,
        username: username.clone(),
        email: email.clone(),
        password,
    });
    HttpResponse::Created().json(json!({"id": id, "username": username, "email": email}))
}

async fn me(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    state.record(&req, &body);
    match state.caller(&req) {
        Caller::Known(username) => match state.account_json(&username) {
            Some(account) => HttpResponse::Ok().json(account),
            None => invalid_token(),
        },
        Caller::Unknown => invalid_token(),
        Caller::Anonymous => not_provided(),
    }
}

fn contains(haystack: &Value, needle: &str) -> bool {
    haystack
        .as_str()
        .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
}

async fn list_shorts(
    req: HttpRequest,
    body: web::Bytes,
    query: web::Query<HashMap<String, String>>,
    state: web::Data<StubState>,
) -> HttpResponse {
    state.record(&req, &body);
    if let Caller::Unknown = state.caller(&req) {
        return invalid_token();
    }
    let shorts = state.shorts.lock().expect("shorts lock");
    let matching: Vec<&Value> = shorts
        .iter()
        .filter(|short| {
            query
                .get("title")
                .is_none_or(|needle| contains(&short["title"], needle))
                && query
                    .get("description")
                    .is_none_or(|needle| contains(&short["description"], needle))
                && query.get("tag").is_none_or(|needle| {
                    short["tags"]
                        .as_array()
                        .is_some_and(|tags| tags.iter().any(|tag| contains(tag, needle)))
                })
        })
        .collect();
    HttpResponse::Ok().json(matching)
}

async fn create_short(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<StubState>,
) -> HttpResponse {
    state.record(&req, &body);
    let username = match state.caller(&req) {
        Caller::Known(username) => username,
        Caller::Unknown => return invalid_token(),
        Caller::Anonymous => return not_provided(),
    };
    let mut shorts = state.shorts.lock().expect("shorts lock");
    let id = shorts.len() as u64 + 100;
    let created = short_json(id, "uploaded", "", &[], &username);
    shorts.push(created.clone());
    HttpResponse::Created().json(created)
}

fn short_json(id: u64, title: &str, description: &str, tags: &[&str], owner: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": description,
        "video_file": format!("http://testserver/media/shorts/videos/{id}.mp4"),
        "thumbnail": null,
        "views": 0,
        "created_at": "2025-11-02T09:30:00.000000Z",
        "updated_at": "2025-11-02T09:30:00.000000Z",
        "user": owner,
        "tags": tags,
    })
}

/// Running stub; stops the server on drop.
pub struct StubService {
    base_url: Url,
    state: web::Data<StubState>,
    handle: ServerHandle,
}

impl StubService {
    /// Start the stub with no accounts and no shorts.
    pub fn start() -> Self {
        let state = web::Data::new(StubState::default());
        let app_state = state.clone();
        let (sender, receiver) = mpsc::channel::<(SocketAddr, ServerHandle)>();

        thread::spawn(move || {
            actix_rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .route("/api/auth/token/login/", web::post().to(login))
                        .route("/api/auth/token/logout/", web::post().to(logout))
                        .route("/api/auth/users/", web::post().to(register))
                        .route("/api/auth/users/me/", web::get().to(me))
                        .route("/api/shorts/", web::get().to(list_shorts))
                        .route("/api/shorts/", web::post().to(create_short))
                })
                .workers(1)
                .bind(("127.0.0.1", 0))
                .expect("bind stub service");
                let addr = server.addrs()[0];
                let server = server.run();
                sender
                    .send((addr, server.handle()))
                    .expect("report stub address");
                server.await.expect("stub service runs");
            });
        });

        let (addr, handle) = receiver.recv().expect("stub service started");
        let base_url = Url::parse(&format!("http://{addr}/api/")).expect("stub url");
        Self {
            base_url,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Add an account that can sign in.
    pub fn with_account(self, username: &str, password: &str) -> Self {
        {
            let mut accounts = self.state.accounts.lock().expect("accounts lock");
            let id = accounts.len() as u64 + 1;
            accounts.push(Account {
                id,
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                password: password.to_owned(),
            });
        }
        self
    }

    /// Add a catalogue item owned by `owner`.
    pub fn with_short(self, id: u64, title: &str, description: &str, tags: &[&str]) -> Self {
        self.state
            .shorts
            .lock()
            .expect("shorts lock")
            .push(short_json(id, title, description, tags, "alice"));
        self
    }

    /// Make `token` valid for `username`, as if issued in an earlier run.
    pub fn issue_token(&self, token: &str, username: &str) {
        self.state
            .tokens
            .lock()
            .expect("tokens lock")
            .insert(token.to_owned(), username.to_owned());
    }

    /// Expire every token server-side.
    pub fn revoke_all_tokens(&self) {
        self.state.tokens.lock().expect("tokens lock").clear();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Recorded requests for one path, oldest first.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().expect("requests lock").clear();
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        // The stop command is sent eagerly; completion is not awaited.
        drop(self.handle.stop(false));
    }
}
