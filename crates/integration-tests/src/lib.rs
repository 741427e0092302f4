//! Integration test harness for Speaker Lab.
//!
//! Builds the real router over a temporary data directory and a scripted
//! completion client, then drives it in-process with `tower::ServiceExt::oneshot`.
//!
//! ```rust,ignore
//! let app = TestApp::new(ScriptedClient::replying("not json")).await;
//! let cookie = app.signup("ana@example.com", Tier::Free).await;
//! let response = app.post_form("/", &[("speech_text", "Hello")], Some(&cookie)).await;
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use secrecy::SecretString;
use tempfile::TempDir;
use tower::util::ServiceExt;

use speakerlab_core::Tier;
use speakerlab_web::config::{AppConfig, OpenAiConfig};
use speakerlab_web::db::Database;
use speakerlab_web::routes::build_router;
use speakerlab_web::services::auth::AuthService;
use speakerlab_web::services::completion::{CompletionClient, CompletionError, CompletionRequest};
use speakerlab_web::state::AppState;

/// Password used for every account the harness creates.
pub const PASSWORD: &str = "secret123";

/// Model names the test configuration maps the two model classes to.
pub const BASIC_MODEL: &str = "model-a";
pub const ADVANCED_MODEL: &str = "model-b";

// =============================================================================
// Scripted completion client
// =============================================================================

/// What the scripted client answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Reply content.
    Text(String),
    /// Fail as if the provider returned this status.
    Status(u16),
}

/// Completion client that answers from a script and records every request.
pub struct ScriptedClient {
    reply: Mutex<Reply>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    #[must_use]
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Reply::Text(text.to_string()))
    }

    #[must_use]
    pub fn failing(status: u16) -> Arc<Self> {
        Self::with(Reply::Status(status))
    }

    fn with(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Change the answer for later requests.
    pub fn set_reply(&self, text: &str) {
        *self.reply.lock().expect("reply lock") = Reply::Text(text.to_string());
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        let reply = self.reply.lock().expect("reply lock").clone();
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Status(status) => Err(CompletionError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

// =============================================================================
// Test application
// =============================================================================

/// A running (in-process) Speaker Lab instance.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub client: Arc<ScriptedClient>,
    _dir: TempDir,
}

impl TestApp {
    /// Build the app over a fresh data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or stores cannot be created.
    pub async fn new(client: Arc<ScriptedClient>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path().to_path_buf());
        let db = Database::open(&config.data_dir).await.expect("open data dir");
        let state = AppState::new(config, db, client.clone());

        Self {
            router: build_router(state.clone()),
            state,
            client,
            _dir: dir,
        }
    }

    /// Create an account on `tier` and log it in. Returns the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the account cannot be created or the login fails.
    pub async fn signup(&self, email: &str, tier: Tier) -> String {
        AuthService::new(self.state.db().users())
            .create_account(email, "Ana", PASSWORD, tier)
            .await
            .expect("create account");
        self.login(email, PASSWORD)
            .await
            .expect("login should set a session cookie")
    }

    /// Log in through the form. Returns the session cookie if one was set.
    pub async fn login(&self, email: &str, password: &str) -> Option<String> {
        let response = self
            .post_form("/login", &[("email", email), ("password", password)], None)
            .await;
        session_cookie(&response)
    }

    /// Send a GET request.
    ///
    /// # Panics
    ///
    /// Panics if the router fails, which it never does for a valid request.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("request"))
            .await
    }

    /// Send a form POST.
    ///
    /// # Panics
    ///
    /// Panics if the router fails.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form_body(fields))).expect("request"))
            .await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

fn test_config(data_dir: PathBuf) -> AppConfig {
    AppConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 10000,
        base_url: "http://localhost:10000".to_string(),
        session_secret: SecretString::from("k7Qz!m2Rv#p9Lx@w4Tn$b8Yc%h3Jd^f6".repeat(2)),
        data_dir,
        openai: OpenAiConfig {
            api_key: SecretString::from("unused-in-tests"),
            base_url: "http://127.0.0.1:9".to_string(),
            basic_model: BASIC_MODEL.to_string(),
            advanced_model: ADVANCED_MODEL.to_string(),
        },
        seed_admin: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `name=value` pair of the session cookie set by `response`, if any.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("speakerlab_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Redirect target of `response`, if any.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Read the whole body.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

/// Read the whole body as text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("body is UTF-8")
}

/// `application/x-www-form-urlencoded` encoding of `fields`.
#[must_use]
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
