//! In-memory stand-in for the results server.
//!
//! Implements the authentication endpoint with real session bookkeeping and
//! a privileged results endpoint that rejects calls without a live session
//! the way the HTTP transport reports a bare 401 page.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reportview_core::api::{ClientError, Connector, ErrorCode, Transport};
use reportview_core::auth::USERNAME_PASSWORD_SCHEME;
use reportview_core::Config;
use serde_json::{json, Value};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct State {
    requires_auth: bool,
    users: HashMap<String, String>,
    sessions: HashMap<String, String>,
    issued: u64,
    items: Vec<Value>,
    /// Server-side cap on items per page, applied on top of the requested limit.
    page_cap: Option<usize>,
    /// `(limit, offset)` of every page request seen.
    page_calls: Vec<(usize, usize)>,
    /// Page request numbers (0-based) that fail with a connection reset.
    drop_page_calls: Vec<usize>,
    /// Page request numbers (0-based) that fail with a database error.
    fail_page_calls: Vec<usize>,
}

#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    /// A server requiring authentication with a single user `cc:test`.
    pub fn privileged() -> Self {
        let server = Self::default();
        {
            let mut state = server.state.lock().unwrap();
            state.requires_auth = true;
            state.users.insert("cc".to_string(), "test".to_string());
        }
        server
    }

    pub fn open() -> Self {
        let server = Self::default();
        server.state.lock().unwrap().users.insert("cc".to_string(), "test".to_string());
        server
    }

    pub fn with_items(self, items: Vec<Value>) -> Self {
        self.state.lock().unwrap().items = items;
        self
    }

    pub fn with_page_cap(self, cap: usize) -> Self {
        self.state.lock().unwrap().page_cap = Some(cap);
        self
    }

    pub fn drop_page_call(self, n: usize) -> Self {
        self.state.lock().unwrap().drop_page_calls.push(n);
        self
    }

    pub fn fail_page_call(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_page_calls.push(n);
        self
    }

    pub fn page_calls(&self) -> Vec<(usize, usize)> {
        self.state.lock().unwrap().page_calls.clone()
    }

    pub fn live_sessions(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            server: self.clone(),
            cookie_name: Config::default().session_cookie_name,
        }
    }
}

pub struct FakeConnector {
    server: FakeServer,
    cookie_name: String,
}

impl Connector for FakeConnector {
    type Transport = FakeTransport;

    fn connect(&self, path: &str) -> Result<FakeTransport, ClientError> {
        Ok(FakeTransport {
            server: self.server.clone(),
            path: path.to_string(),
            cookie_name: self.cookie_name.clone(),
            token: None,
            open: false,
        })
    }
}

pub struct FakeTransport {
    server: FakeServer,
    path: String,
    cookie_name: String,
    token: Option<String>,
    open: bool,
}

#[async_trait]
impl Transport for FakeTransport {
    fn open(&mut self) -> Result<(), ClientError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        if name.eq_ignore_ascii_case("cookie") {
            if let Some((cookie, token)) = value.split_once('=') {
                if cookie == self.cookie_name {
                    self.token = Some(token.to_string());
                }
            }
        }
        Ok(())
    }

    async fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, ClientError> {
        self.handle(method, args)
    }
}

impl FakeTransport {
    fn handle(&self, method: &str, args: &[Value]) -> Result<Value, ClientError> {
        if !self.open {
            return Err(ClientError::Transport("not open".to_string()));
        }
        let mut state = self.server.state.lock().unwrap();
        let session_user = self
            .token
            .as_ref()
            .and_then(|token| state.sessions.get(token))
            .cloned();

        if self.path == "/Authentication" {
            return authentication(&mut state, method, args, self.token.as_deref(), session_user);
        }

        if state.requires_auth && session_user.is_none() {
            return Err(ClientError::Protocol(
                "HTTP 401 Unauthorized: <html><body>Unauthorized</body></html>".to_string(),
            ));
        }
        results(&mut state, method, args)
    }
}

fn request_failed(code: ErrorCode, message: &str) -> ClientError {
    ClientError::RequestFailed {
        code,
        message: message.to_string(),
    }
}

fn authentication(
    state: &mut State,
    method: &str,
    args: &[Value],
    token: Option<&str>,
    session_user: Option<String>,
) -> Result<Value, ClientError> {
    match method {
        "getAuthParameters" => Ok(json!({
            "requiresAuthentication": state.requires_auth,
            "sessionStillActive": session_user.is_some(),
        })),
        "getAcceptedAuthMethods" => Ok(json!([USERNAME_PASSWORD_SCHEME])),
        "performLogin" => {
            let scheme = args.first().and_then(Value::as_str).unwrap_or_default();
            let secret = args.get(1).and_then(Value::as_str).unwrap_or_default();
            let valid = scheme == USERNAME_PASSWORD_SCHEME
                && secret
                    .split_once(':')
                    .map(|(user, pass)| state.users.get(user).map(String::as_str) == Some(pass))
                    .unwrap_or(false);
            if !valid {
                return Err(request_failed(ErrorCode::AuthDenied, "Invalid credentials supplied."));
            }
            state.issued += 1;
            let token = format!("session-{:04}", state.issued);
            let user = secret.split_once(':').map(|(user, _)| user).unwrap_or_default();
            state.sessions.insert(token.clone(), user.to_string());
            Ok(json!(token))
        }
        "getLoggedInUser" => Ok(json!(session_user.unwrap_or_default())),
        "destroySession" => {
            let removed = token.map(|t| state.sessions.remove(t).is_some()).unwrap_or(false);
            Ok(json!(removed))
        }
        other => Err(request_failed(ErrorCode::General, &format!("Unknown method {}", other))),
    }
}

fn results(state: &mut State, method: &str, args: &[Value]) -> Result<Value, ClientError> {
    match method {
        "getAPIVersion" => Ok(json!("6.19")),
        "getPackageVersion" => Ok(json!("6.19.1")),
        "getProducts" => Ok(json!([{"endpoint": "Default", "displayedName": "Default"}])),
        "getCurrentProduct" => Ok(json!({"endpoint": "Default", "displayedName": "Default"})),
        "getRunResultCount" => Ok(json!(state.items.len())),
        // getRunResults(runIds, limit, offset, sortMode, filter)
        "getRunResults" => page(state, args, 1),
        // getRunResults_v2(runIds, limit, offset, sortMode, filter, cmpData)
        "getRunResults_v2" if args.len() == 6 => page(state, args, 1),
        // getRuns(nameFilter, limit, offset, sortMode, order)
        "getRuns" => page(state, args, args.len().saturating_sub(4)),
        other => Err(request_failed(ErrorCode::General, &format!("Unknown method {}", other))),
    }
}

fn page(state: &mut State, args: &[Value], limit_at: usize) -> Result<Value, ClientError> {
    let limit = args.get(limit_at).and_then(Value::as_u64).unwrap_or(0) as usize;
    let offset = args.get(limit_at + 1).and_then(Value::as_u64).unwrap_or(0) as usize;
    let call_no = state.page_calls.len();
    state.page_calls.push((limit, offset));

    if state.drop_page_calls.contains(&call_no) {
        return Err(ClientError::Connection("connection reset by peer".to_string()));
    }
    if state.fail_page_calls.contains(&call_no) {
        return Err(request_failed(ErrorCode::Database, "database unavailable"));
    }

    let take = state.page_cap.map_or(limit, |cap| cap.min(limit));
    let start = offset.min(state.items.len());
    let end = (start + take).min(state.items.len());
    Ok(Value::Array(state.items[start..end].to_vec()))
}

pub fn letters(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!(((b'A' + (i % 26) as u8) as char).to_string() + &(i / 26).to_string()))
        .collect()
}
