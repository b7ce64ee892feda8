#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use keystone_gate::{
    middleware,
    services::identity::{KeystoneAuth, Validator, headers::UNTRUSTED_IDENTITY_HEADERS},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

/// What the mock authority saw on its last call.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Clone)]
struct Shared {
    status: StatusCode,
    body: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Recorded>>>,
}

/// Keystone stand-in serving `GET /v3/auth/tokens` on an ephemeral port.
pub struct MockAuthority {
    pub endpoint: Url,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Recorded>>>,
}

impl MockAuthority {
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(
        status: StatusCode,
        body: impl Into<String>,
        delay: Duration,
    ) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let shared = Shared {
            status,
            body: body.into(),
            delay,
            calls: calls.clone(),
            last: last.clone(),
        };

        let app = Router::new()
            .route("/v3/auth/tokens", get(tokens))
            .with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: Url::parse(&format!("http://{addr}/v3")).unwrap(),
            calls,
            last,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.last.lock().unwrap().clone()
    }

    pub fn validator(&self) -> Validator {
        Validator::new(&self.endpoint, "keystone-gate-tests/1.0", Duration::from_secs(2)).unwrap()
    }
}

async fn tokens(State(shared): State<Shared>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    shared.calls.fetch_add(1, Ordering::SeqCst);
    *shared.last.lock().unwrap() = Some(Recorded {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
    });

    if !shared.delay.is_zero() {
        tokio::time::sleep(shared.delay).await;
    }

    (
        shared.status,
        [(header::CONTENT_TYPE, "application/json")],
        shared.body.clone(),
    )
}

/// Endpoint nothing listens on.
pub fn unreachable_endpoint() -> Url {
    Url::parse("http://127.0.0.1:9/v3").unwrap()
}

fn timestamp(offset: chrono::Duration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn user() -> Value {
    json!({
        "id": "u-42e54ca0c",
        "name": "arc",
        "description": "Arc Test",
        "email": null,
        "enabled": true,
        "domain_id": "o-testdomain",
        "default_project_id": null,
        "domain": { "id": "o-testdomain", "name": "testdomain" }
    })
}

/// Token envelope valid for another `expires_in`, with `extra` merged into the token object.
pub fn token_body(expires_in: chrono::Duration, extra: Value) -> String {
    let mut token = json!({
        "expires_at": timestamp(expires_in),
        "issued_at": timestamp(-chrono::Duration::hours(1)),
        "methods": ["password"],
        "user": user(),
    });
    if let (Some(token), Value::Object(extra)) = (token.as_object_mut(), extra) {
        token.extend(extra);
    }
    json!({ "token": token }).to_string()
}

pub fn unscoped_body() -> String {
    token_body(chrono::Duration::hours(1), json!({}))
}

pub fn project_scoped_body() -> String {
    token_body(
        chrono::Duration::hours(1),
        json!({
            "project": {
                "uri": "/projects/p-d61611de1",
                "id": "p-d61611de1",
                "domain_id": "o-testdomain",
                "name": "Arc",
                "description": "Arc authentication testbed",
                "enabled": true,
                "parent_id": null,
                "domain": {
                    "uri": "/domains/o-testdomain",
                    "id": "o-testdomain",
                    "name": "testdomain",
                    "enabled": true
                }
            },
            "roles": [{ "id": "r-member", "name": "member" }]
        }),
    )
}

pub fn domain_scoped_body() -> String {
    token_body(
        chrono::Duration::hours(1),
        json!({
            "domain": {
                "uri": "/domains/o-testdomain",
                "id": "o-testdomain",
                "name": "testdomain",
                "enabled": true
            },
            "roles": [
                { "id": "r-member", "name": "member" },
                { "id": "r-blafasel", "name": "blafasel" }
            ]
        }),
    )
}

/// Downstream handler that echoes every identity header it received.
pub struct EchoApp {
    pub router: Router,
    hits: Arc<AtomicUsize>,
}

impl EchoApp {
    pub fn new(auth: Arc<KeystoneAuth>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let router = Router::new().route(
            "/",
            get(move |headers: HeaderMap| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(identity_headers(&headers))
                }
            }),
        );

        Self {
            router: middleware::auth::keystone::apply(router, auth),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Sends `GET /` with `headers` and returns the identity headers the handler saw.
    pub async fn call(&self, headers: &[(&str, &str)]) -> BTreeMap<String, String> {
        let mut req = Request::builder().uri("/");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let resp = self
            .router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn identity_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    UNTRUSTED_IDENTITY_HEADERS
        .iter()
        .filter_map(|name| {
            let values: Vec<&str> = headers
                .get_all(*name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            (!values.is_empty()).then(|| (name.to_string(), values.join(";")))
        })
        .collect()
}
