//! Account backend over the Parcelbox account API.
//!
//! The access token lives in memory only. Sign-in and sign-out are announced to local
//! subscribers; profile changes arrive as server-sent events.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use futures::StreamExt;
use parcelbox_auth_types::wire::{
    self, CreateAccountRequest, ErrorBody, PROFILE_CHANGED_EVENT, SessionResponse, SignInRequest,
};
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, ProfileUpdate};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::port::{
    AuthBackend, AuthChange, NewAccount, PortError, ProfileChange, ProfileStore, Subscription,
    fan_out,
};

struct Inner {
    client: reqwest::Client,
    /// No overall timeout; event streams stay open.
    stream_client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthChange>>>,
}

/// Implements both [`AuthBackend`] and [`ProfileStore`]. Clones share the token.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .context("failed to build streaming HTTP client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                stream_client,
                base_url: config.api_url.clone(),
                token: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Resume a session from a previously issued access token.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        *lock(&self.inner.token) = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.inner.token).clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn emit(&self, change: AuthChange) {
        fan_out(&mut lock(&self.inner.subscribers), &change);
    }
}

async fn send(request: RequestBuilder) -> Result<Response, PortError> {
    let response = request
        .send()
        .await
        .map_err(|e| PortError::Unavailable(anyhow::Error::new(e).context("request failed")))?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from(response).await)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, PortError> {
    response
        .json()
        .await
        .map_err(|e| PortError::Unavailable(anyhow::Error::new(e).context("malformed response body")))
}

/// Map a failing response onto [`PortError`], preferring the body's `kind`.
async fn error_from(response: Response) -> PortError {
    let status = response.status();
    let body = response.json::<ErrorBody>().await.ok();

    match body.as_ref().map(|b| b.kind.as_str()) {
        Some(wire::kind::INVALID_CREDENTIALS) => return PortError::InvalidCredentials,
        Some(wire::kind::ACCOUNT_ALREADY_EXISTS) => return PortError::DuplicateAccount,
        Some(wire::kind::PROFILE_ALREADY_EXISTS) => return PortError::AlreadyExists,
        _ => {}
    }
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::FORBIDDEN => PortError::Forbidden,
        StatusCode::NOT_FOUND => PortError::NotFound,
        StatusCode::CONFLICT => PortError::AlreadyExists,
        _ => {
            let message = body.map(|b| b.message).unwrap_or_default();
            PortError::Unavailable(anyhow::anyhow!("account API returned {status}: {message}"))
        }
    }
}

impl AuthBackend for HttpBackend {
    async fn create_account(&self, account: &NewAccount) -> Result<Identity, PortError> {
        let body = CreateAccountRequest {
            email: account.email.clone(),
            password: account.password.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: Some(account.role),
        };
        let request = self.inner.client.post(self.url("/auth/accounts")).json(&body);
        read_json(send(self.authorized(request)).await?).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, PortError> {
        let body = SignInRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let request = self.inner.client.post(self.url("/auth/session")).json(&body);
        let session: SessionResponse = read_json(send(request).await?).await?;

        *lock(&self.inner.token) = Some(session.access_token);
        debug!(identity_id = %session.identity.id, "signed in");
        self.emit(AuthChange::SignedIn(session.identity.clone()));
        Ok(session.identity)
    }

    async fn terminate_session(&self) -> Result<(), PortError> {
        let token = lock(&self.inner.token).take();
        let result = match token {
            Some(token) => {
                let request = self.inner.client.delete(self.url("/auth/session"));
                send(request.bearer_auth(token)).await.map(|_| ())
            }
            None => Ok(()),
        };
        self.emit(AuthChange::SignedOut);

        match result {
            // Already gone on the server.
            Err(PortError::Unauthorized) => Ok(()),
            other => other,
        }
    }

    async fn get_session(&self) -> Result<Option<Identity>, PortError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        let request = self.inner.client.get(self.url("/auth/session"));
        match send(request.bearer_auth(&token)).await {
            Ok(response) => read_json(response).await.map(Some),
            Err(PortError::Unauthorized) => {
                let mut current = lock(&self.inner.token);
                if current.as_deref() == Some(token.as_str()) {
                    *current = None;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn on_session_change(&self) -> Subscription<AuthChange> {
        let (tx, subscription) = Subscription::channel();
        lock(&self.inner.subscribers).push(tx);
        subscription
    }
}

impl ProfileStore for HttpBackend {
    async fn select(&self, id: IdentityId) -> Result<Option<Profile>, PortError> {
        let request = self.inner.client.get(self.url(&format!("/profiles/{id}")));
        match send(self.authorized(request)).await {
            Ok(response) => read_json(response).await.map(Some),
            Err(PortError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, profile: &Profile) -> Result<Profile, PortError> {
        let request = self.inner.client.post(self.url("/profiles")).json(profile);
        read_json(send(self.authorized(request)).await?).await
    }

    async fn update(&self, id: IdentityId, update: &ProfileUpdate) -> Result<Profile, PortError> {
        let request = self
            .inner
            .client
            .patch(self.url(&format!("/profiles/{id}")))
            .json(update);
        read_json(send(self.authorized(request)).await?).await
    }

    async fn watch(&self, id: IdentityId) -> Result<Subscription<ProfileChange>, PortError> {
        let request = self
            .inner
            .stream_client
            .get(self.url(&format!("/profiles/{id}/events")));
        let response = send(self.authorized(request)).await?;

        let (tx, subscription) = Subscription::channel();
        tokio::spawn(forward_profile_events(response, tx));
        Ok(subscription)
    }
}

/// Pump `profile_changed` events into `tx` until either side goes away.
async fn forward_profile_events(response: Response, tx: mpsc::UnboundedSender<ProfileChange>) {
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::default();

    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => break,
            chunk = stream.next() => chunk,
        };
        let bytes = match chunk {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                warn!(error = %e, "profile event stream failed");
                break;
            }
            None => break,
        };

        for event in decoder.push(&bytes) {
            if event.event.as_deref() != Some(PROFILE_CHANGED_EVENT) {
                continue;
            }
            match serde_json::from_str::<Profile>(&event.data) {
                Ok(profile) => {
                    if tx.send(ProfileChange::Updated(profile)).is_err() {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "malformed profile event"),
            }
        }
    }
    debug!("profile event stream ended");
}

// ── Server-sent events ──────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct SseEvent {
    event: Option<String>,
    data: String,
}

/// Incremental `text/event-stream` decoder. Chunks may split lines anywhere.
#[derive(Default)]
struct SseDecoder {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if self.data.is_empty() {
                    self.event = None;
                } else {
                    events.push(SseEvent {
                        event: self.event.take(),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_owned()),
                "data" => self.data.push(value.to_owned()),
                _ => {}
            }
        }
        events
    }
}
