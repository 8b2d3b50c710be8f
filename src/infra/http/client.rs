use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use murales_api_types::{ApiErrorBody, AuthTokens, RefreshRequest, RefreshResponse};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::repos::{RepoError, SessionStore};
use crate::infra::error::InfraError;

/// Invoked when the session cannot be recovered and the user has to log in
/// again.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Redirect hook that only records the event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        info!(
            target = "murales::infra::http",
            "Session expired; log in again with `murales-cli admin login`"
        );
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("base url `{0}` cannot carry a path")]
    BaseUrl(Url),
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not authorized")]
    Unauthorized { body: ApiErrorBody },
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        body: ApiErrorBody,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ApiError> for RepoError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { body } => RepoError::Unauthorized {
                message: body.summary(),
            },
            ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                RepoError::NotFound
            }
            ApiError::Status { status, body } => RepoError::Rejected {
                status: status.as_u16(),
                message: body.summary(),
            },
            ApiError::Decode(err) => RepoError::Decode(err.to_string()),
            ApiError::Transport(err) => RepoError::Transport(err.to_string()),
            ApiError::BaseUrl(url) => RepoError::Transport(format!("invalid base url {url}")),
        }
    }
}

/// Whether a request takes part in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Auth {
    /// Sends the stored access token and refreshes it on `401`.
    Session,
    /// Sends no token; a `401` is final. Used by login and refresh.
    Anonymous,
}

/// A request that can be sent again after a token refresh.
pub(super) struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
    auth: Auth,
}

impl ApiRequest {
    pub(super) fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
            query: Vec::new(),
            body: None,
            auth: Auth::Session,
        }
    }

    pub(super) fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub(super) fn query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub(super) fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub(super) fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }
}

/// Status plus the full response body.
struct Body {
    status: StatusCode,
    bytes: Vec<u8>,
}

/// HTTP access to the gallery backend.
///
/// Requests carry the stored bearer token. A `401` triggers one token
/// refresh, shared by every request that fails concurrently, followed by a
/// single resend. When no refresh is possible the session is cleared and
/// the [`LoginRedirect`] hook runs; the caller sees the original `401`.
pub struct ApiClient {
    http: Client,
    base: Url,
    session: Arc<dyn SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
    refresh_gate: AsyncMutex<()>,
}

impl ApiClient {
    pub fn new(
        base: Url,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, InfraError> {
        if base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "api base url `{base}` cannot carry a path"
            )));
        }
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            session,
            redirect,
            refresh_gate: AsyncMutex::new(()),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("murales-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// `base` joined with `segments`, each percent-encoded as one segment.
    pub(super) fn url(&self, segments: &[String]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::BaseUrl(self.base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(super) async fn fetch<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body.bytes)?)
    }

    /// For endpoints whose success body carries nothing the client needs.
    pub(super) async fn send(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Body, ApiError> {
        let token = match request.auth {
            Auth::Session => self.session.access_token(),
            Auth::Anonymous => None,
        };
        let first = self.dispatch(request, token.as_deref()).await?;
        if first.status != StatusCode::UNAUTHORIZED || request.auth == Auth::Anonymous {
            return into_result(first);
        }

        match self.refresh_after_unauthorized(token.as_deref()).await {
            Some(fresh) => {
                debug!(
                    target = "murales::infra::http",
                    path = %request.segments.join("/"),
                    "Retrying request with refreshed token"
                );
                // Sent once; a second 401 is returned as-is.
                let retried = self.dispatch(request, Some(&fresh)).await?;
                into_result(retried)
            }
            None => into_result(first),
        }
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Body, ApiError> {
        let mut url = self.url(&request.segments)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();
        Ok(Body { status, bytes })
    }

    /// Obtain a usable access token after `stale` was rejected.
    ///
    /// Runs under the refresh gate. A waiter that finds the token already
    /// rotated by the holder uses the new one without refreshing again.
    async fn refresh_after_unauthorized(&self, stale: Option<&str>) -> Option<String> {
        let _gate = self.refresh_gate.lock().await;

        match (stale, self.session.access_token()) {
            (_, Some(current)) if Some(current.as_str()) != stale => return Some(current),
            // Cleared while waiting: the holder's refresh failed.
            (Some(_), None) => return None,
            _ => {}
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            counter!("murales_auth_refresh_total", "outcome" => "missing").increment(1);
            self.end_session("no refresh token stored");
            return None;
        };

        match self.refresh_tokens(&refresh_token).await {
            Ok(tokens) => {
                if let Err(err) = self
                    .session
                    .set_tokens(&tokens.access_token, &tokens.refresh_token)
                {
                    warn!(
                        target = "murales::infra::http",
                        error = %err,
                        "Failed to persist refreshed tokens"
                    );
                }
                counter!("murales_auth_refresh_total", "outcome" => "ok").increment(1);
                info!(target = "murales::infra::http", "Access token refreshed");
                Some(tokens.access_token)
            }
            Err(err) => {
                counter!("murales_auth_refresh_total", "outcome" => "failed").increment(1);
                warn!(
                    target = "murales::infra::http",
                    error = %err,
                    "Token refresh failed"
                );
                self.end_session("refresh rejected");
                None
            }
        }
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let request = ApiRequest::new(Method::POST, &["auth", "refresh"])
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })?
            .anonymous();
        // Dispatched directly: a rejected refresh is final.
        let body = into_result(self.dispatch(&request, None).await?)?;
        let response: RefreshResponse = serde_json::from_slice(&body.bytes)?;
        Ok(response.into_tokens())
    }

    fn end_session(&self, reason: &'static str) {
        warn!(target = "murales::infra::http", reason, "Ending session");
        let cleared = self
            .session
            .clear_tokens()
            .and_then(|()| self.session.set_user(None));
        if let Err(err) = cleared {
            warn!(
                target = "murales::infra::http",
                error = %err,
                "Failed to clear session"
            );
        }
        self.redirect.redirect_to_login();
    }
}

fn into_result(body: Body) -> Result<Body, ApiError> {
    if body.status.is_success() {
        return Ok(body);
    }
    let parsed: ApiErrorBody = serde_json::from_slice(&body.bytes).unwrap_or_default();
    if body.status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized { body: parsed })
    } else {
        Err(ApiError::Status {
            status: body.status,
            body: parsed,
        })
    }
}
