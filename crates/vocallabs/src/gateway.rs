//! Authenticated request gateway.
//!
//! Every outbound call goes through [`Gateway::send`], which:
//! 1. Serves a cached bearer token, or exchanges the credentials for a new one.
//! 2. Attaches `Authorization: Bearer <token>` after the caller's headers, so
//!    the caller cannot replace it.
//! 3. Normalizes any failure through [`ErrorShape`].
//! 4. Evicts the cached token when the API answers 401.
//!
//! Nothing is retried here; the 401 eviction only affects the next call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::credentials::{VocallabsCredentials, DOCUMENTATION_URL};
use crate::error::{ErrorKind, ErrorShape, NormalizedError, ResponseBody, TRANSPORT_HTTP_CODE};
use crate::request::RequestDescriptor;
use crate::token_cache::TokenCache;

/// Token issuance endpoint.
pub const TOKEN_PATH: &str = "/b2b/createAuthToken/";

/// Response keys that may carry the token, highest priority first.
pub const TOKEN_FIELDS: [&str; 4] = ["auth_token", "token", "access_token", "authToken"];

/// Response keys that may carry the account's user id, highest priority first.
pub const USER_ID_FIELDS: [&str; 4] = ["user_id", "userId", "client_id", "id"];

/// Result of a successful credential exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub token: String,
    pub user_id: Option<String>,
    /// The issuance response as received.
    pub raw: Value,
}

/// First non-empty string among [`TOKEN_FIELDS`].
pub fn extract_token(body: &Value) -> Option<String> {
    TOKEN_FIELDS.iter().find_map(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First populated field among [`USER_ID_FIELDS`]; numeric ids are stringified.
pub fn extract_user_id(body: &Value) -> Option<String> {
    USER_ID_FIELDS.iter().find_map(|field| match body.get(*field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub struct Gateway {
    http: reqwest::Client,
    config: GatewayConfig,
    cache: Arc<TokenCache>,
}

impl Gateway {
    /// Create a gateway backed by `cache`.
    ///
    /// Gateways that share a cache share tokens per credential identity.
    pub fn new(config: GatewayConfig, cache: Arc<TokenCache>) -> Result<Self, NormalizedError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            NormalizedError::new(
                ErrorKind::Network,
                format!("failed to build HTTP client: {e}"),
                TRANSPORT_HTTP_CODE,
            )
        })?;
        Ok(Self { http, config, cache })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Exchange the credentials for a fresh token. Does not touch the cache.
    ///
    /// # Errors
    /// [`ErrorKind::Authentication`] when the API rejects the credentials or
    /// answers without a token; transport and 5xx failures keep their kind.
    #[instrument(skip_all, fields(client_id = %credentials.client_id))]
    pub async fn exchange(&self, credentials: &VocallabsCredentials) -> Result<TokenGrant, NormalizedError> {
        let url = self.config.url_for(TOKEN_PATH);
        debug!("exchanging credentials for an auth token");

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "clientId": credentials.client_id,
                "clientSecret": credentials.client_secret,
            }))
            .send()
            .await
            .map_err(|e| exchange_failure(ErrorShape::from_reqwest(&e)))?;

        let body = read_body(response).await.map_err(exchange_failure)?;

        let token = extract_token(&body).ok_or_else(|| {
            NormalizedError::authentication(
                "Authentication failed: could not retrieve an authentication token from the \
                 VocalLabs response. Check your VocalLabs credentials (Client ID & Secret), or \
                 refresh them in the Dashboard, then try again.",
                "401",
            )
        })?;

        info!("obtained auth token");
        Ok(TokenGrant {
            token,
            user_id: extract_user_id(&body),
            raw: body,
        })
    }

    /// A valid bearer token for `credentials`, exchanging only when the
    /// cache has none.
    pub async fn token(&self, credentials: &VocallabsCredentials) -> Result<String, NormalizedError> {
        let identity = credentials.identity();
        if let Some(token) = self.cache.valid_token(identity, Utc::now()) {
            debug!(client_id = identity, "reusing cached auth token");
            return Ok(token);
        }

        let grant = self.exchange(credentials).await?;
        self.cache
            .store(identity, grant.token.clone(), Utc::now(), self.config.token_ttl);
        Ok(grant.token)
    }

    /// Execute `request` with a bearer token and return the JSON body.
    ///
    /// An empty body is returned as `null`; a non-JSON body as a string.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn send(
        &self,
        credentials: &VocallabsCredentials,
        request: &RequestDescriptor,
    ) -> Result<Value, NormalizedError> {
        let token = self.token(credentials).await?;

        let mut builder = self
            .http
            .request(request.method.clone(), self.config.url_for(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                warn!("ignoring caller-supplied Authorization header");
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder.bearer_auth(&token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let outcome = match builder.send().await {
            Ok(response) => read_body(response).await,
            Err(e) => Err(ErrorShape::from_reqwest(&e)),
        };

        outcome.map_err(|shape| {
            let err = shape.normalize();
            if err.status() == Some(401) {
                self.cache.evict(credentials.identity());
                warn!("token rejected; cached token evicted");
            } else {
                warn!(http_code = %err.http_code, kind = ?err.kind, "request failed");
            }
            err
        })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.config.base_url)
            .field("cached_tokens", &self.cache.len())
            .finish()
    }
}

/// Read a response into JSON, or into an [`ErrorShape`] for non-2xx.
async fn read_body(response: reqwest::Response) -> Result<Value, ErrorShape> {
    let status = response.status();
    let retry_after = retry_after_header(&response);
    let text = response
        .text()
        .await
        .map_err(|e| unreadable_body(status.as_u16(), retry_after, ErrorShape::from_reqwest(&e)))?;

    debug!(status = status.as_u16(), bytes = text.len(), "response received");

    if !status.is_success() {
        return Err(ErrorShape::Response {
            status: status.as_u16(),
            body: ResponseBody::from_text(text),
            retry_after,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// A body that could not be read. An error status is kept so a 401 still
/// evicts the token.
fn unreadable_body(status: u16, retry_after: Option<Duration>, transport: ErrorShape) -> ErrorShape {
    if (200..300).contains(&status) {
        return transport;
    }
    ErrorShape::Response {
        status,
        body: ResponseBody::Empty,
        retry_after,
    }
}

fn retry_after_header(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

/// Numeric `Retry-After` value (seconds). HTTP-date and unrepresentable
/// values are ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Turn a failed credential exchange into an actionable error.
fn exchange_failure(shape: ErrorShape) -> NormalizedError {
    let err = shape.normalize();
    let api_message = err.message.clone();
    let lower = api_message.to_lowercase();

    if lower.contains("ip") && lower.contains("whitelisted") {
        let http_code = err.http_code.clone();
        return NormalizedError::authentication(
            format!(
                "IP Not Whitelisted: {api_message}.\nTo fix:\n\
                 1. Find your server's IP: curl ifconfig.me\n\
                 2. VocalLabs Dashboard → Security\n\
                 3. Add your IP to whitelist"
            ),
            http_code,
        );
    }

    match err.kind {
        ErrorKind::Authorization => {
            let http_code = err.http_code.clone();
            NormalizedError::authentication(
                format!(
                    "Invalid credentials: {api_message}.\nFix:\n\
                     1. Edit your VocalLabs credentials\n\
                     2. Get a new Client ID and Secret from VocalLabs Dashboard → API\n\
                     3. Update the credentials and try again"
                ),
                http_code,
            )
        }
        ErrorKind::Network | ErrorKind::Server | ErrorKind::RateLimited => err.with_message(format!(
            "Failed to authenticate with VocalLabs: {api_message}"
        )),
        _ => {
            let http_code = err.http_code.clone();
            NormalizedError::authentication(
                format!(
                    "Failed to authenticate with VocalLabs: {api_message}. See {DOCUMENTATION_URL} for help."
                ),
                http_code,
            )
        }
    }
}
