//! Resource/operation dispatch.
//!
//! Each resource module turns an operation name plus [`Params`] into a
//! [`Prepared`] call: the request to send, how to word a failure, and how to
//! shape the result. All input checks happen while preparing, so a rejected
//! call never touches the network.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::credentials::VocallabsCredentials;
use crate::description::{FieldDescription, OperationDescription, ResourceDescription};
use crate::error::{ErrorKind, NormalizedError};
use crate::gateway::Gateway;
use crate::params::Params;
use crate::request::RequestDescriptor;

pub mod agent;
pub mod analytics;
pub mod auth;
pub mod call;
pub mod campaign;
pub mod contacts;
pub mod dashboard;
pub mod identity;
pub mod library;
pub mod marketplace;
pub mod sip;
pub mod wallet;

// ---------------------------------------------------------------------------
// Resource selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Agent,
    Analytics,
    Auth,
    Call,
    Campaign,
    Contacts,
    Dashboard,
    Identity,
    Library,
    Marketplace,
    Sip,
    Wallet,
}

impl Resource {
    /// Selector order.
    pub const ALL: [Resource; 12] = [
        Resource::Agent,
        Resource::Analytics,
        Resource::Auth,
        Resource::Call,
        Resource::Campaign,
        Resource::Contacts,
        Resource::Dashboard,
        Resource::Identity,
        Resource::Library,
        Resource::Marketplace,
        Resource::Sip,
        Resource::Wallet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Agent => "agent",
            Resource::Analytics => "analytics",
            Resource::Auth => "auth",
            Resource::Call => "call",
            Resource::Campaign => "campaign",
            Resource::Contacts => "contacts",
            Resource::Dashboard => "dashboard",
            Resource::Identity => "identity",
            Resource::Library => "library",
            Resource::Marketplace => "marketplace",
            Resource::Sip => "sip",
            Resource::Wallet => "wallet",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Resource::Agent => "Agent",
            Resource::Analytics => "Analytics",
            Resource::Auth => "Auth",
            Resource::Call => "Call",
            Resource::Campaign => "Campaign",
            Resource::Contacts => "Contacts",
            Resource::Dashboard => "Dashboard",
            Resource::Identity => "Identity",
            Resource::Library => "Library",
            Resource::Marketplace => "Marketplace",
            Resource::Sip => "SIP",
            Resource::Wallet => "Wallet",
        }
    }

    pub fn operations(self) -> &'static [OperationDescription] {
        match self {
            Resource::Agent => agent::OPERATIONS,
            Resource::Analytics => analytics::OPERATIONS,
            Resource::Auth => auth::OPERATIONS,
            Resource::Call => call::OPERATIONS,
            Resource::Campaign => campaign::OPERATIONS,
            Resource::Contacts => contacts::OPERATIONS,
            Resource::Dashboard => dashboard::OPERATIONS,
            Resource::Identity => identity::OPERATIONS,
            Resource::Library => library::OPERATIONS,
            Resource::Marketplace => marketplace::OPERATIONS,
            Resource::Sip => sip::OPERATIONS,
            Resource::Wallet => wallet::OPERATIONS,
        }
    }

    pub fn default_operation(self) -> &'static str {
        match self {
            Resource::Contacts => contacts::DEFAULT_OPERATION,
            other => other.operations().first().map_or("", |op| op.value),
        }
    }

    fn fields(self) -> Vec<FieldDescription> {
        match self {
            Resource::Agent => agent::fields(),
            Resource::Analytics => analytics::fields(),
            Resource::Auth => Vec::new(),
            Resource::Call => call::fields(),
            Resource::Campaign => campaign::fields(),
            Resource::Contacts => contacts::fields(),
            Resource::Dashboard => Vec::new(),
            Resource::Identity => identity::fields(),
            Resource::Library => library::fields(),
            Resource::Marketplace => marketplace::fields(),
            Resource::Sip => sip::fields(),
            Resource::Wallet => wallet::fields(),
        }
    }

    pub fn describe(self) -> ResourceDescription {
        ResourceDescription {
            value: self.as_str(),
            name: self.display_name(),
            default: self.default_operation(),
            operations: self.operations().to_vec(),
            fields: self.fields(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = NormalizedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                let supported: Vec<&str> = Resource::ALL.iter().map(|r| r.as_str()).collect();
                NormalizedError::validation(format!(
                    "Unknown resource \"{s}\". Supported resources: {}",
                    supported.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Prepared calls
// ---------------------------------------------------------------------------

/// What a prepared operation does on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send through the gateway with the cached bearer token.
    Request(RequestDescriptor),
    /// Exchange the credentials directly, bypassing the token cache.
    ExchangeToken,
}

/// How a successful response is shaped before it is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum PostProcess {
    Passthrough,
    /// Bulk contact upload: summarize what was submitted alongside the reply.
    ContactsAdded { contacts: Vec<Value> },
}

/// Operation-specific wording for upstream failures.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureContext {
    /// Completes "Failed to ...".
    pub label: String,
    /// `(keyword, message)` pairs tried in order against a 404's message;
    /// an empty keyword always matches.
    pub not_found: Vec<(String, String)>,
    pub conflict: Option<String>,
}

impl FailureContext {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            not_found: Vec::new(),
            conflict: None,
        }
    }

    pub fn not_found(self, message: impl Into<String>) -> Self {
        self.not_found_when("", message)
    }

    pub fn not_found_when(mut self, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        self.not_found.push((keyword.into(), message.into()));
        self
    }

    pub fn conflict(mut self, message: impl Into<String>) -> Self {
        self.conflict = Some(message.into());
        self
    }

    /// Reword an upstream failure. Status code and kind are preserved.
    pub fn apply(&self, err: NormalizedError) -> NormalizedError {
        match err.kind {
            // Already phrased for the operator.
            ErrorKind::Authentication => err,
            ErrorKind::NotFound => {
                let lower = err.message.to_lowercase();
                let hint = self
                    .not_found
                    .iter()
                    .find(|(keyword, _)| keyword.is_empty() || lower.contains(keyword.as_str()))
                    .map(|(_, message)| message.clone());
                match hint {
                    Some(message) => err.with_message(message),
                    None => self.prefixed(err),
                }
            }
            ErrorKind::Conflict => match &self.conflict {
                Some(message) => {
                    let message = message.clone();
                    err.with_message(message)
                }
                None => self.prefixed(err),
            },
            ErrorKind::RateLimited => {
                let hint = match err.retry_after {
                    Some(wait) => format!(" Retry after {} seconds.", wait.as_secs().max(1)),
                    None => " Wait a moment before retrying.".to_string(),
                };
                let prefixed = self.prefixed(err);
                let message = format!("{}{hint}", prefixed.message);
                prefixed.with_message(message)
            }
            _ => self.prefixed(err),
        }
    }

    fn prefixed(&self, err: NormalizedError) -> NormalizedError {
        let message = format!("Failed to {}: {}", self.label, err.message);
        err.with_message(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub action: Action,
    pub failure: FailureContext,
    pub post: PostProcess,
}

impl Prepared {
    pub fn request(request: RequestDescriptor, failure: FailureContext) -> Self {
        Self {
            action: Action::Request(request),
            failure,
            post: PostProcess::Passthrough,
        }
    }

    pub fn with_post(mut self, post: PostProcess) -> Self {
        self.post = post;
        self
    }

    /// The outbound request, when the action sends one.
    pub fn descriptor(&self) -> Option<&RequestDescriptor> {
        match &self.action {
            Action::Request(request) => Some(request),
            Action::ExchangeToken => None,
        }
    }

    /// Execute against the API and shape the result.
    #[instrument(skip_all, fields(operation = %self.failure.label))]
    pub async fn run(
        self,
        gateway: &Gateway,
        credentials: &VocallabsCredentials,
    ) -> Result<Value, NormalizedError> {
        let Prepared { action, failure, post } = self;

        match action {
            Action::Request(request) => {
                let response = gateway
                    .send(credentials, &request)
                    .await
                    .map_err(|e| failure.apply(e))?;
                Ok(shape(post, response))
            }
            Action::ExchangeToken => {
                let grant = gateway
                    .exchange(credentials)
                    .await
                    .map_err(|e| failure.apply(e))?;
                debug!(user_id = ?grant.user_id, "auth info retrieved");
                Ok(json!({
                    "success": true,
                    "auth_token": grant.token,
                    "user_id": grant.user_id.unwrap_or_else(|| "Not provided".to_string()),
                    "token_expires_in": "24 hours",
                    "message": "Use the user_id in other operations that require User ID",
                    "full_response": grant.raw,
                }))
            }
        }
    }
}

fn shape(post: PostProcess, response: Value) -> Value {
    match post {
        PostProcess::Passthrough => response,
        PostProcess::ContactsAdded { contacts } => json!({
            "success": true,
            "contacts_added": contacts.len(),
            "contacts": contacts,
            "api_response": response,
        }),
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate `params` for `resource`/`operation` and build the call.
///
/// # Errors
/// [`ErrorKind::Validation`] for unknown operations and for every local
/// input check that fails.
pub fn prepare(resource: Resource, operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    debug!(%resource, operation, "preparing operation");
    match resource {
        Resource::Agent => agent::prepare(operation, params),
        Resource::Analytics => analytics::prepare(operation, params),
        Resource::Auth => auth::prepare(operation, params),
        Resource::Call => call::prepare(operation, params),
        Resource::Campaign => campaign::prepare(operation, params),
        Resource::Contacts => contacts::prepare(operation, params),
        Resource::Dashboard => dashboard::prepare(operation, params),
        Resource::Identity => identity::prepare(operation, params),
        Resource::Library => library::prepare(operation, params),
        Resource::Marketplace => marketplace::prepare(operation, params),
        Resource::Sip => sip::prepare(operation, params),
        Resource::Wallet => wallet::prepare(operation, params),
    }
}

pub(crate) fn unknown_operation(resource: Resource, operation: &str) -> NormalizedError {
    let supported: Vec<&str> = resource.operations().iter().map(|op| op.value).collect();
    NormalizedError::validation(format!(
        "Unknown operation \"{operation}\" for resource \"{resource}\". Supported operations: {}",
        supported.join(", ")
    ))
}

/// Path of an endpoint under the VocalLabs B2B prefix.
pub(crate) fn api_path(endpoint: &str) -> String {
    format!("/b2b/vocallabs/{endpoint}")
}

/// A non-blank string parameter.
pub(crate) fn required_str(params: &Params, name: &str, message: impl Into<String>) -> Result<String, NormalizedError> {
    let value = params.str(name);
    crate::validate::required(&value, message)?;
    Ok(value)
}

/// Validated `limit`/`offset` pair, defaulting to 10/0.
pub(crate) fn page(params: &Params) -> Result<(i64, i64), NormalizedError> {
    let limit = params.i64_or("limit", 10)?;
    let offset = params.i64_or("offset", 0)?;
    crate::validate::pagination(limit, offset)?;
    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn resource_names_round_trip_through_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>(), Ok(resource));
        }
        let err = "billing".parse::<Resource>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("agent, analytics, auth"));
    }

    #[test]
    fn every_described_operation_is_dispatchable() {
        let empty = Params::default();
        for resource in Resource::ALL {
            for op in resource.operations() {
                if let Err(err) = prepare(resource, op.value, &empty) {
                    assert!(
                        !err.message.starts_with("Unknown operation"),
                        "{resource}/{} is described but not dispatchable",
                        op.value
                    );
                }
            }
        }
    }

    #[test]
    fn unknown_operation_lists_supported_ones() {
        let err = prepare(Resource::Wallet, "refund", &Params::default()).unwrap_err();
        assert_eq!(err.http_code, "400");
        assert!(err.message.contains("getBalance, getTransactionHistory"));
    }

    #[test]
    fn failure_context_rewords_by_kind() {
        let ctx = FailureContext::new("get campaign status")
            .not_found("Campaign ID \"c-1\" not found. Use \"Get Campaigns\" to check.")
            .conflict("Campaign already exists.");

        let not_found = ctx.apply(NormalizedError::new(ErrorKind::NotFound, "nope", "404"));
        assert!(not_found.message.starts_with("Campaign ID \"c-1\" not found"));
        assert_eq!(not_found.http_code, "404");

        let server = ctx.apply(NormalizedError::new(ErrorKind::Server, "boom", "500"));
        assert_eq!(server.message, "Failed to get campaign status: boom");
        assert_eq!(server.kind, ErrorKind::Server);

        let conflict = ctx.apply(NormalizedError::new(ErrorKind::Conflict, "dup", "500"));
        assert_eq!(conflict.message, "Campaign already exists.");

        let mut limited = NormalizedError::new(ErrorKind::RateLimited, "slow down", "429");
        limited.retry_after = Some(Duration::from_secs(7));
        assert_eq!(
            ctx.apply(limited).message,
            "Failed to get campaign status: slow down Retry after 7 seconds."
        );
    }

    #[test]
    fn not_found_keywords_pick_the_matching_entity() {
        let ctx = FailureContext::new("add contacts to campaign")
            .not_found_when("campaign", "campaign missing")
            .not_found_when("group", "group missing")
            .not_found("something missing");

        let apply = |msg: &str| ctx.apply(NormalizedError::new(ErrorKind::NotFound, msg, "404")).message;
        assert_eq!(apply("Campaign does not exist"), "campaign missing");
        assert_eq!(apply("prospect group unknown"), "group missing");
        assert_eq!(apply("no such thing"), "something missing");
    }

    #[test]
    fn contacts_summary_wraps_the_response() {
        let shaped = shape(
            PostProcess::ContactsAdded {
                contacts: vec![json!({ "name": "A", "phone": "+1", "group_id": "g" })],
            },
            json!({ "ok": true }),
        );
        assert_eq!(shaped["contacts_added"], 1);
        assert_eq!(shaped["api_response"], json!({ "ok": true }));
        assert_eq!(shaped["contacts"][0]["group_id"], "g");
    }
}
