//! VocalLabs API credentials.
//!
//! The operator stores a client id/secret pair in the host's credential
//! store; the host hands it to the node as workflow-scoped secrets.

use std::fmt;

use nodes::ExecutionContext;

use crate::description::{CredentialDescription, FieldDescription};
use crate::error::NormalizedError;

/// Credential type name the node declares.
pub const CREDENTIAL_NAME: &str = "vocallabsApi";

pub const DOCUMENTATION_URL: &str = "https://docs.vocallabs.ai/vocallabs";

const CLIENT_ID_KEYS: [&str; 2] = ["clientId", "client_id"];
const CLIENT_SECRET_KEYS: [&str; 2] = ["clientSecret", "client_secret"];

#[derive(Clone, PartialEq, Eq)]
pub struct VocallabsCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl VocallabsCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read the pair from the execution context's secrets.
    pub fn from_context(ctx: &ExecutionContext) -> Result<Self, NormalizedError> {
        let client_id = non_blank(ctx.secret(&CLIENT_ID_KEYS)).ok_or_else(|| {
            missing("Client ID", "VocalLabs Dashboard > Settings > API Credentials")
        })?;
        let client_secret = non_blank(ctx.secret(&CLIENT_SECRET_KEYS)).ok_or_else(|| {
            missing("Client Secret", "VocalLabs Dashboard > Settings > API Credentials")
        })?;
        Ok(Self::new(client_id, client_secret))
    }

    /// Key under which this credential's token is cached.
    pub fn identity(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for VocallabsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocallabsCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing(field: &str, location: &str) -> NormalizedError {
    NormalizedError::authentication(
        format!("VocalLabs credentials are incomplete: {field} is missing. Get it from {location}."),
        "401",
    )
}

/// Credential form shown by the host.
pub fn describe() -> CredentialDescription {
    CredentialDescription {
        name: CREDENTIAL_NAME,
        display_name: "VocalLabs API",
        documentation_url: DOCUMENTATION_URL,
        properties: vec![
            FieldDescription::string(
                "clientId",
                "Client ID",
                "Your VocalLabs Client ID. Get it from VocalLabs Dashboard > Settings > API Credentials",
            )
            .required()
            .placeholder("your-client-id-here"),
            FieldDescription::string(
                "clientSecret",
                "Client Secret",
                "Your VocalLabs Client Secret. Keep this secure and never share it publicly",
            )
            .required()
            .placeholder("your-client-secret-here")
            .password(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn reads_camel_case_secrets() {
        let ctx = ExecutionContext::standalone("vocallabs", json!({}))
            .with_secret("clientId", "id-1")
            .with_secret("clientSecret", "s3cret");
        let creds = VocallabsCredentials::from_context(&ctx).unwrap();
        assert_eq!(creds, VocallabsCredentials::new("id-1", "s3cret"));
        assert_eq!(creds.identity(), "id-1");
    }

    #[test]
    fn blank_secret_is_an_authentication_error() {
        let ctx = ExecutionContext::standalone("vocallabs", json!({}))
            .with_secret("client_id", "id-1")
            .with_secret("client_secret", "   ");
        let err = VocallabsCredentials::from_context(&ctx).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(err.message.contains("Client Secret"));
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let creds = VocallabsCredentials::new("id-1", "super-secret-value");
        let printed = format!("{creds:?}");
        assert!(printed.contains("id-1"));
        assert!(!printed.contains("super-secret-value"));
    }

    #[test]
    fn descriptor_marks_secret_as_password() {
        let desc = describe();
        assert_eq!(desc.name, "vocallabsApi");
        let secret = desc.properties.iter().find(|p| p.name == "clientSecret").unwrap();
        assert!(secret.password && secret.required);
    }
}
