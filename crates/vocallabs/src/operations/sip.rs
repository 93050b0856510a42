//! Raw SIP calls streamed over a WebSocket.

use serde_json::json;

use crate::description::{op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate::{self, ValidationError};

use super::{api_path, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const SAMPLE_RATES: [&str; 4] = ["8000", "16000", "24000", "48000"];
pub const DEFAULT_SAMPLE_RATE: &str = "16000";

pub const OPERATIONS: &[OperationDescription] =
    &[op("createSIPCall", "Create SIP Call", "Create a SIP call", "Initiate a new SIP call")];

pub fn fields() -> Vec<FieldDescription> {
    const SIP: &[&str] = &["createSIPCall"];
    vec![
        FieldDescription::string(
            "phone_number",
            "Phone Number",
            "Phone number to call in international format (e.g., +1234567890)",
        )
        .required()
        .placeholder("+1234567890")
        .show_for(SIP),
        FieldDescription::string("did", "DID", "Direct Inward Dialing number")
            .required()
            .show_for(SIP),
        FieldDescription::string(
            "websocket_url",
            "WebSocket URL",
            "WebSocket server URL (must start with ws:// or wss://)",
        )
        .required()
        .placeholder("wss://your-server.com/audio")
        .show_for(SIP),
        FieldDescription::string("webhook_url", "Webhook URL", "Webhook callback URL for call events")
            .required()
            .placeholder("https://your-server.com/webhook")
            .show_for(SIP),
        FieldDescription::options(
            "sample_rate",
            "Sample Rate",
            "Audio sample rate for the call",
            &[
                ("8000 Hz (Telephone Quality)", "8000"),
                ("16000 Hz (Wideband)", "16000"),
                ("24000 Hz (Super Wideband)", "24000"),
                ("48000 Hz (Full Band)", "48000"),
            ],
            DEFAULT_SAMPLE_RATE,
        )
        .show_for(SIP),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    if operation != "createSIPCall" {
        return Err(unknown_operation(Resource::Sip, operation));
    }

    let phone_number = required_str(params, "phone_number", "Phone number is required")?;
    let did = required_str(params, "did", "DID is required")?;
    let websocket_url = required_str(params, "websocket_url", "WebSocket URL is required")?;
    validate::websocket_url(&websocket_url, "WebSocket URL")?;
    let webhook_url = required_str(params, "webhook_url", "Webhook URL is required")?;
    validate::http_url(&webhook_url, "Webhook URL")?;

    let sample_rate = params
        .opt_str("sample_rate")
        .unwrap_or_else(|| DEFAULT_SAMPLE_RATE.to_string());
    if !SAMPLE_RATES.contains(&sample_rate.as_str()) {
        return Err(ValidationError::new(format!(
            "Unsupported sample rate {sample_rate}. Use one of: {}",
            SAMPLE_RATES.join(", ")
        ))
        .into());
    }

    Ok(Prepared::request(
        RequestDescriptor::post(api_path("createSIPCall")).json(json!({
            "phone_number": phone_number,
            "did": did,
            "websocket_url": websocket_url,
            "webhook_url": webhook_url,
            "sample_rate": sample_rate,
        })),
        FailureContext::new("create SIP call"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn base() -> Value {
        json!({
            "phone_number": "+15550001111",
            "did": "+15550002222",
            "websocket_url": "wss://media.example.com/audio",
            "webhook_url": "https://hooks.example.com/sip",
        })
    }

    #[test]
    fn sample_rate_defaults_to_wideband() {
        let prepared = prepare("createSIPCall", &Params::from_value(base())).unwrap();
        let body = prepared.descriptor().unwrap().body.clone().unwrap();
        assert_eq!(body["sample_rate"], "16000");
    }

    #[test]
    fn numeric_sample_rate_is_accepted() {
        let mut params = base();
        params["sample_rate"] = json!(8000);
        let prepared = prepare("createSIPCall", &Params::from_value(params)).unwrap();
        assert_eq!(prepared.descriptor().unwrap().body.as_ref().unwrap()["sample_rate"], "8000");
    }

    #[test]
    fn rejects_bad_rate_and_non_websocket_url() {
        let mut params = base();
        params["sample_rate"] = json!("44100");
        assert!(prepare("createSIPCall", &Params::from_value(params))
            .unwrap_err()
            .message
            .contains("Unsupported sample rate"));

        let mut params = base();
        params["websocket_url"] = json!("https://media.example.com/audio");
        assert!(prepare("createSIPCall", &Params::from_value(params))
            .unwrap_err()
            .message
            .contains("ws://"));

        let mut params = base();
        params["did"] = json!(" ");
        assert_eq!(
            prepare("createSIPCall", &Params::from_value(params)).unwrap_err().message,
            "DID is required"
        );
    }
}
