//! Outbound calls, call audits and recordings.

use serde_json::json;

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate::{self, ValidationError};

use super::{api_path, page, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("initiateCall", "Initiate Call", "Initiate a call", "Call a prospect with an AI agent"),
    op(
        "createDirectCall",
        "Create Direct Call",
        "Create a direct call",
        "Call a phone number using a client token",
    ),
    op("getCallDetails", "Get Call Details", "Get call details", "Retrieve the details of a call"),
    op("getVoices", "Get Voices", "Get voices", "List available voices"),
    op("getCallAPITokens", "Get Call API Tokens", "Get call API tokens", "List tokens for the call API"),
    op("callAPI", "Call API", "Initiate a call via webhook", "Start a call from a DID to a number"),
    op(
        "getCallTimeline",
        "Get Call Timeline",
        "Get call timeline",
        "List calls made to a phone number",
    ),
    op("getDailyCalls", "Get Daily Calls", "Get daily calls", "List calls made since a date"),
    op(
        "getWebsocketUrl",
        "Get WebSocket URL",
        "Get a WebSocket URL",
        "Get a streaming URL for an agent and prospect",
    ),
    op("getAudit", "Get Audit", "Get a call audit", "Retrieve the audit of a call"),
    op("getAllAudits", "Get All Audits", "Get all audits", "List all call audits"),
    op("uploadAudio", "Upload Audio", "Upload audio for audit", "Submit recordings for auditing"),
];

pub fn fields() -> Vec<FieldDescription> {
    vec![
        FieldDescription::string("agentId", "Agent ID", "ID of the agent. Use \"Get Agents\" to find it")
            .required()
            .show_for(&["initiateCall", "getWebsocketUrl", "uploadAudio"]),
        FieldDescription::string("prospect_id", "Prospect ID", "ID of the contact. Use \"Get Contacts\" to find it")
            .required()
            .show_for(&["initiateCall", "getWebsocketUrl"]),
        FieldDescription::string(
            "client_token_id",
            "Client Token ID",
            "Client token. Use Dashboard > Get Tokens to retrieve one",
        )
        .required()
        .show_for(&["createDirectCall"]),
        FieldDescription::string("number", "Phone Number", "Number to call, with + and country code")
            .required()
            .placeholder("+919876543210")
            .show_for(&["createDirectCall", "callAPI"]),
        FieldDescription::string("from", "From (DID)", "Calling number, with + and country code")
            .required()
            .placeholder("+14155550100")
            .show_for(&["callAPI"]),
        FieldDescription::string("callId", "Call ID", "ID of the call")
            .required()
            .show_for(&["getCallDetails", "getAudit"]),
        FieldDescription::string("phone_to", "Phone To", "Number whose call history to list")
            .required()
            .placeholder("+919876543210")
            .show_for(&["getCallTimeline"]),
        limit_field(&["getCallTimeline"]),
        offset_field(&["getCallTimeline"]),
        FieldDescription::string("start_date", "Start Date", "First day to include (YYYY-MM-DD)")
            .required()
            .placeholder("2025-11-08")
            .show_for(&["getDailyCalls"]),
        FieldDescription::string_list("recording_url", "Recording URLs", "HTTP(S) URLs of the recordings")
            .required()
            .show_for(&["uploadAudio"]),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "initiateCall" => {
            let agent_id = agent_id(params, "Initiate Call")?;
            let prospect_id = prospect_id(params, "Initiate Call")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("initiateVocallabsCall"))
                    .json(json!({ "agentId": agent_id, "prospect_id": prospect_id })),
                FailureContext::new("initiate call").not_found(
                    "Agent or Prospect not found. Verify Agent ID and Prospect ID exist (\"Get Agents\", \"Get Contacts\").",
                ),
            ))
        }
        "createDirectCall" => {
            let token_id = required_str(
                params,
                "client_token_id",
                "Client Token ID required. Use Dashboard > Get Tokens operation to retrieve one.",
            )?;
            let number = params.str("number");
            validate::phone_number(&number, "Phone Number")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("createDirectCall"))
                    .json(json!({ "client_token_id": token_id, "number": number })),
                FailureContext::new("create direct call")
                    .not_found(format!("Client Token \"{token_id}\" not found. Use Dashboard > Get Tokens.")),
            ))
        }
        "getCallDetails" => {
            let call_id = call_id(params, "Get Call Details")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getVocallabsCall")).query("callId", &call_id),
                FailureContext::new("get call details")
                    .not_found(format!("Call ID \"{call_id}\" does not exist.")),
            ))
        }
        "getVoices" => Ok(listing("getVoices", "get voices")),
        "getCallAPITokens" => Ok(listing("getCallAPITokens", "get call API tokens")),
        "getAllAudits" => Ok(listing("getAllAudits", "get all audits")),
        "callAPI" => {
            let from = params.str("from");
            validate::phone_number(&from, "From (DID)")?;
            let number = params.str("number");
            validate::phone_number(&number, "Phone Number")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("initiateCallWebhook"))
                    .json(json!({ "from": from, "number": number })),
                FailureContext::new("initiate call via webhook"),
            ))
        }
        "getCallTimeline" => {
            let phone_to = params.str("phone_to");
            validate::phone_number(&phone_to, "Phone To")?;
            let (limit, offset) = page(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getCallTimeline"))
                    .query("phone_to", &phone_to)
                    .query("limit", limit)
                    .query("offset", offset),
                FailureContext::new("get call timeline"),
            ))
        }
        "getDailyCalls" => {
            let start_date = params.str("start_date");
            validate::iso_date(&start_date, "Start date")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getDailyCalls")).query("start_date", &start_date),
                FailureContext::new("get daily calls"),
            ))
        }
        "getWebsocketUrl" => {
            let agent_id = agent_id(params, "Get WebSocket URL")?;
            let prospect_id = prospect_id(params, "Get WebSocket URL")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getWebsocketUrl"))
                    .query("agent_id", &agent_id)
                    .query("prospect_id", &prospect_id),
                FailureContext::new("get WebSocket URL")
                    .not_found("Either agent or prospect does not exist. Double-check Agent ID/Prospect ID."),
            ))
        }
        "getAudit" => {
            let call_id = call_id(params, "Get Audit")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getOneAudit")).query("call_id", &call_id),
                FailureContext::new("get call audit")
                    .not_found(format!("No audit data found for Call ID \"{call_id}\".")),
            ))
        }
        "uploadAudio" => {
            let agent_id = agent_id(params, "Upload Audio")?;
            let urls = params.string_list("recording_url")?;
            if urls.is_empty() {
                return Err(ValidationError::new("Provide at least one audio file URL to upload.").into());
            }
            for (index, url) in urls.iter().enumerate() {
                validate::http_url(url, &format!("URL at index {index}"))?;
            }
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("uploadAudits"))
                    .json(json!({ "agent_id": agent_id, "recording_url": urls })),
                FailureContext::new("upload audio")
                    .not_found(format!("Agent ID \"{agent_id}\" does not exist.")),
            ))
        }
        other => Err(unknown_operation(Resource::Call, other)),
    }
}

fn listing(endpoint: &str, label: &str) -> Prepared {
    Prepared::request(RequestDescriptor::get(api_path(endpoint)), FailureContext::new(label))
}

fn agent_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "agentId",
        format!("Agent ID required for {operation}. Use \"Get Agents\" to locate valid agent IDs."),
    )
}

fn prospect_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "prospect_id",
        format!("Prospect ID required for {operation}. Use \"Get Contacts\" to locate valid prospect IDs."),
    )
}

fn call_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "callId",
        format!(
            "Call ID required for {operation}. Use \"Initiate Call\" or \"Get Daily Calls\" to get valid Call IDs."
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::Value;

    fn prepared(operation: &str, params: Value) -> Result<Prepared, NormalizedError> {
        prepare(operation, &Params::from_value(params))
    }

    #[test]
    fn phone_numbers_need_international_format() {
        let err = prepared("createDirectCall", json!({ "client_token_id": "t", "number": "9876543210" }))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("+<country code>"));

        let err = prepared("callAPI", json!({ "from": "+14155550100", "number": "" })).unwrap_err();
        assert!(err.message.starts_with("Phone Number required"));
    }

    #[test]
    fn timeline_checks_phone_then_page() {
        let err = prepared("getCallTimeline", json!({ "phone_to": "+1555", "limit": 101 })).unwrap_err();
        assert!(err.message.contains("Limit must be between 1 and 100"));

        let prepared = prepared("getCallTimeline", json!({ "phone_to": "+1555" })).unwrap();
        let req = prepared.descriptor().unwrap();
        assert_eq!(req.query_value("phone_to"), Some("+1555"));
        assert_eq!(req.query_value("limit"), Some("10"));
    }

    #[test]
    fn daily_calls_need_iso_date() {
        let err = prepared("getDailyCalls", json!({ "start_date": "11/08/2025" })).unwrap_err();
        assert!(err.message.contains("YYYY-MM-DD"));
        assert!(prepared("getDailyCalls", json!({ "start_date": "2025-11-08" })).is_ok());
    }

    #[test]
    fn websocket_url_renames_agent_id() {
        let prepared =
            prepared("getWebsocketUrl", json!({ "agentId": "a-1", "prospect_id": "p-1" })).unwrap();
        let req = prepared.descriptor().unwrap();
        assert_eq!(req.query_value("agent_id"), Some("a-1"));
        assert_eq!(req.query_value("prospect_id"), Some("p-1"));
    }

    #[test]
    fn audit_maps_call_id_key() {
        let prepared = prepared("getAudit", json!({ "callId": "c-7" })).unwrap();
        let req = prepared.descriptor().unwrap();
        assert_eq!(req.path, "/b2b/vocallabs/getOneAudit");
        assert_eq!(req.query_value("call_id"), Some("c-7"));
    }

    #[test]
    fn upload_audio_validates_every_url() {
        let err = prepared(
            "uploadAudio",
            json!({ "agentId": "a-1", "recording_url": ["https://x.io/a.mp3", "nope"] }),
        )
        .unwrap_err();
        assert!(err.message.contains("URL at index 1"));

        let err = prepared("uploadAudio", json!({ "agentId": "a-1", "recording_url": [] })).unwrap_err();
        assert_eq!(err.message, "Provide at least one audio file URL to upload.");
    }
}
