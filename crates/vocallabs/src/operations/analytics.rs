//! Call analytics: statuses, transcripts, summaries and post-call extraction.

use serde_json::json;

use crate::credentials::DOCUMENTATION_URL;
use crate::description::{op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;

use super::{api_path, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getCallStatuses", "Get Call Statuses", "Get call statuses", "List the possible call statuses"),
    op(
        "getCallConversation",
        "Get Call Conversation",
        "Get call conversation",
        "Retrieve the transcript of a call",
    ),
    op("getCallData", "Get Call Data", "Get call data", "Retrieve the data captured during a call"),
    op("getCallStatus", "Get Call Status", "Get call status", "Retrieve the status of a call"),
    op("getCallSummary", "Get Call Summary", "Get call summary", "Retrieve the AI summary of a call"),
    op(
        "getPostCallData",
        "Get Post Call Data",
        "Get post call data",
        "List the post-call extraction prompts of an agent",
    ),
    op(
        "updatePostCallData",
        "Update Post Call Data",
        "Update post call data",
        "Set a post-call extraction prompt",
    ),
    op(
        "deletePostCallData",
        "Delete Post Call Data",
        "Delete post call data",
        "Remove post-call data from a call",
    ),
    op(
        "getVocallabsCall",
        "Get VocalLabs Call Data",
        "Get VocalLabs call data",
        "Retrieve the full record of a call",
    ),
];

const CALL_ID_OPERATIONS: &[&str] = &[
    "getCallConversation",
    "getCallData",
    "getCallStatus",
    "getCallSummary",
    "updatePostCallData",
    "deletePostCallData",
    "getVocallabsCall",
];

pub fn fields() -> Vec<FieldDescription> {
    vec![
        FieldDescription::string("call_id", "Call ID", "ID of the call")
            .required()
            .placeholder("call_abc123xyz")
            .show_for(CALL_ID_OPERATIONS),
        FieldDescription::string("agent_id", "Agent ID", "ID of the agent")
            .required()
            .show_for(&["getPostCallData"]),
        FieldDescription::string("key", "Key", "Name of the value to extract after the call")
            .required()
            .show_for(&["updatePostCallData"]),
        FieldDescription::string("prompt", "Prompt", "Extraction prompt")
            .required()
            .show_for(&["updatePostCallData"]),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getCallStatuses" => Ok(Prepared::request(
            RequestDescriptor::get(api_path("getCallStatuses")),
            FailureContext::new("get call statuses"),
        )),
        "getCallConversation" => by_call(
            params,
            "getCallConversation",
            "Get Call Conversation",
            "get call conversation",
            |id| format!("Call not found. Call ID \"{id}\" does not exist or has no conversation data."),
        ),
        "getCallData" => by_call(params, "getCallData", "Get Call Data", "get call data", call_not_found),
        "getCallStatus" => by_call(params, "getCallStatus", "Get Call Status", "get call status", call_not_found),
        "getCallSummary" => by_call(
            params,
            "getCallSummary",
            "Get Call Summary",
            "get call summary",
            |id| {
                format!(
                    "Call summary not available. Call ID \"{id}\" does not exist or summary not generated."
                )
            },
        ),
        "getPostCallData" => {
            let agent_id = required_str(
                params,
                "agent_id",
                format!(
                    "Agent ID Required. Missing for operation 'Get Post Call Data'. \
                     How to get: Use \"Get Agents\" operation. See docs: {DOCUMENTATION_URL}"
                ),
            )?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getPostCallData")).query("agent_id", &agent_id),
                FailureContext::new("get post call data")
                    .not_found(format!("Agent not found. Agent ID \"{agent_id}\" does not exist.")),
            ))
        }
        "updatePostCallData" => {
            let call_id = call_id(params, "Update Post Call Data")?;
            let key = required_str(params, "key", "Key required for post-call data. Cannot be empty.")?;
            let prompt = required_str(
                params,
                "prompt",
                "Prompt required for post-call extraction. Cannot be empty.",
            )?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updatePostCallData"))
                    .json(json!({ "call_id": call_id, "key": key, "prompt": prompt })),
                FailureContext::new("update post call data").not_found(format!(
                    "Call not found for post-call data. Call ID \"{call_id}\" does not exist."
                )),
            ))
        }
        "deletePostCallData" => {
            let call_id = call_id(params, "Delete Post Call Data")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("deletePostCallData")).json(json!({ "call_id": call_id })),
                FailureContext::new("delete post call data")
                    .not_found(format!("No post call data found to delete for \"{call_id}\".")),
            ))
        }
        "getVocallabsCall" => {
            let call_id = call_id(params, "Get VocalLabs Call Data")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getVocallabsCall")).query("callId", &call_id),
                FailureContext::new("get VocalLabs call data").not_found(call_not_found(&call_id)),
            ))
        }
        other => Err(unknown_operation(Resource::Analytics, other)),
    }
}

fn call_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "call_id",
        format!(
            "Call ID Required. Missing for operation '{operation}'. \
             How to get: Use \"Initiate Call\" or \"Get Daily Calls\". \
             Format: call_abc123xyz. See docs: {DOCUMENTATION_URL}"
        ),
    )
}

fn call_not_found(call_id: &str) -> String {
    format!("Call not found. Call ID \"{call_id}\" does not exist.")
}

/// GET `endpoint?call_id=...`.
fn by_call(
    params: &Params,
    endpoint: &str,
    operation: &str,
    label: &str,
    not_found: impl Fn(&str) -> String,
) -> Result<Prepared, NormalizedError> {
    let call_id = call_id(params, operation)?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(endpoint)).query("call_id", &call_id),
        FailureContext::new(label).not_found(not_found(&call_id)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn prepared(operation: &str, params: Value) -> Result<Prepared, NormalizedError> {
        prepare(operation, &Params::from_value(params))
    }

    #[test]
    fn call_id_message_explains_where_to_find_it() {
        let err = prepared("getCallSummary", json!({})).unwrap_err();
        assert!(err.message.contains("Missing for operation 'Get Call Summary'"));
        assert!(err.message.contains("Get Daily Calls"));
    }

    #[test]
    fn vocallabs_call_uses_camel_case_query_key() {
        let prepared = prepared("getVocallabsCall", json!({ "call_id": "c-1" })).unwrap();
        let req = prepared.descriptor().unwrap();
        assert_eq!(req.query_value("callId"), Some("c-1"));
        assert_eq!(req.query_value("call_id"), None);
    }

    #[test]
    fn post_call_update_requires_key_and_prompt() {
        let err = prepared("updatePostCallData", json!({ "call_id": "c-1", "key": "budget" })).unwrap_err();
        assert!(err.message.starts_with("Prompt required"));

        let prepared = prepared(
            "updatePostCallData",
            json!({ "call_id": "c-1", "key": "budget", "prompt": "What budget was mentioned?" }),
        )
        .unwrap();
        assert_eq!(prepared.descriptor().unwrap().body.as_ref().unwrap()["key"], "budget");
    }
}
