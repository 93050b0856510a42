//! Agent actions (external HTTP tools), action templates and documents.

use serde_json::json;

use crate::description::{op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;

use super::{api_path, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getActions", "Get Actions", "Get actions", "List the actions in the library"),
    op("createAction", "Create Action", "Create an action", "Create an action from a cURL command"),
    op("updateAction", "Update Action", "Update an action", "Replace the definition of an action"),
    op("deleteAction", "Delete Action", "Delete an action", "Delete an action"),
    op("getDocuments", "Get Documents", "Get documents", "List uploaded documents"),
    op("deleteDocument", "Delete Document", "Delete a document", "Delete an uploaded document"),
    op(
        "getActionTemplates",
        "Get Action Templates",
        "Get action templates",
        "List prebuilt action templates",
    ),
    op(
        "getActionTemplateDetails",
        "Get Action Template Details",
        "Get action template details",
        "Retrieve a single action template",
    ),
    op(
        "getActionParameters",
        "Get Action Parameters",
        "Get action parameters",
        "List the parameters of an action",
    ),
    op("getActionFields", "Get Action Fields", "Get action fields", "List the fields of an action"),
    op(
        "getActionConfiguration",
        "Get Action Configuration",
        "Get action configuration",
        "Retrieve the configuration of an action",
    ),
];

const DEFINITION_OPERATIONS: &[&str] = &["createAction", "updateAction"];

pub fn fields() -> Vec<FieldDescription> {
    vec![
        FieldDescription::string("action_id", "Action ID", "Use \"Get Actions\" to find it")
            .required()
            .show_for(&[
                "updateAction",
                "deleteAction",
                "getActionParameters",
                "getActionFields",
                "getActionConfiguration",
            ]),
        FieldDescription::string("action_name", "Action Name", "Unique name of the action")
            .required()
            .show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("description", "Description", "What the action does").show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("external_curl", "External cURL", "cURL command the agent runs")
            .required()
            .placeholder("curl -X GET https://api.example.com/orders")
            .show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("success_response", "Success Response", "What the agent says on success")
            .show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("failure_response", "Failure Response", "What the agent says on failure")
            .show_for(DEFINITION_OPERATIONS),
        FieldDescription::string(
            "interruption_response",
            "Interruption Response",
            "What the agent says when interrupted",
        )
        .show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("ref_code", "Reference Code", "Optional reference code").show_for(DEFINITION_OPERATIONS),
        FieldDescription::string("document_id", "Document ID", "Use \"Get Documents\" to find it")
            .required()
            .show_for(&["deleteDocument"]),
        FieldDescription::string(
            "template_action_id",
            "Template Action ID",
            "Use \"Get Action Templates\" to find it",
        )
        .required()
        .show_for(&["getActionTemplateDetails"]),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getActions" => Ok(listing("getActions", "get actions")),
        "getDocuments" => Ok(listing("getDocuments", "get documents")),
        "getActionTemplates" => Ok(listing("getActionTemplates", "get action templates")),
        "createAction" => {
            let body = definition(params)?;
            let name = params.str("action_name");
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("createAction")).json(body),
                FailureContext::new("create action")
                    .conflict(format!("Action name \"{name}\" already exists. Use a unique name.")),
            ))
        }
        "updateAction" => {
            let action_id = action_id(params, "updateAction")?;
            let mut body = definition(params)?;
            body["id"] = json!(action_id);
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateAction")).json(body),
                FailureContext::new("update action").not_found(format!(
                    "Action ID \"{action_id}\" not found. Check ID or get a list using \"Get Actions.\""
                )),
            ))
        }
        "deleteAction" => {
            let action_id = action_id(params, "deleteAction")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteAction")).json(json!({ "id": action_id })),
                FailureContext::new("delete action").not_found(action_not_found(&action_id)),
            ))
        }
        "deleteDocument" => {
            let document_id = required_str(params, "document_id", "Document ID required.")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteDocument")).json(json!({ "id": document_id })),
                FailureContext::new("delete document")
                    .not_found(format!("Document ID \"{document_id}\" not found.")),
            ))
        }
        "getActionTemplateDetails" => {
            let template_id = required_str(params, "template_action_id", "Template Action ID required.")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getActionTemplateDetails"))
                    .query("template_action_id", &template_id),
                FailureContext::new("get action template details")
                    .not_found(format!("Template Action ID \"{template_id}\" not found.")),
            ))
        }
        "getActionParameters" => by_action(params, "getActionParameters", "get action parameters"),
        "getActionFields" => by_action(params, "getActionFields", "get action fields"),
        "getActionConfiguration" => by_action(params, "getActionConfiguration", "get action configuration"),
        other => Err(unknown_operation(Resource::Library, other)),
    }
}

fn listing(endpoint: &str, label: &str) -> Prepared {
    Prepared::request(RequestDescriptor::get(api_path(endpoint)), FailureContext::new(label))
}

fn action_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "action_id",
        format!("Action ID required for \"{operation}\". Get one using \"Get Actions\"."),
    )
}

fn action_not_found(action_id: &str) -> String {
    format!("Action ID \"{action_id}\" not found.")
}

/// Body shared by create and update. Optional texts are sent as empty strings.
fn definition(params: &Params) -> Result<serde_json::Value, NormalizedError> {
    let action_name = required_str(params, "action_name", "Action name required.")?;
    let external_curl = required_str(params, "external_curl", "External CURL command required.")?;
    Ok(json!({
        "action_name": action_name,
        "description": params.str("description"),
        "external_curl": external_curl,
        "success_response": params.str("success_response"),
        "failure_response": params.str("failure_response"),
        "interruption_response": params.str("interruption_response"),
        "ref_code": params.str("ref_code"),
    }))
}

fn by_action(params: &Params, endpoint: &str, label: &str) -> Result<Prepared, NormalizedError> {
    let action_id = action_id(params, endpoint)?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(endpoint)).query("action_id", &action_id),
        FailureContext::new(label).not_found(action_not_found(&action_id)),
    ))
}
