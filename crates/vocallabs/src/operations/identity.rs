//! Identity verification flows.

use serde_json::{json, Value};

use crate::description::{op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate;

use super::{api_path, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getFlows", "Get Flows", "Get identity flows", "List the configured identity verification flows"),
    op(
        "getIdentityUrl",
        "Get Identity URL",
        "Get identity verification URL",
        "Create a verification link for a prospect",
    ),
];

pub fn fields() -> Vec<FieldDescription> {
    const URL: &[&str] = &["getIdentityUrl"];
    vec![
        FieldDescription::string("flow_id", "Flow ID", "Identity flow to run. Use \"Get Flows\" to list them")
            .required()
            .show_for(URL),
        FieldDescription::string("prospect_id", "Prospect ID", "Contact the verification is for")
            .required()
            .show_for(URL),
        FieldDescription::string("verification_type", "Verification Type", "Kind of verification to perform")
            .required()
            .show_for(URL),
        FieldDescription::string("created_at", "Created At", "Optional ISO 8601 UTC timestamp")
            .placeholder("2025-10-09T12:05:17.875Z")
            .show_for(URL),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getFlows" => Ok(Prepared::request(
            RequestDescriptor::get(api_path("getFlows")),
            FailureContext::new("get flows"),
        )),
        "getIdentityUrl" => {
            let flow_id = required_str(params, "flow_id", "Flow ID required. Use \"Get Flows\" to list available flows.")?;
            let prospect_id = required_str(
                params,
                "prospect_id",
                "Prospect ID required. Use \"Get Contacts\" to locate valid prospect IDs.",
            )?;
            let verification_type = required_str(params, "verification_type", "Verification type required.")?;

            let mut body = json!({
                "flow_id": flow_id,
                "prospect_id": prospect_id,
                "verification_type": verification_type,
            });
            if let Some(created_at) = params.opt_str("created_at") {
                validate::iso_datetime(&created_at, "created_at")?;
                body["created_at"] = Value::String(created_at);
            }

            Ok(Prepared::request(
                RequestDescriptor::post(api_path("getIdentityUrl")).json(body),
                FailureContext::new("get identity URL")
                    .not_found(format!("Flow \"{flow_id}\" or prospect \"{prospect_id}\" does not exist.")),
            ))
        }
        other => Err(unknown_operation(Resource::Identity, other)),
    }
}
