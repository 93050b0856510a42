//! Outbound calling campaigns.

use serde_json::json;

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate::{self, MAX_NAME_LEN};

use super::{api_path, page, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getCampaigns", "Get Campaigns", "Get campaigns", "List campaigns"),
    op("createCampaign", "Create Campaign", "Create a campaign", "Create a campaign for an agent"),
    op("updateCampaign", "Update Campaign", "Update a campaign", "Rename a campaign"),
    op("deleteCampaign", "Delete Campaign", "Delete a campaign", "Delete a campaign"),
    op(
        "getQueueingDetails",
        "Get Queueing Details",
        "Get queueing details",
        "List the queued calls of a campaign",
    ),
    op("getCampaignStatus", "Get Campaign Status", "Get campaign status", "Retrieve the status of a campaign"),
    op(
        "updateCampaignStatus",
        "Update Campaign Status",
        "Update campaign status",
        "Activate or pause a campaign",
    ),
    op(
        "addContactsToCampaign",
        "Add Contacts to Campaign",
        "Add contacts to a campaign",
        "Enqueue a contact group into a campaign",
    ),
];

const CAMPAIGN_ID_OPERATIONS: &[&str] = &[
    "updateCampaign",
    "deleteCampaign",
    "getQueueingDetails",
    "getCampaignStatus",
    "updateCampaignStatus",
    "addContactsToCampaign",
];

pub fn fields() -> Vec<FieldDescription> {
    vec![
        FieldDescription::string("name", "Campaign Name", "Name of the campaign (max 100 characters)")
            .required()
            .show_for(&["createCampaign"]),
        FieldDescription::string("agent_id", "Agent ID", "Agent that places the calls")
            .required()
            .show_for(&["createCampaign"]),
        FieldDescription::string("campaign_id", "Campaign ID", "Use \"Get Campaigns\" to find it")
            .required()
            .show_for(CAMPAIGN_ID_OPERATIONS),
        FieldDescription::string("campaign_name", "New Campaign Name", "New name (max 100 characters)")
            .required()
            .show_for(&["updateCampaign"]),
        limit_field(&["getQueueingDetails"]),
        offset_field(&["getQueueingDetails"]),
        FieldDescription::boolean("active", "Active", "Whether the campaign is running", true)
            .show_for(&["updateCampaignStatus"]),
        FieldDescription::string("user_id", "User ID", "Your user ID")
            .required()
            .hint("Get it from Auth > Get Auth Info")
            .show_for(&["addContactsToCampaign"]),
        FieldDescription::string("prospect_group_id", "Prospect Group ID", "Contact group to enqueue")
            .required()
            .show_for(&["addContactsToCampaign"]),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getCampaigns" => Ok(Prepared::request(
            RequestDescriptor::get(api_path("getCampaigns")),
            FailureContext::new("get campaigns"),
        )),
        "createCampaign" => {
            let name = required_str(params, "name", "Campaign name is required.")?;
            validate::max_len(&name, MAX_NAME_LEN, "Campaign name too long (max 100 chars).")?;
            let agent_id = required_str(
                params,
                "agent_id",
                "Agent ID required for Create Campaign. Use \"Get Agents\" to list all agents and copy a valid ID.",
            )?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("createCampaign"))
                    .json(json!({ "name": name, "agent_id": agent_id })),
                FailureContext::new("create campaign")
                    .not_found(format!("Agent ID \"{agent_id}\" does not exist. Use \"Get Agents\" to check."))
                    .conflict(format!("Campaign \"{name}\" already exists. Choose a different name.")),
            ))
        }
        "updateCampaign" => {
            let campaign_id = campaign_id(params, "Update Campaign")?;
            let new_name = required_str(params, "campaign_name", "New campaign name is required.")?;
            validate::max_len(&new_name, MAX_NAME_LEN, "Campaign name too long (max 100 chars).")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateCampaign"))
                    .json(json!({ "campaign_id": campaign_id, "campaign_name": new_name })),
                FailureContext::new("update campaign")
                    .not_found(campaign_not_found(&campaign_id))
                    .conflict(format!("Campaign \"{new_name}\" already exists. Choose a different name.")),
            ))
        }
        "deleteCampaign" => {
            let campaign_id = campaign_id(params, "Delete Campaign")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteCampaign")).json(json!({ "id": campaign_id })),
                FailureContext::new("delete campaign").not_found(campaign_not_found(&campaign_id)),
            ))
        }
        "getQueueingDetails" => {
            let campaign_id = campaign_id(params, "Get Queueing Details")?;
            let (limit, offset) = page(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getQueueingDetails"))
                    .query("limit", limit)
                    .query("offset", offset)
                    .query("campaign_id", &campaign_id),
                FailureContext::new("get queueing details").not_found(campaign_not_found(&campaign_id)),
            ))
        }
        "getCampaignStatus" => {
            let campaign_id = campaign_id(params, "Get Campaign Status")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getCampaignStatus")).query("campaign_id", &campaign_id),
                FailureContext::new("get campaign status").not_found(campaign_not_found(&campaign_id)),
            ))
        }
        "updateCampaignStatus" => {
            let campaign_id = campaign_id(params, "Update Campaign Status")?;
            let active = params.bool_or("active", true);
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateCampaignStatus"))
                    .json(json!({ "campaign_id": campaign_id, "active": active })),
                FailureContext::new("update campaign status").not_found(campaign_not_found(&campaign_id)),
            ))
        }
        "addContactsToCampaign" => {
            let user_id = required_str(params, "user_id", "User ID is required. Get it from Auth > Get Auth Info.")?;
            let campaign_id = campaign_id(params, "Add Contacts to Campaign")?;
            let group_id = required_str(
                params,
                "prospect_group_id",
                "Prospect group ID is required. Use \"Get Contact Groups\" or create a new one.",
            )?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("addContactsToCampaign")).json(json!({
                    "user_id": user_id,
                    "campaign_id": campaign_id,
                    "prospect_group_id": group_id,
                })),
                FailureContext::new("add contacts to campaign")
                    .not_found_when("campaign", campaign_not_found(&campaign_id))
                    .not_found_when(
                        "group",
                        format!("Prospect group ID \"{group_id}\" not found. Use \"Get Contact Groups\" to check."),
                    )
                    .not_found("Campaign or prospect group not found. Check your IDs."),
            ))
        }
        other => Err(unknown_operation(Resource::Campaign, other)),
    }
}

fn campaign_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "campaign_id",
        format!(
            "Campaign ID required for {operation}. Use \"Get Campaigns\" to list all campaigns and copy a valid ID."
        ),
    )
}

fn campaign_not_found(campaign_id: &str) -> String {
    format!("Campaign ID \"{campaign_id}\" not found. Use \"Get Campaigns\" to check.")
}
