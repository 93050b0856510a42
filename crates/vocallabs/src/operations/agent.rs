//! AI voice agents: configuration, knowledge documents, keywords and FAQs.

use serde_json::{json, Map, Value};

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate::{self, ValidationError, MAX_NAME_LEN};

use super::{api_path, page, required_str, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getAgents", "Get Agents", "Get agents", "List AI agents"),
    op("getAgentById", "Get Agent By ID", "Get an agent", "Retrieve a single AI agent"),
    op("createAgent", "Create Agent", "Create an agent", "Create a new AI agent"),
    op("updateAgent", "Update Agent", "Update an agent", "Update fields of an AI agent"),
    op("getAgentTemplates", "Get Agent Templates", "Get agent templates", "List agent templates"),
    op(
        "getVoicesByLanguage",
        "Get Voices By Language",
        "Get voices by language",
        "List the voices available for a language",
    ),
    op("toggleFavorite", "Toggle Favorite", "Toggle agent favorite", "Mark or unmark an agent as favorite"),
    op(
        "updateAgentShared",
        "Update Agent Visibility",
        "Update agent visibility",
        "Share or unshare an agent",
    ),
    op(
        "agentPromptHistory",
        "Get Agent Prompt History",
        "Get agent prompt history",
        "Retrieve the prompt revision history of an agent",
    ),
    op(
        "updateSuccessMetric",
        "Update Success Metric",
        "Update agent success metric",
        "Set the metric used to judge a call successful",
    ),
    op(
        "updateWhatsappNotification",
        "Update WhatsApp Notification",
        "Update WhatsApp notification",
        "Enable or disable WhatsApp notifications for an agent",
    ),
    op(
        "updateMailNotification",
        "Update Mail Notification",
        "Update mail notification",
        "Enable or disable mail notifications for an agent",
    ),
    op(
        "getAgentDocuments",
        "Get Agent Documents",
        "Get agent documents",
        "List knowledge documents attached to an agent",
    ),
    op(
        "insertAgentDocument",
        "Insert Agent Document",
        "Insert agent document",
        "Attach a knowledge document to an agent",
    ),
    op("getAIModels", "Get AI Models", "Get AI models", "List the AI models agents can use"),
    op("getAgentActions", "Get Agent Actions", "Get agent actions", "List actions configured on an agent"),
    op(
        "updateAgentReschedule",
        "Update Agent Reschedule",
        "Update agent reschedule",
        "Enable or disable automatic call rescheduling",
    ),
    op(
        "getKeywordReplacements",
        "Get Keyword Replacements",
        "Get keyword replacements",
        "List keyword replacements of an agent",
    ),
    op("getAgentKeywords", "Get Agent Keywords", "Get agent keywords", "List keywords of an agent"),
    op("addKeyword", "Add Keyword", "Add keywords", "Add keyword replacements"),
    op("updateKeyword", "Update Keyword", "Update a keyword", "Update a keyword replacement"),
    op("deleteKeyword", "Delete Keyword", "Delete a keyword", "Delete a keyword replacement"),
    op("getTemplate", "Get Template", "Get a template", "Retrieve an agent template"),
    op("getAgentSamples", "Get Agent Samples", "Get agent samples", "Retrieve sample calls of a template"),
    op("getAgentFaq", "Get Agent FAQs", "Get agent FAQs", "List the FAQs of an agent"),
    op("manageAgentFaq", "Manage Agent FAQ", "Manage an agent FAQ", "Add, update or delete an agent FAQ"),
];

const AGENT_ID_OPERATIONS: &[&str] = &[
    "getAgentById",
    "updateAgent",
    "toggleFavorite",
    "updateAgentShared",
    "agentPromptHistory",
    "updateSuccessMetric",
    "updateWhatsappNotification",
    "updateMailNotification",
    "getAgentDocuments",
    "getAgentActions",
    "updateAgentReschedule",
    "getKeywordReplacements",
    "getAgentKeywords",
    "getAgentFaq",
    "manageAgentFaq",
];

const FAQ_OPERATIONS: [&str; 3] = ["add", "update", "delete"];

pub fn fields() -> Vec<FieldDescription> {
    vec![
        limit_field(&["getAgents"]),
        offset_field(&["getAgents"]),
        FieldDescription::string("agent_id", "Agent ID", "ID of the agent. Use \"Get Agents\" to find it")
            .required()
            .show_for(AGENT_ID_OPERATIONS),
        FieldDescription::string("name", "Agent Name", "Name of the new agent (max 100 characters)")
            .required()
            .show_for(&["createAgent"]),
        FieldDescription::json("updateData", "Update Data", "Fields to update, as a JSON object", "{}")
            .required()
            .show_for(&["updateAgent"]),
        FieldDescription::string("language", "Language", "Language to list voices for")
            .required()
            .placeholder("en")
            .show_for(&["getVoicesByLanguage"]),
        FieldDescription::boolean("favorite", "Favorite", "Whether the agent is a favorite", true)
            .show_for(&["toggleFavorite"]),
        FieldDescription::boolean("isShared", "Shared", "Whether the agent is shared", false)
            .show_for(&["updateAgentShared"]),
        FieldDescription::json("success_metric", "Success Metric", "Success metric definition (JSON)", "{}")
            .required()
            .show_for(&["updateSuccessMetric"]),
        FieldDescription::boolean("value", "Enabled", "Whether notifications are enabled", true)
            .show_for(&["updateWhatsappNotification", "updateMailNotification"]),
        FieldDescription::string("file_name", "File Name", "Name of the document")
            .required()
            .show_for(&["insertAgentDocument"]),
        FieldDescription::string("file_url", "File URL", "Public URL of the document")
            .required()
            .placeholder("https://example.com/handbook.pdf")
            .show_for(&["insertAgentDocument"]),
        FieldDescription::string("file_type", "File Type", "Document type, e.g. pdf")
            .required()
            .show_for(&["insertAgentDocument"]),
        FieldDescription::string("site_url", "Site URL", "Website to crawl alongside the document")
            .show_for(&["insertAgentDocument"]),
        FieldDescription::number("webcrawler_depth", "Crawler Depth", "How many links deep to crawl", 0)
            .show_for(&["insertAgentDocument"]),
        FieldDescription::string("crawl_status", "Crawl Status", "Initial crawl status")
            .show_for(&["insertAgentDocument"]),
        FieldDescription::boolean("reschedule", "Reschedule", "Whether missed calls are rescheduled", true)
            .show_for(&["updateAgentReschedule"]),
        FieldDescription::json(
            "objects",
            "Keywords",
            "Array of {agent_id, keyword, replacement} objects",
            "[]",
        )
        .required()
        .show_for(&["addKeyword"]),
        FieldDescription::string("keyword_id", "Keyword ID", "ID of the keyword replacement")
            .required()
            .show_for(&["updateKeyword", "deleteKeyword"]),
        FieldDescription::string("keyword", "Keyword", "Text to replace")
            .required()
            .show_for(&["updateKeyword"]),
        FieldDescription::string("replacement", "Replacement", "Replacement text")
            .required()
            .show_for(&["updateKeyword"]),
        FieldDescription::string("template_agent_id", "Template Agent ID", "ID of the agent template")
            .required()
            .show_for(&["getTemplate", "getAgentSamples"]),
        FieldDescription::string("ques_data", "Question", "FAQ question")
            .required()
            .show_for(&["manageAgentFaq"]),
        FieldDescription::string("ans_data", "Answer", "FAQ answer")
            .required()
            .show_for(&["manageAgentFaq"]),
        FieldDescription::options(
            "faq_operation",
            "FAQ Operation",
            "What to do with the FAQ",
            &[("Add", "add"), ("Update", "update"), ("Delete", "delete")],
            "add",
        )
        .show_for(&["manageAgentFaq"]),
        FieldDescription::string("faq_id", "FAQ ID", "Required when updating or deleting a FAQ")
            .show_for(&["manageAgentFaq"]),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getAgents" => {
            let (limit, offset) = page(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getAIAgents"))
                    .query("limit", limit)
                    .query("offset", offset),
                FailureContext::new("get agents"),
            ))
        }
        "getAgentById" => by_agent(params, "getAIAgentByID", "Get Agent By ID", "get agent"),
        "getAgentDocuments" => by_agent(params, "getAgentDocuments", "Get Agent Documents", "get agent documents"),
        "getAgentActions" => by_agent(params, "getAgentActions", "Get Agent Actions", "get agent actions"),
        "getKeywordReplacements" => by_agent(
            params,
            "getKeywordReplacements",
            "Get Keyword Replacements",
            "get keyword replacements",
        ),
        "getAgentKeywords" => by_agent(params, "getAgentKeywords", "Get Agent Keywords", "get agent keywords"),
        "getAgentFaq" => by_agent(params, "getAgentFaq", "Get Agent FAQs", "get agent FAQs"),
        "getAgentTemplates" => Ok(listing("getAgentTemplates", "get agent templates")),
        "getAIModels" => Ok(listing("getAIModels", "get AI models")),
        "createAgent" => create_agent(params),
        "updateAgent" => update_agent(params),
        "getVoicesByLanguage" => {
            let language = required_str(params, "language", "Language is required")?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getVoicesByLanguageComment")).query("language", language),
                FailureContext::new("get voices by language"),
            ))
        }
        "toggleFavorite" => set_flag(params, "toggleFavorite", "favorite", "Toggle Favorite", "toggle favorite"),
        "updateAgentShared" => set_flag(
            params,
            "updateAgentShared",
            "isShared",
            "Update Agent Visibility",
            "update agent visibility",
        ),
        "updateWhatsappNotification" => set_flag(
            params,
            "updateWhatsappNotification",
            "value",
            "Update WhatsApp Notification",
            "update WhatsApp notification",
        ),
        "updateMailNotification" => set_flag(
            params,
            "updateMailNotification",
            "value",
            "Update Mail Notification",
            "update mail notification",
        ),
        "updateAgentReschedule" => set_flag(
            params,
            "updateAgentReschedule",
            "reschedule",
            "Update Agent Reschedule",
            "update agent reschedule",
        ),
        "agentPromptHistory" => {
            let agent_id = agent_id(params, "Get Agent Prompt History")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("agentPromptHistory")).json(json!({ "agent_id": agent_id })),
                FailureContext::new("get agent prompt history").not_found(agent_not_found(&agent_id)),
            ))
        }
        "updateSuccessMetric" => {
            let agent_id = agent_id(params, "Update Success Metric")?;
            let metric = validate::json_value(&params.json("success_metric"), "Success Metric")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateSuccessMetric"))
                    .json(json!({ "agent_id": agent_id, "success_metric": metric })),
                FailureContext::new("update success metric").not_found(agent_not_found(&agent_id)),
            ))
        }
        "insertAgentDocument" => insert_document(params),
        "addKeyword" => add_keywords(params),
        "updateKeyword" => {
            let keyword_id = required_str(params, "keyword_id", "Keyword ID is required")?;
            let keyword = required_str(params, "keyword", "Keyword text is required")?;
            let replacement = required_str(params, "replacement", "Replacement text is required")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateKeyword")).json(json!({
                    "keyword_id": keyword_id,
                    "keyword": keyword,
                    "replacement": replacement,
                })),
                FailureContext::new("update keyword")
                    .not_found(format!("Keyword ID \"{keyword_id}\" does not exist. Use \"Get Agent Keywords\" to check.")),
            ))
        }
        "deleteKeyword" => {
            let keyword_id = required_str(params, "keyword_id", "Keyword ID is required")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteKeyword")).query("keyword_id", &keyword_id),
                FailureContext::new("delete keyword")
                    .not_found(format!("Keyword ID \"{keyword_id}\" does not exist. Use \"Get Agent Keywords\" to check.")),
            ))
        }
        "getTemplate" => by_template(params, "getTemplate", "get template"),
        "getAgentSamples" => by_template(params, "getAgentSamples", "get agent samples"),
        "manageAgentFaq" => manage_faq(params),
        other => Err(unknown_operation(Resource::Agent, other)),
    }
}

fn agent_id(params: &Params, operation: &str) -> Result<String, NormalizedError> {
    required_str(
        params,
        "agent_id",
        format!("Agent ID required for \"{operation}\". Use \"Get Agents\" to locate valid agent IDs."),
    )
}

fn agent_not_found(agent_id: &str) -> String {
    format!("Agent ID \"{agent_id}\" does not exist. Use \"Get Agents\" to check.")
}

fn listing(endpoint: &str, label: &str) -> Prepared {
    Prepared::request(RequestDescriptor::get(api_path(endpoint)), FailureContext::new(label))
}

/// GET `endpoint?agent_id=...`.
fn by_agent(params: &Params, endpoint: &str, operation: &str, label: &str) -> Result<Prepared, NormalizedError> {
    let agent_id = agent_id(params, operation)?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(endpoint)).query("agent_id", &agent_id),
        FailureContext::new(label).not_found(agent_not_found(&agent_id)),
    ))
}

/// POST `{agent_id, <flag>: bool}`.
fn set_flag(
    params: &Params,
    endpoint: &str,
    flag: &str,
    operation: &str,
    label: &str,
) -> Result<Prepared, NormalizedError> {
    let agent_id = agent_id(params, operation)?;
    let mut body = Map::new();
    body.insert("agent_id".into(), Value::String(agent_id.clone()));
    body.insert(flag.into(), Value::Bool(params.bool_or(flag, false)));
    Ok(Prepared::request(
        RequestDescriptor::post(api_path(endpoint)).json(Value::Object(body)),
        FailureContext::new(label).not_found(agent_not_found(&agent_id)),
    ))
}

fn by_template(params: &Params, endpoint: &str, label: &str) -> Result<Prepared, NormalizedError> {
    let template_id = required_str(params, "template_agent_id", "Template Agent ID is required")?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(endpoint)).query("template_agent_id", &template_id),
        FailureContext::new(label).not_found(format!(
            "Template Agent ID \"{template_id}\" does not exist. Use \"Get Agent Templates\" to check."
        )),
    ))
}

fn create_agent(params: &Params) -> Result<Prepared, NormalizedError> {
    let name = required_str(params, "name", "Agent name cannot be empty")?;
    validate::max_len(&name, MAX_NAME_LEN, "Agent name must be 100 characters or less")?;
    Ok(Prepared::request(
        RequestDescriptor::post(api_path("createAIAgent")).json(json!({ "name": name })),
        FailureContext::new("create agent")
            .conflict(format!("Agent \"{name}\" already exists. Choose a different name.")),
    ))
}

fn update_agent(params: &Params) -> Result<Prepared, NormalizedError> {
    let agent_id = agent_id(params, "Update Agent")?;
    let data = validate::json_value(&params.json("updateData"), "Update Data")?;
    let Value::Object(fields) = data else {
        return Err(ValidationError::new("Update Data must be a JSON object").into());
    };
    if fields.is_empty() {
        return Err(ValidationError::new("Provide at least one field to update").into());
    }
    // Keys in `updateData` take precedence, `agent_id` included.
    let mut body = Map::new();
    body.insert("agent_id".into(), Value::String(agent_id.clone()));
    body.extend(fields);

    Ok(Prepared::request(
        RequestDescriptor::post(api_path("updateAIAgent"))
            .query("agent_id", &agent_id)
            .json(Value::Object(body)),
        FailureContext::new("update agent").not_found(agent_not_found(&agent_id)),
    ))
}

fn insert_document(params: &Params) -> Result<Prepared, NormalizedError> {
    let file_name = required_str(params, "file_name", "File name cannot be empty")?;
    let file_url = required_str(params, "file_url", "File URL is required")?;
    validate::http_url(&file_url, "File URL")?;
    let file_type = required_str(params, "file_type", "File type is required")?;

    Ok(Prepared::request(
        RequestDescriptor::post(api_path("insertAgentDocx")).json(json!({
            "file_name": file_name,
            "file_url": file_url,
            "file_type": file_type,
            "site_url": params.str("site_url"),
            "webcrawler_depth": params.i64_or("webcrawler_depth", 0)?,
            "crawl_status": params.str("crawl_status"),
        })),
        FailureContext::new("insert agent document"),
    ))
}

fn add_keywords(params: &Params) -> Result<Prepared, NormalizedError> {
    let parsed = validate::json_value(&params.json("objects"), "Keywords")?;
    let Value::Array(objects) = parsed else {
        return Err(ValidationError::new("Keywords must be an array").into());
    };
    if objects.is_empty() {
        return Err(ValidationError::new("Provide at least one keyword").into());
    }
    for (index, object) in objects.iter().enumerate() {
        let complete = ["agent_id", "keyword", "replacement"].iter().all(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .is_some_and(|v| !v.is_empty())
        });
        if !complete {
            return Err(ValidationError::new(format!(
                "Keyword object at index {index} missing required fields (agent_id, keyword, replacement)"
            ))
            .into());
        }
    }

    Ok(Prepared::request(
        RequestDescriptor::post(api_path("addKeyword")).json(json!({ "objects": objects })),
        FailureContext::new("add keyword"),
    ))
}

fn manage_faq(params: &Params) -> Result<Prepared, NormalizedError> {
    let agent_id = agent_id(params, "Manage Agent FAQ")?;
    let question = required_str(params, "ques_data", "FAQ question cannot be empty")?;
    let answer = required_str(params, "ans_data", "FAQ answer cannot be empty")?;
    let operation = params.opt_str("faq_operation").unwrap_or_else(|| "add".to_string());
    if !FAQ_OPERATIONS.contains(&operation.as_str()) {
        return Err(ValidationError::new(format!(
            "Unknown FAQ operation \"{operation}\". Use one of: {}",
            FAQ_OPERATIONS.join(", ")
        ))
        .into());
    }
    let faq_id = params.opt_str("faq_id");
    if operation != "add" && faq_id.is_none() {
        return Err(ValidationError::new(format!("FAQ ID required for {operation} operation")).into());
    }

    let mut body = json!({
        "agent_id": agent_id,
        "ques_data": question,
        "ans_data": answer,
        "operation": operation,
    });
    if let Some(faq_id) = faq_id {
        body["faq_id"] = Value::String(faq_id);
    }

    Ok(Prepared::request(
        RequestDescriptor::post(api_path("agentFaq")).json(body),
        FailureContext::new("manage agent FAQ").not_found(agent_not_found(&agent_id)),
    ))
}
