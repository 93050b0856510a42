//! Contacts ("prospects") and contact groups.

use serde_json::{json, Map, Value};

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;
use crate::validate::{self, ValidationError};

use super::{api_path, page, required_str, unknown_operation, FailureContext, PostProcess, Prepared, Resource};

pub const DEFAULT_OPERATION: &str = "getContacts";

pub const OPERATIONS: &[OperationDescription] = &[
    op("createContactGroup", "Create Contact Group", "Create a contact group", "Create a new contact group"),
    op(
        "createContactInGroup",
        "Create Contact In Group",
        "Create a contact in a group",
        "Add a single contact to a group",
    ),
    op(
        "updateContactMetadata",
        "Update Contact Metadata",
        "Update contact metadata",
        "Replace the metadata of a contact",
    ),
    op("getContactGroups", "Get Contact Groups", "Get contact groups", "List contact groups"),
    op("updateContactGroup", "Update Contact Group", "Update a contact group", "Rename a contact group"),
    op("deleteContactGroup", "Delete Contact Group", "Delete a contact group", "Delete a contact group"),
    op("deleteContact", "Delete Contact", "Delete a contact", "Delete a single contact"),
    op("getContacts", "Get Contacts", "Get contacts", "List contacts"),
    op(
        "addMultipleContacts",
        "Add Multiple Contacts",
        "Add multiple contacts",
        "Add several contacts to a group at once",
    ),
    op("getContactData", "Get Contact Data", "Get contact data", "List the data records of a contact"),
    op("updateContactData", "Update Contact Data", "Update contact data", "Replace the data of a contact"),
    op("getContact", "Get Contact", "Get a contact", "Retrieve a single contact"),
    op(
        "createContactGroupV2",
        "Create Contact Group V2",
        "Create a contact group (v2)",
        "Create a new contact group using the v2 endpoint",
    ),
    op(
        "addMultipleContactsV2",
        "Add Multiple Contacts V2",
        "Add multiple contacts (v2)",
        "Add several contacts in international format to a group",
    ),
];

const CONTACTS_EXAMPLE: &str = r#"[
  {
    "name": "John Doe",
    "phone": "+911234567890",
    "data": {"email": "john@example.com"}
  },
  {
    "name": "Jane Smith",
    "phone": "+919876543210",
    "data": {"company": "Acme Corp"}
  }
]"#;

pub fn fields() -> Vec<FieldDescription> {
    const PAGED: &[&str] = &["getContactGroups", "getContacts", "getContactData"];
    const BULK: &[&str] = &["addMultipleContacts", "addMultipleContactsV2"];
    vec![
        FieldDescription::string("name", "Group Name", "Name of the contact group")
            .required()
            .show_for(&["createContactGroup", "createContactGroupV2", "updateContactGroup"]),
        FieldDescription::string("contact_name", "Contact Name", "Name of the contact")
            .required()
            .show_for(&["createContactInGroup"]),
        FieldDescription::string("phone", "Phone", "Phone number of the contact")
            .required()
            .placeholder("+919876543210")
            .show_for(&["createContactInGroup"]),
        FieldDescription::string("prospect_group_id", "Prospect Group ID", "ID of the contact group")
            .required()
            .show_for(&["createContactInGroup", "addMultipleContacts", "addMultipleContactsV2"]),
        FieldDescription::string("prospect_id", "Prospect ID", "ID of the contact")
            .required()
            .show_for(&["updateContactMetadata", "getContactData", "updateContactData", "getContact"]),
        FieldDescription::json("metadata", "Metadata (JSON)", "Metadata to store on the contact", "{}")
            .show_for(&["updateContactMetadata"]),
        limit_field(PAGED),
        offset_field(PAGED),
        FieldDescription::string("group_id", "Group ID", "ID of the contact group")
            .required()
            .show_for(&["updateContactGroup", "deleteContactGroup"]),
        FieldDescription::string("contact_id", "Contact ID", "ID of the contact")
            .required()
            .show_for(&["deleteContact"]),
        FieldDescription::string("client_id", "User ID", "Your user ID. Get it from Auth > Get Auth Info")
            .required()
            .show_for(&["updateContactGroup", "addMultipleContacts", "addMultipleContactsV2"]),
        FieldDescription::json("data", "Update Data (JSON)", "Data to store on the contact", "{}")
            .show_for(&["updateContactData"]),
        FieldDescription::json(
            "contacts_json",
            "Contacts (JSON)",
            "Array of {name, phone, data} objects",
            CONTACTS_EXAMPLE,
        )
        .required()
        .show_for(BULK),
    ]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "createContactGroup" => create_group(params, "createContactGroup"),
        "createContactGroupV2" => create_group(params, "createContactGroupV2"),
        "createContactInGroup" => {
            let name = required_str(params, "contact_name", "Contact name is required.")?;
            let phone = required_str(params, "phone", "Phone is required.")?;
            let group_id = group_id(params)?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("createContactInGroup")).json(json!({
                    "name": name,
                    "phone": phone,
                    "prospect_group_id": group_id,
                })),
                FailureContext::new("create contact in group").not_found(group_not_found(&group_id)),
            ))
        }
        "updateContactMetadata" => {
            let prospect_id = prospect_id(params)?;
            let metadata = json_or_empty(params, "metadata", "Metadata")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateContactMetadata"))
                    .query("prospect_id", &prospect_id)
                    .json(json!({ "metadata": metadata })),
                FailureContext::new("update contact metadata").not_found(prospect_not_found(&prospect_id)),
            ))
        }
        "getContactGroups" => paged(params, "getContactGroups", "get contact groups"),
        "getContacts" => paged(params, "getContacts", "get contacts"),
        "updateContactGroup" => {
            let client_id = required_str(params, "client_id", "User ID is required. Get it from Auth > Get Auth Info.")?;
            let group_id = required_str(params, "group_id", "Group ID is required.")?;
            let name = required_str(params, "name", "Group name is required.")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateContactGroup"))
                    .json(json!({ "client_id": client_id, "id": group_id, "name": name })),
                FailureContext::new("update contact group").not_found(group_not_found(&group_id)),
            ))
        }
        "deleteContactGroup" => {
            let group_id = required_str(params, "group_id", "Group ID is required.")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteContactGroup")).json(json!({ "id": group_id })),
                FailureContext::new("delete contact group").not_found(group_not_found(&group_id)),
            ))
        }
        "deleteContact" => {
            let contact_id = required_str(params, "contact_id", "Contact ID is required.")?;
            Ok(Prepared::request(
                RequestDescriptor::delete(api_path("deleteContact")).json(json!({ "contact_id": contact_id })),
                FailureContext::new("delete contact").not_found(prospect_not_found(&contact_id)),
            ))
        }
        "addMultipleContacts" => add_many(params, "addMultipleContactsToGroup", false),
        "addMultipleContactsV2" => add_many(params, "addMultipleContactsToGroupV2", true),
        "getContactData" => {
            let prospect_id = prospect_id(params)?;
            let (limit, offset) = page(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getContactData"))
                    .query("limit", limit)
                    .query("offset", offset)
                    .query("prospect_id", &prospect_id),
                FailureContext::new("get contact data").not_found(prospect_not_found(&prospect_id)),
            ))
        }
        "updateContactData" => {
            let prospect_id = prospect_id(params)?;
            let data = json_or_empty(params, "data", "Update Data")?;
            Ok(Prepared::request(
                RequestDescriptor::post(api_path("updateContactData"))
                    .json(json!({ "prospect_id": prospect_id, "data": data })),
                FailureContext::new("update contact data").not_found(prospect_not_found(&prospect_id)),
            ))
        }
        "getContact" => {
            let prospect_id = prospect_id(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get(api_path("getContact")).query("prospect_id", &prospect_id),
                FailureContext::new("get contact").not_found(prospect_not_found(&prospect_id)),
            ))
        }
        other => Err(unknown_operation(Resource::Contacts, other)),
    }
}

fn prospect_id(params: &Params) -> Result<String, NormalizedError> {
    required_str(
        params,
        "prospect_id",
        "Prospect ID is required. Use \"Get Contacts\" to locate valid prospect IDs.",
    )
}

fn group_id(params: &Params) -> Result<String, NormalizedError> {
    required_str(
        params,
        "prospect_group_id",
        "Prospect group ID is required. Use \"Get Contact Groups\" or create a new one.",
    )
}

fn prospect_not_found(id: &str) -> String {
    format!("Contact \"{id}\" does not exist. Use \"Get Contacts\" to check.")
}

fn group_not_found(id: &str) -> String {
    format!("Contact group \"{id}\" does not exist. Use \"Get Contact Groups\" to check.")
}

/// A JSON field that defaults to `{}` when left empty.
fn json_or_empty(params: &Params, name: &str, field: &str) -> Result<Value, NormalizedError> {
    match params.get(name) {
        None => Ok(Value::Object(Map::new())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Value::Object(Map::new())),
        Some(value) => Ok(validate::json_value(value, field)?),
    }
}

fn paged(params: &Params, endpoint: &str, label: &str) -> Result<Prepared, NormalizedError> {
    let (limit, offset) = page(params)?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(endpoint))
            .query("limit", limit)
            .query("offset", offset),
        FailureContext::new(label),
    ))
}

fn create_group(params: &Params, endpoint: &str) -> Result<Prepared, NormalizedError> {
    let name = required_str(params, "name", "Group name is required.")?;
    Ok(Prepared::request(
        RequestDescriptor::post(api_path(endpoint)).json(json!({ "name": name })),
        FailureContext::new("create contact group")
            .conflict(format!("Contact group \"{name}\" already exists. Choose a different name.")),
    ))
}

/// Bulk upload. The result summarizes what was submitted next to the reply.
fn add_many(params: &Params, endpoint: &str, international: bool) -> Result<Prepared, NormalizedError> {
    let group_id = group_id(params)?;
    let client_id = required_str(params, "client_id", "User ID is required. Get it from Auth > Get Auth Info.")?;

    let parsed = validate::json_value(&params.json("contacts_json"), "Contacts")
        .map_err(|_| ValidationError::new("Invalid JSON format in Contacts field"))?;
    let contacts = match parsed {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err(ValidationError::new("Contacts must be a non-empty array").into()),
    };

    let mut prospects = Vec::with_capacity(contacts.len());
    let mut summary = Vec::with_capacity(contacts.len());
    for (index, contact) in contacts.iter().enumerate() {
        let Value::Object(fields) = contact else {
            return Err(ValidationError::new(format!("Contact at index {index} must be an object")).into());
        };
        let name = fields.get("name").cloned().unwrap_or(Value::Null);
        let phone = fields.get("phone").cloned().unwrap_or(Value::Null);
        if international {
            validate::phone_number(phone.as_str().unwrap_or_default(), &format!("Phone of contact {index}"))?;
        }
        let data = match fields.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => Value::Object(Map::new()),
        };

        prospects.push(json!({
            "name": name,
            "phone": phone,
            "data": data,
            "prospect_group_id": group_id,
            "client_id": client_id,
        }));
        summary.push(json!({ "name": name, "phone": phone, "group_id": group_id }));
    }

    Ok(
        Prepared::request(
            RequestDescriptor::post(api_path(endpoint)).json(json!({ "prospects": prospects })),
            FailureContext::new("add contacts").not_found(group_not_found(&group_id)),
        )
        .with_post(PostProcess::ContactsAdded { contacts: summary }),
    )
}
