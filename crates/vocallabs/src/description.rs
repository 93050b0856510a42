//! Declarative descriptors consumed by the host's form renderer.
//!
//! Nothing in here performs validation; the operation modules enforce the
//! rules. The descriptors only tell the host which fields to show for which
//! resource/operation pair.

use serde::Serialize;
use serde_json::Value;

use crate::credentials;
use crate::operations::Resource;

/// Input widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Json,
    Options,
    StringList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    pub name: &'static str,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub required: bool,
    pub default: Value,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Operations this field is shown for. Empty means always.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub show_for: Vec<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
}

impl FieldDescription {
    fn base(
        kind: FieldType,
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            display_name,
            kind,
            required: false,
            default,
            description,
            placeholder: None,
            hint: None,
            options: Vec::new(),
            show_for: Vec::new(),
            password: false,
        }
    }

    pub fn string(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self::base(FieldType::String, name, display_name, description, Value::from(""))
    }

    pub fn number(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        default: i64,
    ) -> Self {
        Self::base(FieldType::Number, name, display_name, description, Value::from(default))
    }

    pub fn boolean(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        default: bool,
    ) -> Self {
        Self::base(FieldType::Boolean, name, display_name, description, Value::from(default))
    }

    pub fn json(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        default: &'static str,
    ) -> Self {
        Self::base(FieldType::Json, name, display_name, description, Value::from(default))
    }

    pub fn string_list(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self::base(FieldType::StringList, name, display_name, description, Value::Array(Vec::new()))
    }

    pub fn options(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        options: &[(&'static str, &'static str)],
        default: &'static str,
    ) -> Self {
        let mut field = Self::base(FieldType::Options, name, display_name, description, Value::from(default));
        field.options = options
            .iter()
            .map(|&(name, value)| FieldOption { name, value: Value::from(value) })
            .collect();
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn password(mut self) -> Self {
        self.password = true;
        self
    }

    pub fn show_for(mut self, operations: &[&'static str]) -> Self {
        self.show_for = operations.to_vec();
        self
    }

    pub fn is_shown_for(&self, operation: &str) -> bool {
        self.show_for.is_empty() || self.show_for.contains(&operation)
    }
}

/// Page size field shared by paginated operations.
pub fn limit_field(operations: &[&'static str]) -> FieldDescription {
    FieldDescription::number("limit", "Limit", "Number of records to retrieve (max 100)", 10)
        .show_for(operations)
}

/// Page offset field shared by paginated operations.
pub fn offset_field(operations: &[&'static str]) -> FieldDescription {
    FieldDescription::number("offset", "Offset", "Number of records to skip", 0)
        .show_for(operations)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescription {
    pub value: &'static str,
    pub name: &'static str,
    pub action: &'static str,
    pub description: &'static str,
}

pub const fn op(
    value: &'static str,
    name: &'static str,
    action: &'static str,
    description: &'static str,
) -> OperationDescription {
    OperationDescription { value, name, action, description }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescription {
    pub value: &'static str,
    pub name: &'static str,
    /// Operation preselected when the resource is picked.
    pub default: &'static str,
    pub operations: Vec<OperationDescription>,
    pub fields: Vec<FieldDescription>,
}

impl ResourceDescription {
    pub fn default_operation(&self) -> &'static str {
        self.default
    }

    pub fn operation(&self, value: &str) -> Option<&OperationDescription> {
        self.operations.iter().find(|o| o.value == value)
    }

    /// Fields visible for `operation`, in declaration order.
    pub fn fields_for<'a>(&'a self, operation: &'a str) -> impl Iterator<Item = &'a FieldDescription> + 'a {
        self.fields.iter().filter(move |f| f.is_shown_for(operation))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialRequirement {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub properties: Vec<FieldDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: u32,
    pub credentials: Vec<CredentialRequirement>,
    pub default_resource: &'static str,
    pub resources: Vec<ResourceDescription>,
}

impl NodeDescription {
    pub fn resource(&self, value: &str) -> Option<&ResourceDescription> {
        self.resources.iter().find(|r| r.value == value)
    }
}

/// The full node descriptor, resources in selector order.
pub fn describe() -> NodeDescription {
    NodeDescription {
        name: "vocallabs",
        display_name: "VocalLabs",
        description: "Manage AI voice agents, calls, campaigns and contacts on VocalLabs",
        version: 1,
        credentials: vec![CredentialRequirement {
            name: credentials::CREDENTIAL_NAME,
            required: true,
        }],
        default_resource: Resource::Agent.as_str(),
        resources: Resource::ALL.iter().map(|r| r.describe()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_has_operations_and_unique_values() {
        let node = describe();
        assert_eq!(node.resources.len(), Resource::ALL.len());

        for resource in &node.resources {
            assert!(!resource.operations.is_empty(), "{} has no operations", resource.value);
            assert!(resource.operation(resource.default).is_some());
            let mut seen = std::collections::HashSet::new();
            for op in &resource.operations {
                assert!(seen.insert(op.value), "duplicate operation {}", op.value);
            }
        }
    }

    #[test]
    fn fields_only_reference_known_operations() {
        let node = describe();
        for resource in &node.resources {
            for field in &resource.fields {
                for op in &field.show_for {
                    assert!(
                        resource.operation(op).is_some(),
                        "field {} of {} shown for unknown operation {}",
                        field.name,
                        resource.value,
                        op
                    );
                }
            }
        }
    }

    #[test]
    fn operation_count_matches_the_api_surface() {
        let total: usize = describe().resources.iter().map(|r| r.operations.len()).sum();
        assert_eq!(total, 91);
    }

    #[test]
    fn serializes_field_type_as_type_key() {
        let field = limit_field(&["getAgents"]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["default"], 10);
        assert_eq!(json["show_for"], serde_json::json!(["getAgents"]));
        assert!(json.get("password").is_none());
    }

    #[test]
    fn default_resource_is_agent() {
        let node = describe();
        assert_eq!(node.default_resource, "agent");
        assert_eq!(
            node.resource("agent").map(|r| r.default_operation()),
            Some("getAgents")
        );
        assert_eq!(
            node.resource("contacts").map(|r| r.default_operation()),
            Some("getContacts")
        );
    }
}
