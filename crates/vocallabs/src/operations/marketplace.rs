//! Phone number marketplace. Every listing is paginated.

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;

use super::{api_path, page, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op(
        "fetchAvailableNumbers",
        "Fetch Available Numbers",
        "Fetch available numbers",
        "List phone numbers available for purchase",
    ),
    op("getNumbers", "Get Numbers", "Get owned numbers", "List the phone numbers owned by the account"),
    op("fetchCountries", "Fetch Countries", "Fetch countries", "List countries numbers can be bought in"),
];

pub fn fields() -> Vec<FieldDescription> {
    const PAGED: &[&str] = &["fetchAvailableNumbers", "getNumbers", "fetchCountries"];
    vec![limit_field(PAGED), offset_field(PAGED)]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    let label = match operation {
        "fetchAvailableNumbers" => "fetch available numbers",
        "getNumbers" => "get numbers",
        "fetchCountries" => "fetch countries",
        other => return Err(unknown_operation(Resource::Marketplace, other)),
    };
    let (limit, offset) = page(params)?;
    Ok(Prepared::request(
        RequestDescriptor::get(api_path(operation))
            .query("limit", limit)
            .query("offset", offset),
        FailureContext::new(label),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listings_are_paginated() {
        for op in OPERATIONS {
            let prepared = prepare(op.value, &Params::default()).unwrap();
            let req = prepared.descriptor().unwrap();
            assert_eq!(req.path, format!("/b2b/vocallabs/{}", op.value));
            assert_eq!(req.query_value("limit"), Some("10"));

            let zero = Params::from_value(json!({ "limit": 0 }));
            assert!(prepare(op.value, &zero).is_err());
        }
    }
}
