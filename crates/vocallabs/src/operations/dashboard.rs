//! Account dashboard.

use crate::description::{op, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;

use super::{api_path, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op(
        "getDashboardStats",
        "Get Dashboard Stats",
        "Get dashboard statistics",
        "Retrieve account-level call and usage statistics",
    ),
    op("getTokens", "Get Tokens", "Get client tokens", "List the client tokens usable for direct calls"),
];

pub fn prepare(operation: &str, _params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getDashboardStats" => Ok(Prepared::request(
            RequestDescriptor::get(api_path("getDashboardStats")),
            FailureContext::new("get dashboard stats"),
        )),
        "getTokens" => Ok(Prepared::request(
            RequestDescriptor::get(api_path("getTokens")),
            FailureContext::new("get tokens"),
        )),
        other => Err(unknown_operation(Resource::Dashboard, other)),
    }
}
