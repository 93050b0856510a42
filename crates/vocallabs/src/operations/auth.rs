//! Credential diagnostics.

use crate::description::{op, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;

use super::{unknown_operation, Action, FailureContext, PostProcess, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[op(
    "getAuthInfo",
    "Get Auth Info",
    "Get authentication info",
    "Exchange the credentials for a fresh token and report the account's user ID",
)];

/// `getAuthInfo` always performs a fresh exchange and never reads or
/// writes the token cache.
pub fn prepare(operation: &str, _params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getAuthInfo" => Ok(Prepared {
            action: Action::ExchangeToken,
            failure: FailureContext::new("get auth info"),
            post: PostProcess::Passthrough,
        }),
        other => Err(unknown_operation(Resource::Auth, other)),
    }
}
