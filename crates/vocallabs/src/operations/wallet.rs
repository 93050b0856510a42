//! Wallet balance and transaction history.

use crate::description::{limit_field, offset_field, op, FieldDescription, OperationDescription};
use crate::error::NormalizedError;
use crate::params::Params;
use crate::request::RequestDescriptor;

use super::{page, unknown_operation, FailureContext, Prepared, Resource};

pub const OPERATIONS: &[OperationDescription] = &[
    op("getBalance", "Get Balance", "Get wallet balance", "Retrieve the current wallet balance"),
    op(
        "getTransactionHistory",
        "Get Transaction History",
        "Get transaction history",
        "List wallet transactions",
    ),
];

pub fn fields() -> Vec<FieldDescription> {
    const PAGED: &[&str] = &["getTransactionHistory"];
    vec![limit_field(PAGED), offset_field(PAGED)]
}

pub fn prepare(operation: &str, params: &Params) -> Result<Prepared, NormalizedError> {
    match operation {
        "getBalance" => Ok(Prepared::request(
            RequestDescriptor::get("/b2b/getGreenBalance"),
            FailureContext::new("get wallet balance"),
        )),
        "getTransactionHistory" => {
            let (limit, offset) = page(params)?;
            Ok(Prepared::request(
                RequestDescriptor::get("/b2b/whatsubTransactionHistory")
                    .query("limit", limit)
                    .query("offset", offset),
                FailureContext::new("get transaction history"),
            ))
        }
        other => Err(unknown_operation(Resource::Wallet, other)),
    }
}
