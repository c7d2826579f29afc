use rust_decimal::Decimal;

use super::tapwater::{TxReceipt, TxRequest};
use crate::domain::entities::{
    accounts::InsertAccountEntity, customers::InsertCustomerEntity,
    transactions::InsertTransactionEntity,
};

/// How the billing backend settled a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    Accepted {
        reference_number: String,
        lcy_fee: Decimal,
        customer_display_name: Option<String>,
    },
    Rejected {
        reason: String,
    },
}

impl LedgerOutcome {
    pub fn accepted(receipt: &TxReceipt) -> Self {
        LedgerOutcome::Accepted {
            reference_number: receipt.id.clone(),
            lcy_fee: receipt.lcy_fee,
            customer_display_name: receipt.customer.display_name.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LedgerOutcome::Accepted { .. })
    }
}

/// Everything written to local storage for one payment attempt, in one
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub account: InsertAccountEntity,
    pub customer: InsertCustomerEntity,
    pub transaction: InsertTransactionEntity,
    pub outcome: LedgerOutcome,
}

impl LedgerEntry {
    pub fn new(request: &TxRequest, outcome: LedgerOutcome) -> Self {
        Self {
            account: InsertAccountEntity::from(&request.account),
            customer: InsertCustomerEntity::from(&request.customer),
            transaction: InsertTransactionEntity::from(request),
            outcome,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.transaction.external_number
    }
}
