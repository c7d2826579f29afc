use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::{
    entities::transactions::TransactionEntity, value_objects::tapwater_ledger::LedgerEntry,
};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The external id already has a ledger row.
    #[error("transaction {0} is already recorded")]
    DuplicateExternalId(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait]
#[automock]
pub trait TapWaterLedgerRepository {
    /// Writes the account, customer and transaction rows of `entry` and
    /// finalizes the transaction row with the backend outcome, atomically.
    /// Returns the committed transaction row.
    async fn record_transaction(&self, entry: LedgerEntry)
    -> Result<TransactionEntity, LedgerError>;
}
