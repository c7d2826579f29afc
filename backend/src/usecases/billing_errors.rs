use crates::domain::value_objects::status_catalog::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("request not valid")]
    ValidationFailed,
    #[error("no info")]
    NoInfoFound,
    #[error("not allow foreign currency for this bill type")]
    CurrencyNotAllowed,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("session expired")]
    SessionExpired,
    #[error("transaction has already been submitted")]
    DuplicateTransaction,
    /// The billing backend moved the money but the local ledger could not
    /// record it. Never retried automatically.
    #[error(
        "payment {external_id} settled by billing backend as {reference_number} but ledger write failed: {source:#}"
    )]
    LedgerInconsistency {
        external_id: String,
        reference_number: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Opaque(#[from] anyhow::Error),
}

impl BillingError {
    /// The documented status kind, or `None` for unclassified failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            BillingError::ValidationFailed => Some(ErrorKind::ValidationFailed),
            BillingError::NoInfoFound => Some(ErrorKind::NoInfoFound),
            BillingError::CurrencyNotAllowed => Some(ErrorKind::CurrencyNotAllowed),
            BillingError::PermissionDenied => Some(ErrorKind::PermissionDenied),
            BillingError::Unauthenticated => Some(ErrorKind::Unauthenticated),
            BillingError::SessionExpired => Some(ErrorKind::SessionExpired),
            BillingError::DuplicateTransaction => Some(ErrorKind::DuplicateTransaction),
            BillingError::LedgerInconsistency { .. } | BillingError::Opaque(_) => None,
        }
    }
}
