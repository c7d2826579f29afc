use std::collections::{BTreeMap, HashMap};

use super::rpc_status::{CanonicalStatus, Code, StatusDetail};

pub const DEFAULT_STATUS_DOMAIN: &str = "jdbbank.com.la";

/// Classified domain failures that have a documented status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationFailed,
    NoInfoFound,
    CurrencyNotAllowed,
    PermissionDenied,
    Unauthenticated,
    SessionExpired,
    DuplicateTransaction,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::ValidationFailed,
        ErrorKind::NoInfoFound,
        ErrorKind::CurrencyNotAllowed,
        ErrorKind::PermissionDenied,
        ErrorKind::Unauthenticated,
        ErrorKind::SessionExpired,
        ErrorKind::DuplicateTransaction,
    ];
}

/// Immutable table binding every [`ErrorKind`] to the status callers see.
///
/// Built once at startup and shared behind an `Arc`. Lookups are total: a kind
/// without an entry resolves to the generic internal status.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    entries: HashMap<ErrorKind, CanonicalStatus>,
}

impl StatusCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = (ErrorKind, CanonicalStatus)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn standard(domain: &str) -> Self {
        let service = format!("{domain}/tapwater");

        Self::from_entries([
            (
                ErrorKind::ValidationFailed,
                CanonicalStatus::new(
                    Code::InvalidArgument,
                    "Binding JSON body failure. Please pass a valid JSON body.",
                )
                .with_detail(StatusDetail::error_info("BINDING_FAILURE", domain)),
            ),
            (
                ErrorKind::Unauthenticated,
                CanonicalStatus::new(
                    Code::Unauthenticated,
                    "ID token not valid. Please pass a valid ID token.",
                )
                .with_detail(StatusDetail::ErrorInfo {
                    reason: "TOKEN_INVALID".to_string(),
                    domain: domain.to_string(),
                    metadata: BTreeMap::from([("service".to_string(), service.clone())]),
                }),
            ),
            (
                ErrorKind::SessionExpired,
                CanonicalStatus::new(
                    Code::Unauthenticated,
                    "Session has been expired. Please make a new session and try again.",
                )
                .with_detail(StatusDetail::error_info("SESSION_EXPIRED", domain)),
            ),
            (
                ErrorKind::PermissionDenied,
                CanonicalStatus::new(
                    Code::PermissionDenied,
                    "You don't have sufficient permission to perform action.",
                )
                .with_detail(StatusDetail::error_info("INSUFFICIENT_PERMISSION", &service)),
            ),
            (
                ErrorKind::NoInfoFound,
                CanonicalStatus::new(Code::NotFound, "info not found.").with_detail(
                    StatusDetail::resource_info("BILL INFO", "[google.rpc.Code.NotFound]"),
                ),
            ),
            (
                ErrorKind::CurrencyNotAllowed,
                CanonicalStatus::new(
                    Code::FailedPrecondition,
                    "account currency not allowed for this bill.",
                )
                .with_detail(StatusDetail::field_violation(
                    "Account['currency']",
                    "must be LAK only for this bill",
                )),
            ),
            (
                ErrorKind::DuplicateTransaction,
                CanonicalStatus::new(
                    Code::AlreadyExists,
                    "transaction has already been submitted.",
                )
                .with_detail(StatusDetail::error_info("DUPLICATE_EXTERNAL_ID", domain)),
            ),
        ])
    }

    pub fn lookup(&self, kind: ErrorKind) -> CanonicalStatus {
        self.entries
            .get(&kind)
            .cloned()
            .unwrap_or_else(CanonicalStatus::internal)
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::standard(DEFAULT_STATUS_DOMAIN)
    }
}
