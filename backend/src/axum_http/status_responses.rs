use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::value_objects::{
    rpc_status::{CanonicalStatus, Code, StatusDetail},
    status_catalog::StatusCatalog,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::usecases::billing_errors::BillingError;

/// The wire form of a failure: `{ "error": { code, message, details } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub details: Vec<StatusDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    pub http_code: StatusCode,
    pub body: ErrorEnvelope,
}

/// Resolves the caller-visible status of a use case outcome. Unclassified
/// failures never leak their text; they resolve to INTERNAL.
pub fn status_from_error(catalog: &StatusCatalog, err: Option<&BillingError>) -> CanonicalStatus {
    match err {
        None => CanonicalStatus::ok(),
        Some(err) => match err.kind() {
            Some(kind) => catalog.lookup(kind),
            None => CanonicalStatus::internal(),
        },
    }
}

pub fn http_status_from_code(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::REQUEST_TIMEOUT,
        Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        // Deliberately 400, not 412.
        Code::FailedPrecondition => StatusCode::BAD_REQUEST,
        Code::Aborted => StatusCode::CONFLICT,
        Code::OutOfRange => StatusCode::BAD_REQUEST,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
    }
}

pub fn render_transport(status: &CanonicalStatus) -> TransportStatus {
    let http_code = http_status_from_code(status.code);

    TransportStatus {
        http_code,
        body: ErrorEnvelope {
            error: ErrorBody {
                code: http_code.as_u16(),
                message: status.message.clone(),
                details: status.details.clone(),
            },
        },
    }
}

/// Handler failure rendered through the status catalog.
///
/// Business errors travel as HTTP 200 with the mapped status embedded in the
/// body; existing clients read `error.code` rather than the response line.
pub struct ApiError {
    catalog: Arc<StatusCatalog>,
    error: BillingError,
}

impl ApiError {
    pub fn new(catalog: Arc<StatusCatalog>, error: BillingError) -> Self {
        Self { catalog, error }
    }

    pub fn from_rejection(catalog: Arc<StatusCatalog>, rejection: JsonRejection) -> Self {
        warn!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "request body rejected"
        );
        Self::new(catalog, BillingError::ValidationFailed)
    }

    pub fn transport_status(&self) -> TransportStatus {
        render_transport(&status_from_error(&self.catalog, Some(&self.error)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.transport_status();

        if self.error.kind().is_none() {
            // Full detail stays in the logs only.
            error!(error = ?self.error, "request failed with an unclassified error");
        }

        (StatusCode::OK, Json(status.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use crates::domain::value_objects::status_catalog::{DEFAULT_STATUS_DOMAIN, ErrorKind};
    use serde_json::{Value, json};

    fn catalog() -> Arc<StatusCatalog> {
        Arc::new(StatusCatalog::standard(DEFAULT_STATUS_DOMAIN))
    }

    fn error_for(kind: ErrorKind) -> BillingError {
        match kind {
            ErrorKind::ValidationFailed => BillingError::ValidationFailed,
            ErrorKind::NoInfoFound => BillingError::NoInfoFound,
            ErrorKind::CurrencyNotAllowed => BillingError::CurrencyNotAllowed,
            ErrorKind::PermissionDenied => BillingError::PermissionDenied,
            ErrorKind::Unauthenticated => BillingError::Unauthenticated,
            ErrorKind::SessionExpired => BillingError::SessionExpired,
            ErrorKind::DuplicateTransaction => BillingError::DuplicateTransaction,
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn no_error_is_ok() {
        let status = status_from_error(&catalog(), None);
        assert!(status.is_ok());
        assert_eq!(render_transport(&status).http_code, StatusCode::OK);
    }

    #[test]
    fn rendering_depends_only_on_error_kind() {
        let catalog = catalog();
        for kind in ErrorKind::ALL {
            let first = render_transport(&status_from_error(&catalog, Some(&error_for(kind))));
            let second = render_transport(&status_from_error(&catalog, Some(&error_for(kind))));
            assert_eq!(first, second, "{kind:?}");
            assert_ne!(first.http_code, StatusCode::OK, "{kind:?}");
        }
    }

    #[test]
    fn opaque_errors_fail_safe_to_internal_without_leaking_text() {
        let err = BillingError::Opaque(anyhow!("pq: password authentication failed for user"));
        let rendered = render_transport(&status_from_error(&catalog(), Some(&err)));

        assert_eq!(rendered.http_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.body.error.message, "Internal Server Error");
        assert!(rendered.body.error.details.is_empty());
    }

    #[test]
    fn ledger_inconsistency_renders_as_internal() {
        let err = BillingError::LedgerInconsistency {
            external_id: "ext-1".to_string(),
            reference_number: "REF-1".to_string(),
            source: anyhow!("connection refused"),
        };
        let rendered = render_transport(&status_from_error(&catalog(), Some(&err)));

        assert_eq!(rendered.http_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!rendered.body.error.message.contains("REF-1"));
    }

    #[test]
    fn empty_catalog_falls_back_to_internal() {
        let empty = StatusCatalog::from_entries(Vec::<(ErrorKind, CanonicalStatus)>::new());
        let status = status_from_error(&empty, Some(&BillingError::NoInfoFound));
        assert_eq!(status.code, Code::Internal);
    }

    #[test]
    fn code_table_is_total() {
        assert_eq!(http_status_from_code(Code::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            http_status_from_code(Code::FailedPrecondition),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status_from_code(Code::PermissionDenied),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            http_status_from_code(Code::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            http_status_from_code(Code::InvalidArgument),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status_from_code(Code::AlreadyExists),
            StatusCode::CONFLICT
        );
        assert_eq!(
            http_status_from_code(Code::Unavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            http_status_from_code(Code::DataLoss),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn body_always_carries_details_list() {
        let body = serde_json::to_value(render_transport(&CanonicalStatus::internal()).body).unwrap();
        assert_eq!(
            body,
            json!({"error": {"code": 500, "message": "Internal Server Error", "details": []}})
        );
    }

    #[tokio::test]
    async fn unknown_customer_renders_404_with_bill_info_resource() {
        let response = ApiError::new(catalog(), BillingError::NoInfoFound).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "info not found.");
        assert_eq!(
            body["error"]["details"][0]["@type"],
            "type.googleapis.com/google.rpc.ResourceInfo"
        );
        assert_eq!(body["error"]["details"][0]["resourceType"], "BILL INFO");
    }

    #[tokio::test]
    async fn foreign_currency_renders_400_with_currency_field_violation() {
        let response = ApiError::new(catalog(), BillingError::CurrencyNotAllowed).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
        assert_eq!(
            body["error"]["details"][0]["fieldViolations"][0]["field"],
            "Account['currency']"
        );
    }

    #[tokio::test]
    async fn duplicate_submission_renders_conflict() {
        let response = ApiError::new(catalog(), BillingError::DuplicateTransaction).into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"]["code"], 409);
        assert_eq!(body["error"]["details"][0]["reason"], "DUPLICATE_EXTERNAL_ID");
    }
}
