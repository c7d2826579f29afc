use std::{collections::BTreeMap, fmt::Display};

use serde::Serialize;

/// Canonical status codes, numbered as in `google.rpc.Code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub description: String,
}

/// Structured error details, serialized the way `google.rpc` details are
/// rendered in JSON (an `@type` discriminator plus camelCase fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "@type")]
pub enum StatusDetail {
    #[serde(
        rename = "type.googleapis.com/google.rpc.ErrorInfo",
        rename_all = "camelCase"
    )]
    ErrorInfo {
        reason: String,
        domain: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        metadata: BTreeMap<String, String>,
    },
    #[serde(
        rename = "type.googleapis.com/google.rpc.ResourceInfo",
        rename_all = "camelCase"
    )]
    ResourceInfo {
        resource_type: String,
        resource_name: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        owner: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        description: String,
    },
    #[serde(
        rename = "type.googleapis.com/google.rpc.BadRequest",
        rename_all = "camelCase"
    )]
    BadRequest { field_violations: Vec<FieldViolation> },
}

impl StatusDetail {
    pub fn error_info(reason: &str, domain: &str) -> Self {
        StatusDetail::ErrorInfo {
            reason: reason.to_string(),
            domain: domain.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn resource_info(resource_type: &str, resource_name: &str) -> Self {
        StatusDetail::ResourceInfo {
            resource_type: resource_type.to_string(),
            resource_name: resource_name.to_string(),
            owner: String::new(),
            description: String::new(),
        }
    }

    pub fn field_violation(field: &str, description: &str) -> Self {
        StatusDetail::BadRequest {
            field_violations: vec![FieldViolation {
                field: field.to_string(),
                description: description.to_string(),
            }],
        }
    }
}

/// A protocol-neutral status: code, human message and structured details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalStatus {
    pub code: Code,
    pub message: String,
    pub details: Vec<StatusDetail>,
}

impl CanonicalStatus {
    pub fn new(code: Code, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: StatusDetail) -> Self {
        self.details.push(detail);
        self
    }

    pub fn ok() -> Self {
        Self::new(Code::Ok, "OK")
    }

    pub fn internal() -> Self {
        Self::new(Code::Internal, "Internal Server Error")
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}
