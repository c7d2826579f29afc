use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle of a single payment attempt. `Persisted` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentState {
    Submitted,
    ExternalAccepted,
    Persisted { success: bool },
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Submitted => "submitted",
            PaymentState::ExternalAccepted => "external_accepted",
            PaymentState::Persisted { success: true } => "persisted_success",
            PaymentState::Persisted { success: false } => "persisted_failed",
        }
    }
}

impl Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
