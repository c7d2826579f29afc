pub mod billing_errors;
pub mod payment_commit;
pub mod tapwater;
