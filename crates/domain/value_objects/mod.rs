pub mod enums;
pub mod rpc_status;
pub mod status_catalog;
pub mod tapwater;
pub mod tapwater_ledger;
