pub mod tapwater_ledger;
