pub mod accounts;
pub mod customers;
pub mod transactions;
