use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{domain::value_objects::tapwater::TxRequest, infra::db::postgres::schema::transactions};

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub external_number: String,
    pub customer_id: String,
    pub account_ban: String,
    pub bill_period: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub lcy_amount: Decimal,
    pub fee: Decimal,
    pub lcy_fee: Option<Decimal>,
    pub memo: String,
    pub photo_url: Option<String>,
    pub reference_number: Option<String>,
    pub success: Option<bool>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Initial form of a ledger row: everything known before the billing backend
/// assigns its own fields. `success` stays NULL until the row is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub id: Uuid,
    pub external_number: String,
    pub customer_id: String,
    pub account_ban: String,
    pub bill_period: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub lcy_amount: Decimal,
    pub fee: Decimal,
    pub memo: String,
    pub photo_url: Option<String>,
}

impl From<&TxRequest> for InsertTransactionEntity {
    fn from(request: &TxRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_number: request.external_id.clone(),
            customer_id: request.customer.id.clone(),
            account_ban: request.account.ban.clone(),
            bill_period: request.customer.time,
            amount: request.amount,
            lcy_amount: request.lcy_amount,
            fee: request.fee,
            memo: request.memo.clone(),
            photo_url: request.photo_url.clone(),
        }
    }
}
