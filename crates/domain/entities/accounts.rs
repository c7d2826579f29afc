use diesel::prelude::*;

use crate::{domain::value_objects::tapwater::Account, infra::db::postgres::schema::accounts};

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = accounts)]
pub struct InsertAccountEntity {
    pub ban: String,
    pub cif: String,
    pub display_name: String,
    pub type_: String,
    pub currency: String,
}

impl From<&Account> for InsertAccountEntity {
    fn from(account: &Account) -> Self {
        Self {
            ban: account.ban.clone(),
            cif: account.cif.clone(),
            display_name: account.display_name.clone(),
            type_: account.account_type.clone(),
            currency: account.currency.clone(),
        }
    }
}
