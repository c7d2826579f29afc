use diesel::prelude::*;

use crate::{domain::value_objects::tapwater::Customer, infra::db::postgres::schema::customers};

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = customers)]
pub struct InsertCustomerEntity {
    pub id: String,
    pub province_id: String,
    pub display_name: Option<String>,
}

impl From<&Customer> for InsertCustomerEntity {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            province_id: customer.province_id.clone(),
            display_name: customer.display_name.clone(),
        }
    }
}
