use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The paying bank account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub cif: String,
    pub ban: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency: String,
}

/// The water utility customer owning the bill.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub province_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Province {
    pub id: String,
    pub name: String,
}

/// Point-in-time amount due for an account/customer pair. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BillInfo {
    pub account: Account,
    pub customer: Customer,
    pub amount: Decimal,
    pub lcy_amount: Decimal,
    pub fee: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoRequest {
    pub account: Account,
    pub customer: Customer,
}

impl InfoRequest {
    /// Names of the fields that fail validation; empty when the request is valid.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.account.ban.is_empty() {
            invalid.push("account.ban");
        }
        if self.account.currency.is_empty() {
            invalid.push("account.currency");
        }
        if self.customer.id.is_empty() {
            invalid.push("customer.id");
        }
        if self.customer.province_id.is_empty() {
            invalid.push("customer.provinceId");
        }
        invalid
    }
}

/// A bill payment as submitted by the caller. `external_id` is the caller's
/// idempotency key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TxRequest {
    pub external_id: String,
    pub account: Account,
    pub customer: Customer,
    pub amount: Decimal,
    pub lcy_amount: Decimal,
    pub fee: Decimal,
    pub memo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl TxRequest {
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.account.display_name.is_empty() {
            invalid.push("account.displayName");
        }
        if self.account.ban.is_empty() {
            invalid.push("account.ban");
        }
        if self.account.currency.is_empty() {
            invalid.push("account.currency");
        }
        if self.customer.id.is_empty() {
            invalid.push("customer.id");
        }
        if self.customer.province_id.is_empty() {
            invalid.push("customer.provinceId");
        }
        if self.external_id.is_empty() {
            invalid.push("externalId");
        }
        if self.amount <= Decimal::ZERO {
            invalid.push("amount");
        }
        if self.lcy_amount <= Decimal::ZERO {
            invalid.push("lcyAmount");
        }
        if self.fee < Decimal::ZERO {
            invalid.push("fee");
        }
        invalid
    }
}

/// What the billing backend answers for an executed payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TxReceipt {
    pub id: String,
    pub external_id: String,
    pub lcy_fee: Decimal,
    pub customer: Customer,
}

/// The finalized payment returned to callers once the ledger agrees with the
/// billing backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: String,
    pub external_id: String,
    pub account: Account,
    pub customer: Customer,
    pub amount: Decimal,
    pub lcy_amount: Decimal,
    pub fee: Decimal,
    pub lcy_fee: Decimal,
    pub memo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn settled(request: TxRequest, receipt: TxReceipt, created_at: DateTime<Utc>) -> Self {
        let mut customer = request.customer;
        if let Some(display_name) = receipt.customer.display_name {
            customer.display_name = Some(display_name);
        }

        Self {
            id: receipt.id,
            external_id: request.external_id,
            account: request.account,
            customer,
            amount: request.amount,
            lcy_amount: request.lcy_amount,
            fee: request.fee,
            lcy_fee: receipt.lcy_fee,
            memo: request.memo,
            photo_url: request.photo_url,
            success: true,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_request() -> TxRequest {
        TxRequest {
            external_id: "ext-001".to_string(),
            account: Account {
                cif: "0001".to_string(),
                ban: "010120000001".to_string(),
                display_name: "Somchai".to_string(),
                account_type: "SAVING".to_string(),
                currency: "LAK".to_string(),
            },
            customer: Customer {
                id: "C-123".to_string(),
                province_id: "01".to_string(),
                display_name: None,
                time: None,
            },
            amount: dec!(150000),
            lcy_amount: dec!(150000),
            fee: dec!(0),
            memo: "water bill".to_string(),
            photo_url: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().invalid_fields().is_empty());
    }

    #[test]
    fn missing_bank_account_number_is_rejected() {
        let mut request = valid_request();
        request.account.ban.clear();
        assert_eq!(request.invalid_fields(), vec!["account.ban"]);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut request = valid_request();
        request.amount = dec!(0);
        request.lcy_amount = dec!(-1);
        assert_eq!(request.invalid_fields(), vec!["amount", "lcyAmount"]);
    }

    #[test]
    fn negative_fee_is_rejected_but_zero_fee_is_fine() {
        let mut request = valid_request();
        request.fee = dec!(-0.01);
        assert!(!request.invalid_fields().is_empty());

        request.fee = dec!(0);
        assert!(request.invalid_fields().is_empty());
    }

    #[test]
    fn info_request_requires_customer_and_province() {
        let request = InfoRequest {
            account: valid_request().account,
            customer: Customer::default(),
        };
        assert_eq!(
            request.invalid_fields(),
            vec!["customer.id", "customer.provinceId"]
        );
    }

    #[test]
    fn tx_request_binds_from_camel_case_json() {
        let request: TxRequest = serde_json::from_str(
            r#"{
                "externalId": "ext-9",
                "account": {"ban": "0101", "currency": "LAK", "displayName": "A", "type": "SAVING"},
                "customer": {"id": "C-1", "provinceId": "02"},
                "amount": "1000.50",
                "lcyAmount": 1000.5,
                "fee": "0",
                "memo": "m"
            }"#,
        )
        .unwrap();

        assert_eq!(request.external_id, "ext-9");
        assert_eq!(request.account.account_type, "SAVING");
        assert_eq!(request.amount, dec!(1000.50));
        assert!(request.invalid_fields().is_empty());
    }

    #[test]
    fn settled_transaction_prefers_backend_display_name() {
        let request = valid_request();
        let receipt = TxReceipt {
            id: "REF-1".to_string(),
            external_id: request.external_id.clone(),
            lcy_fee: dec!(2000),
            customer: Customer {
                display_name: Some("Nang Keo".to_string()),
                ..request.customer.clone()
            },
        };

        let settled = PaymentTransaction::settled(request, receipt, Utc::now());

        assert!(settled.success);
        assert_eq!(settled.id, "REF-1");
        assert_eq!(settled.lcy_fee, dec!(2000));
        assert_eq!(settled.customer.display_name.as_deref(), Some("Nang Keo"));
    }
}
