use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use crates::{
    billing::tapwater_client::TapWaterClient,
    domain::{
        repositories::tapwater_ledger::TapWaterLedgerRepository,
        value_objects::tapwater::{
            BillInfo, InfoRequest, PaymentTransaction, Province, TxReceipt, TxRequest,
        },
    },
};
use tracing::{error, info, warn};

use super::{billing_errors::BillingError, payment_commit::PaymentCommitCoordinator};

/// Backend error texts meaning the account/customer pair has no bill.
const NO_INFO_PATTERNS: [&str; 2] = ["invalid customer no", "invalid province no"];
/// Backend error text meaning the bill must be paid in local currency.
const CURRENCY_NOT_ALLOWED_PATTERN: &str = "account currency not allow";

/// Outbound seam to the billing backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TapWaterGateway: Send + Sync {
    async fn provinces(&self) -> AnyResult<Vec<Province>>;

    async fn info(&self, query: &InfoRequest) -> AnyResult<BillInfo>;

    async fn do_tx(&self, query: &TxRequest) -> AnyResult<TxReceipt>;
}

#[async_trait]
impl TapWaterGateway for TapWaterClient {
    async fn provinces(&self) -> AnyResult<Vec<Province>> {
        self.provinces().await
    }

    async fn info(&self, query: &InfoRequest) -> AnyResult<BillInfo> {
        self.info(query).await
    }

    async fn do_tx(&self, query: &TxRequest) -> AnyResult<TxReceipt> {
        self.do_tx(query).await
    }
}

/// Classifies a billing backend failure by its free-text message.
///
/// The backend has no structured error codes, so this matching is the whole
/// contract; anything unrecognised stays opaque.
pub fn translate_backend_error(err: anyhow::Error) -> BillingError {
    let text = format!("{err:#}").to_lowercase();

    if NO_INFO_PATTERNS.iter().any(|pattern| text.contains(pattern)) {
        return BillingError::NoInfoFound;
    }
    if text.contains(CURRENCY_NOT_ALLOWED_PATTERN) {
        return BillingError::CurrencyNotAllowed;
    }

    BillingError::Opaque(err)
}

/// Runs a billing backend call under `deadline`; an elapsed deadline is an
/// ordinary backend failure.
pub(crate) async fn within_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = AnyResult<T>>,
) -> AnyResult<T> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "billing backend did not answer within {}s",
            deadline.as_secs_f32()
        )),
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BillingError>;

pub struct TapWaterUseCase<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    gateway: Arc<G>,
    coordinator: PaymentCommitCoordinator<G, L>,
    gateway_timeout: Duration,
}

impl<G, L> TapWaterUseCase<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    pub fn new(gateway: Arc<G>, ledger_repo: Arc<L>, gateway_timeout: Duration) -> Self {
        Self {
            coordinator: PaymentCommitCoordinator::new(
                Arc::clone(&gateway),
                ledger_repo,
                gateway_timeout,
            ),
            gateway,
            gateway_timeout,
        }
    }

    pub async fn list_provinces(&self) -> UseCaseResult<Vec<Province>> {
        let provinces = within_deadline(self.gateway_timeout, self.gateway.provinces())
            .await
            .map_err(|err| {
                error!(error = ?err, "tapwater: failed to list provinces");
                BillingError::Opaque(err)
            })?;

        info!(province_count = provinces.len(), "tapwater: provinces loaded");
        Ok(provinces)
    }

    pub async fn fetch_info(&self, request: InfoRequest) -> UseCaseResult<BillInfo> {
        let invalid_fields = request.invalid_fields();
        if !invalid_fields.is_empty() {
            warn!(?invalid_fields, "tapwater: info request rejected");
            return Err(BillingError::ValidationFailed);
        }

        info!(
            customer_id = %request.customer.id,
            province_id = %request.customer.province_id,
            "tapwater: fetching bill info"
        );

        within_deadline(self.gateway_timeout, self.gateway.info(&request))
            .await
            .map_err(|err| {
                let translated = translate_backend_error(err);
                match &translated {
                    BillingError::Opaque(err) => {
                        error!(error = ?err, customer_id = %request.customer.id, "tapwater: bill info lookup failed")
                    }
                    other => {
                        info!(customer_id = %request.customer.id, reason = %other, "tapwater: bill info unavailable")
                    }
                }
                translated
            })
    }

    pub async fn submit_payment(&self, request: TxRequest) -> UseCaseResult<PaymentTransaction> {
        let invalid_fields = request.invalid_fields();
        if !invalid_fields.is_empty() {
            warn!(
                external_id = %request.external_id,
                ?invalid_fields,
                "tapwater: payment request rejected"
            );
            return Err(BillingError::ValidationFailed);
        }

        self.coordinator.commit(request).await
    }
}
