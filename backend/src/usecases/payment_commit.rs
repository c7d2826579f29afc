use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use crates::domain::{
    repositories::tapwater_ledger::{LedgerError, TapWaterLedgerRepository},
    value_objects::{
        enums::payment_states::PaymentState,
        tapwater::{PaymentTransaction, TxRequest},
        tapwater_ledger::{LedgerEntry, LedgerOutcome},
    },
};
use tracing::{debug, error, info, warn};

use super::{
    billing_errors::BillingError,
    tapwater::{TapWaterGateway, translate_backend_error, within_deadline},
};

/// Executes a payment against the billing backend, then records its outcome
/// in the local ledger.
///
/// The whole attempt runs on its own task: dropping the caller's future
/// (client disconnect, request timeout) leaves an in-flight payment to finish
/// and be recorded. The ledger write starts only once the backend outcome is
/// known. The backend call is never retried.
pub struct PaymentCommitCoordinator<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    gateway: Arc<G>,
    ledger_repo: Arc<L>,
    gateway_timeout: Duration,
}

impl<G, L> PaymentCommitCoordinator<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    pub fn new(gateway: Arc<G>, ledger_repo: Arc<L>, gateway_timeout: Duration) -> Self {
        Self {
            gateway,
            ledger_repo,
            gateway_timeout,
        }
    }

    pub async fn commit(&self, request: TxRequest) -> Result<PaymentTransaction, BillingError> {
        let external_id = request.external_id.clone();
        let attempt = settle(
            Arc::clone(&self.gateway),
            Arc::clone(&self.ledger_repo),
            self.gateway_timeout,
            request,
        );

        tokio::spawn(attempt).await.unwrap_or_else(|err| {
            error!(
                %external_id,
                error = %err,
                "payment_commit: payment task did not complete"
            );
            Err(BillingError::Opaque(anyhow!(
                "payment task for {external_id} did not complete: {err}"
            )))
        })
    }
}

async fn settle<G, L>(
    gateway: Arc<G>,
    ledger_repo: Arc<L>,
    gateway_timeout: Duration,
    request: TxRequest,
) -> Result<PaymentTransaction, BillingError>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    let external_id = request.external_id.clone();
    debug!(
        %external_id,
        state = %PaymentState::Submitted,
        "payment_commit: submitting payment to billing backend"
    );

    let external = within_deadline(gateway_timeout, gateway.do_tx(&request)).await;

    let outcome = match &external {
        Ok(receipt) => {
            info!(
                %external_id,
                reference_number = %receipt.id,
                state = %PaymentState::ExternalAccepted,
                "payment_commit: billing backend accepted payment"
            );
            LedgerOutcome::accepted(receipt)
        }
        Err(err) => {
            warn!(
                %external_id,
                error = %format!("{err:#}"),
                "payment_commit: billing backend rejected payment"
            );
            LedgerOutcome::Rejected {
                reason: format!("{err:#}"),
            }
        }
    };

    let success = outcome.is_success();
    let persisted = ledger_repo
        .record_transaction(LedgerEntry::new(&request, outcome))
        .await;

    match (external, persisted) {
        (Ok(receipt), Ok(row)) => {
            info!(
                %external_id,
                ledger_id = %row.id,
                state = %PaymentState::Persisted { success },
                "payment_commit: payment recorded"
            );
            Ok(PaymentTransaction::settled(request, receipt, row.created_at))
        }
        (Err(err), Ok(row)) => {
            info!(
                %external_id,
                ledger_id = %row.id,
                state = %PaymentState::Persisted { success },
                "payment_commit: failed payment recorded"
            );
            Err(translate_backend_error(err))
        }
        (Ok(receipt), Err(LedgerError::DuplicateExternalId(_))) => {
            // The existing row does not describe this accepted payment.
            error!(
                %external_id,
                reference_number = %receipt.id,
                lcy_fee = %receipt.lcy_fee,
                ledger_inconsistency = true,
                "payment_commit: billing backend accepted an external id the ledger already holds"
            );
            let source = anyhow!("external id {external_id} already has a ledger row");
            Err(BillingError::LedgerInconsistency {
                external_id,
                reference_number: receipt.id,
                source,
            })
        }
        (Err(_), Err(LedgerError::DuplicateExternalId(_))) => {
            warn!(%external_id, "payment_commit: duplicate submission rejected");
            Err(BillingError::DuplicateTransaction)
        }
        (Ok(receipt), Err(LedgerError::Storage(source))) => {
            error!(
                %external_id,
                reference_number = %receipt.id,
                lcy_fee = %receipt.lcy_fee,
                ledger_inconsistency = true,
                error = %format!("{source:#}"),
                "payment_commit: money moved but ledger write failed"
            );
            Err(BillingError::LedgerInconsistency {
                external_id,
                reference_number: receipt.id,
                source,
            })
        }
        (Err(external_err), Err(LedgerError::Storage(source))) => {
            error!(
                %external_id,
                external_error = %format!("{external_err:#}"),
                error = %format!("{source:#}"),
                "payment_commit: failed payment could not be recorded"
            );
            Err(BillingError::Opaque(source.context(format!(
                "recording failed payment {external_id}"
            ))))
        }
    }
}
