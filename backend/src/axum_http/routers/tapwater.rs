use crate::{
    axum_http::status_responses::ApiError,
    config::config_model::DotEnvyConfig,
    usecases::{
        billing_errors::BillingError,
        tapwater::{TapWaterGateway, TapWaterUseCase},
    },
};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crates::{
    billing::tapwater_client::{TapWaterClient, TapWaterClientConfig},
    domain::{
        repositories::tapwater_ledger::TapWaterLedgerRepository,
        value_objects::{
            status_catalog::StatusCatalog,
            tapwater::{BillInfo, InfoRequest, PaymentTransaction, Province, TxRequest},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::tapwater_ledger::TapWaterLedgerPostgres,
    },
};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ProvincesResponse {
    pub provinces: Vec<Province>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub info: BillInfo,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction: PaymentTransaction,
}

pub struct TapWaterState<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    usecase: Arc<TapWaterUseCase<G, L>>,
    catalog: Arc<StatusCatalog>,
}

impl<G, L> Clone for TapWaterState<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            usecase: Arc::clone(&self.usecase),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<G, L> TapWaterState<G, L>
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    fn reject(&self, err: BillingError) -> Response {
        ApiError::new(Arc::clone(&self.catalog), err).into_response()
    }

    fn reject_body(&self, rejection: JsonRejection) -> Response {
        ApiError::from_rejection(Arc::clone(&self.catalog), rejection).into_response()
    }
}

pub fn routes(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    catalog: Arc<StatusCatalog>,
) -> Result<Router> {
    let billing = &config.billing;
    let tapwater_client = TapWaterClient::new(TapWaterClientConfig {
        base_url: billing.base_url.clone(),
        api_key: billing.api_key.clone(),
        secret_key: billing.secret_key.clone(),
        hmac_key: billing.hmac_key.as_bytes().to_vec(),
        connect_timeout: Duration::from_secs(billing.timeout_secs),
    })?;
    let ledger_repository = TapWaterLedgerPostgres::new(Arc::clone(&db_pool));

    let usecase = TapWaterUseCase::new(
        Arc::new(tapwater_client),
        Arc::new(ledger_repository),
        Duration::from_secs(billing.timeout_secs),
    );

    Ok(router(Arc::new(usecase), catalog))
}

pub fn router<G, L>(usecase: Arc<TapWaterUseCase<G, L>>, catalog: Arc<StatusCatalog>) -> Router
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/provinces", get(list_provinces))
        .route("/info", post(fetch_info))
        .route("/transactions", post(submit_payment))
        .with_state(TapWaterState { usecase, catalog })
}

pub async fn list_provinces<G, L>(State(state): State<TapWaterState<G, L>>) -> Response
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    match state.usecase.list_provinces().await {
        Ok(provinces) => Json(ProvincesResponse { provinces }).into_response(),
        Err(err) => state.reject(err),
    }
}

pub async fn fetch_info<G, L>(
    State(state): State<TapWaterState<G, L>>,
    body: Result<Json<InfoRequest>, JsonRejection>,
) -> Response
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return state.reject_body(rejection),
    };

    match state.usecase.fetch_info(request).await {
        Ok(info) => Json(InfoResponse { info }).into_response(),
        Err(err) => state.reject(err),
    }
}

pub async fn submit_payment<G, L>(
    State(state): State<TapWaterState<G, L>>,
    body: Result<Json<TxRequest>, JsonRejection>,
) -> Response
where
    G: TapWaterGateway + 'static,
    L: TapWaterLedgerRepository + Send + Sync + 'static,
{
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return state.reject_body(rejection),
    };

    info!(external_id = %request.external_id, "tapwater: payment request received");

    match state.usecase.submit_payment(request).await {
        Ok(transaction) => Json(TransactionResponse { transaction }).into_response(),
        Err(err) => state.reject(err),
    }
}
