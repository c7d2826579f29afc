use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use tracing::{debug, error};
use url::Url;

use crate::domain::value_objects::tapwater::{
    BillInfo, InfoRequest, Province, TxReceipt, TxRequest,
};

type HmacSha256 = Hmac<Sha256>;

const API_KEY_HEADER: &str = "X-Api-Key";
const SECRET_KEY_HEADER: &str = "X-Secret-Key";
const SIGNATURE_HEADER: &str = "X-Signature";

#[derive(Debug, Clone)]
pub struct TapWaterClientConfig {
    pub base_url: Url,
    pub api_key: String,
    pub secret_key: String,
    pub hmac_key: Vec<u8>,
    pub connect_timeout: Duration,
}

/// HTTP client for the bank's tap water billing backend.
///
/// The backend reports failures only as free text; non-2xx answers are turned
/// into errors whose message is the backend's own text so callers can
/// classify them.
pub struct TapWaterClient {
    http: reqwest::Client,
    config: TapWaterClientConfig,
}

#[derive(Debug, Deserialize)]
struct ProvincesEnvelope {
    provinces: Vec<Province>,
}

#[derive(Debug, Deserialize)]
struct InfoEnvelope {
    info: BillInfo,
}

#[derive(Debug, Deserialize)]
struct TransactionEnvelope {
    transaction: TxReceipt,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BackendErrorBody {
    Nested { error: BackendErrorDetails },
    Flat(BackendErrorDetails),
}

#[derive(Debug, Deserialize)]
struct BackendErrorDetails {
    message: String,
}

impl TapWaterClient {
    pub fn new(config: TapWaterClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .context("failed to build tapwater http client")?;

        Ok(Self { http, config })
    }

    pub async fn provinces(&self) -> Result<Vec<Province>> {
        let envelope: ProvincesEnvelope = self.get("v1/tapwater/provinces").await?;
        Ok(envelope.provinces)
    }

    pub async fn info(&self, query: &InfoRequest) -> Result<BillInfo> {
        let envelope: InfoEnvelope = self.post("v1/tapwater/info", query).await?;
        Ok(envelope.info)
    }

    pub async fn do_tx(&self, query: &TxRequest) -> Result<TxReceipt> {
        let envelope: TransactionEnvelope = self.post("v1/tapwater/transactions", query).await?;
        Ok(envelope.transaction)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.base_url.join(path)?;
        debug!(%url, "tapwater backend request");

        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(SECRET_KEY_HEADER, &self.config.secret_key)
            .header(SIGNATURE_HEADER, sign(&self.config.hmac_key, path.as_bytes())?)
            .send()
            .await?;

        let resp = Self::ensure_success(resp, path).await?;
        Ok(resp.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.base_url.join(path)?;
        let payload = serde_json::to_vec(body)?;
        debug!(%url, "tapwater backend request");

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(SECRET_KEY_HEADER, &self.config.secret_key)
            .header(SIGNATURE_HEADER, sign(&self.config.hmac_key, &payload)?)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let resp = Self::ensure_success(resp, path).await?;
        Ok(resp.json().await?)
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let message = backend_error_message(&body);
        error!(
            status = %status,
            context = %context,
            backend_message = %message,
            "tapwater backend request failed"
        );

        anyhow::bail!("{message} (status {status}, {context})");
    }
}

/// Extracts the backend's free-text error from a response body, falling back
/// to the raw body when it is not one of the known JSON shapes.
pub fn backend_error_message(body: &str) -> String {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(BackendErrorBody::Nested { error }) => error.message,
        Ok(BackendErrorBody::Flat(details)) => details.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Hex encoded HMAC-SHA256 of `payload`.
pub fn sign(key: &[u8], payload: &[u8]) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| anyhow!("invalid hmac key: {err}"))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
