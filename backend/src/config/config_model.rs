use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub billing: BillingBackend,
    pub status: StatusSettings,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub statement_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct BillingBackend {
    pub base_url: Url,
    pub api_key: String,
    pub secret_key: String,
    pub hmac_key: String,
    /// Upper bound for a single call to the billing backend.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StatusSettings {
    /// Domain stamped on `ErrorInfo` status details.
    pub domain: String,
}
