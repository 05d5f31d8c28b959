use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::KrakenCredentials;
use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::errors::GatewayError;
use crate::errors::Result;
use crate::gateway::ExchangeGateway;

const KRAKEN_BASE_URL: &str = "https://api.kraken.com";
const API_VERSION: u8 = 0;

/// Kraken REST client implementing [`ExchangeGateway`]
pub struct KrakenClient {
    client: HttpClient,
    base_url: String,
    credentials: Option<KrakenCredentials>,
    last_nonce: AtomicU64,
}

impl KrakenClient {
    /// Create a public-only client with default configuration
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> KrakenClientBuilder {
        KrakenClientBuilder::default()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Millisecond nonce, strictly increasing even for calls within the same millisecond
    fn next_nonce(&self) -> u64 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_millis() as u64).unwrap_or_default();
        let previous = self
            .last_nonce
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Send the request and unwrap Kraken's `{error, result}` envelope
    async fn dispatch(&self, method: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<Envelope>(&bytes) {
            Ok(envelope) => {
                let result = envelope.into_result();
                if let Err(GatewayError::Exchange(errors)) = &result {
                    tracing::warn!(method, ?errors, "Kraken rejected request");
                }
                result
            }
            Err(_) if !status.is_success() => Err(GatewayError::InvalidResponse(format!("HTTP {status}"))),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ExchangeGateway for KrakenClient {
    async fn query_public(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{API_VERSION}/public/{method}", self.base_url);
        tracing::debug!(method, "Kraken public query");

        self.dispatch(method, self.client.post(&url).form(params)).await
    }

    async fn query_private(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| GatewayError::AuthenticationFailed("no API credentials configured".to_string()))?;

        let uri_path = format!("/{API_VERSION}/private/{method}");
        let nonce = self.next_nonce();
        let post_data = encode_form(nonce, params);
        let signature = credentials.sign(&uri_path, nonce, &post_data)?;
        tracing::debug!(method, nonce, "Kraken private query");

        let request = self
            .client
            .post(&format!("{}{uri_path}", self.base_url))
            .header("API-Key", credentials.api_key())
            .header("API-Sign", signature)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(post_data);

        self.dispatch(method, request).await
    }
}

/// Builder for configuring the Kraken client
pub struct KrakenClientBuilder {
    http_config: HttpClientConfig,
    base_url: String,
    credentials: Option<KrakenCredentials>,
}

impl Default for KrakenClientBuilder {
    fn default() -> Self {
        Self { http_config: HttpClientConfig::default(), base_url: KRAKEN_BASE_URL.to_string(), credentials: None }
    }
}

impl KrakenClientBuilder {
    /// Set custom base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Configure HTTP client settings
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set API credentials for private endpoints
    pub fn credentials(mut self, credentials: KrakenCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the Kraken client
    pub fn build(self) -> Result<KrakenClient> {
        let client = HttpClient::with_config(self.http_config)?;

        Ok(KrakenClient { client, base_url: self.base_url, credentials: self.credentials, last_nonce: AtomicU64::new(0) })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Vec<String>,
    result: Option<Value>,
}

impl Envelope {
    fn into_result(self) -> Result<Value> {
        if !self.error.is_empty() {
            return Err(GatewayError::Exchange(self.error));
        }
        self.result.ok_or_else(|| GatewayError::InvalidResponse("response carries neither error nor result".to_string()))
    }
}

/// Form body for a private call; the nonce always leads
fn encode_form(nonce: u64, params: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("nonce", &nonce.to_string());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
