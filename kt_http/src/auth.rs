//! Kraken API credentials and request signing
//!
//! `API-Sign` is HMAC-SHA512 over `uri_path ++ SHA256(nonce ++ post_data)`,
//! keyed with the base64-decoded API secret, and sent base64-encoded.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha512;

use crate::errors::GatewayError;
use crate::errors::Result;

type HmacSha512 = Hmac<Sha512>;

/// Kraken API key and decoded secret
#[derive(Clone)]
pub struct KrakenCredentials {
    api_key: String,
    secret: Vec<u8>,
}

impl KrakenCredentials {
    /// Create credentials from the API key and the base64 secret shown by Kraken
    pub fn new(api_key: impl Into<String>, secret_base64: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::AuthenticationFailed("API key is empty".to_string()));
        }

        let secret = STANDARD
            .decode(secret_base64.trim())
            .map_err(|err| GatewayError::AuthenticationFailed(format!("API secret is not valid base64: {err}")))?;

        Ok(Self { api_key: api_key.trim().to_string(), secret })
    }

    /// Load credentials from `KRAKEN_API_KEY` and `KRAKEN_API_SECRET`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("KRAKEN_API_KEY")
            .map_err(|_| GatewayError::AuthenticationFailed("KRAKEN_API_KEY not set".to_string()))?;
        let secret = std::env::var("KRAKEN_API_SECRET")
            .map_err(|_| GatewayError::AuthenticationFailed("KRAKEN_API_SECRET not set".to_string()))?;

        Self::new(api_key, &secret)
    }

    /// Load credentials from a key file: API key on the first line, secret on the second
    pub fn from_key_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|err| GatewayError::AuthenticationFailed(format!("cannot read {}: {err}", path.display())))?;

        let mut lines = contents.lines().map(str::trim).filter(|line| !line.is_empty());
        match (lines.next(), lines.next()) {
            (Some(api_key), Some(secret)) => Self::new(api_key, secret),
            _ => Err(GatewayError::AuthenticationFailed(format!("{} must contain the API key and secret on two lines", path.display()))),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Compute the `API-Sign` header for a private request
    pub fn sign(&self, uri_path: &str, nonce: u64, post_data: &str) -> Result<String> {
        let mut sha = Sha256::new();
        sha.update(nonce.to_string().as_bytes());
        sha.update(post_data.as_bytes());
        let digest = sha.finalize();

        let mut mac = HmacSha512::new_from_slice(&self.secret)
            .map_err(|err| GatewayError::AuthenticationFailed(format!("invalid secret length: {err}")))?;
        mac.update(uri_path.as_bytes());
        mac.update(&digest);

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for KrakenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrakenCredentials").field("api_key", &self.api_key).field("secret", &"<redacted>").finish()
    }
}
