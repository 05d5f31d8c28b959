pub mod auth;
pub mod client;
pub mod endpoints;
pub mod errors;
pub mod gateway;
pub mod kraken;
pub mod models;

pub use auth::KrakenCredentials;
pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use endpoints::KrakenEndpoints;
pub use errors::GatewayError;
pub use errors::Result;
pub use gateway::ExchangeGateway;
pub use kraken::KrakenClient;
pub use kraken::KrakenClientBuilder;
