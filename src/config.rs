use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: IpAddr,
    pub port: u16,

    // Outbound requests
    pub request_timeout: Duration,
    pub user_agent: String,

    // Endpoints, in fallback order
    pub signed_endpoint_url: String,
    pub webapp_endpoint_url: String,
    pub fallback_endpoint_url: String,

    // Signing
    pub token_seed_url: String,
    pub webapp_referer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            signed_endpoint_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            webapp_endpoint_url: "https://translate.google.com/translate_a/single".to_string(),
            fallback_endpoint_url: "https://clients5.google.com/translate_a/single".to_string(),
            token_seed_url: "https://translate.google.com".to_string(),
            webapp_referer: "https://translate.google.com/".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            // Server
            host: parse_var("HOST")?.unwrap_or(defaults.host),
            port: parse_var("PORT")?.unwrap_or(defaults.port),

            // Outbound requests
            request_timeout: parse_var("REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            user_agent: std::env::var("USER_AGENT").unwrap_or(defaults.user_agent),

            // Endpoints
            signed_endpoint_url: std::env::var("SIGNED_ENDPOINT_URL")
                .unwrap_or(defaults.signed_endpoint_url),
            webapp_endpoint_url: std::env::var("WEBAPP_ENDPOINT_URL")
                .unwrap_or(defaults.webapp_endpoint_url),
            fallback_endpoint_url: std::env::var("FALLBACK_ENDPOINT_URL")
                .unwrap_or(defaults.fallback_endpoint_url),

            // Signing
            token_seed_url: std::env::var("TOKEN_SEED_URL").unwrap_or(defaults.token_seed_url),
            webapp_referer: std::env::var("WEBAPP_REFERER").unwrap_or(defaults.webapp_referer),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read and parse an optional variable; a present but unparsable value is an error.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: '{}'", name, value)),
        Err(_) => Ok(None),
    }
}
