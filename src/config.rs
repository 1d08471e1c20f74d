use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the gateway.
///
/// Loaded once at startup and passed into the engine, oracle client and
/// dispatcher constructors. Nothing here is process-global, so tests can
/// build a config by hand and inject it alongside fake ports.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Base URL callers use to reach the gateway; embedded in `payment_url`.
    pub public_base_url: String,
    /// Merchant id registered with the settlement authority.
    pub merchant_id: String,
    /// Payee VPA embedded in the payment descriptor.
    pub merchant_vpa: String,
    /// Payee display name embedded in the payment descriptor.
    pub merchant_name: String,
    /// Base URL of the settlement authority's order-status endpoint.
    pub oracle_base_url: String,
    /// Timeout for a single oracle round-trip.
    pub oracle_timeout: Duration,
    /// How long a PENDING order stays findable (the payment window).
    pub pending_ttl: Duration,
    /// How long a terminal order stays findable for result polling.
    pub terminal_ttl: Duration,
    /// Depth of the webhook delivery queue.
    pub webhook_queue_depth: usize,
    /// Timeout for a single webhook delivery attempt.
    pub webhook_timeout: Duration,
}

impl GatewayConfig {
    /// Builds a config from environment variables, falling back to the
    /// defaults below for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port: u16 = env_or("PORT", defaults.bind_addr.port());
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            public_base_url: env_or_string("PUBLIC_BASE_URL", &defaults.public_base_url),
            merchant_id: env_or_string("PAYTM_MID", &defaults.merchant_id),
            merchant_vpa: env_or_string("UPI_VPA", &defaults.merchant_vpa),
            merchant_name: env_or_string("MERCHANT_NAME", &defaults.merchant_name),
            oracle_base_url: env_or_string("ORACLE_BASE_URL", &defaults.oracle_base_url),
            pending_ttl: Duration::from_secs(env_or(
                "ORDER_PENDING_TTL_SECS",
                defaults.pending_ttl.as_secs(),
            )),
            terminal_ttl: Duration::from_secs(env_or(
                "ORDER_TERMINAL_TTL_SECS",
                defaults.terminal_ttl.as_secs(),
            )),
            ..defaults
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            public_base_url: "http://localhost:3000".to_string(),
            merchant_id: "TESTMID00000000000000".to_string(),
            merchant_vpa: "merchant@upi".to_string(),
            merchant_name: "Gateway Demo".to_string(),
            oracle_base_url: "https://securegw.paytm.in".to_string(),
            oracle_timeout: Duration::from_secs(10),
            pending_ttl: Duration::from_secs(1800),
            terminal_ttl: Duration::from_secs(600),
            webhook_queue_depth: 256,
            webhook_timeout: Duration::from_secs(10),
        }
    }
}

fn env_or_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
