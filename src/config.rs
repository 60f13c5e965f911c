use std::env;

/// Gateway-hosted receipt URL. `{entity.uid}` and `{payment.id}` are
/// substituted with values from the webhook.
pub const DEFAULT_COUPON_URL: &str =
    "https://mobbex.com/console/{entity.uid}/operations/?oid={payment.id}";

/// Base URL for the Mobbex API.
pub const DEFAULT_API_URL: &str = "https://api.mobbex.com/p/";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,

    /// Whether the integration is enabled. Capture and gateway reads
    /// refuse to run while disabled.
    pub enabled: bool,
    pub api_key: String,
    pub access_token: String,

    /// Mobbex API base URL (overridable for tests).
    pub api_url: String,
    /// Coupon URL template with `{entity.uid}` / `{payment.id}` placeholders.
    pub coupon_url: String,

    /// Where shoppers land after a successful payment. `{order_id}` is
    /// substituted with the order id.
    pub order_received_url: String,
    /// Where shoppers are sent back on failure. An error notice is appended
    /// as a query parameter.
    pub cart_url: String,

    /// Optional URL that receives a fire-and-forget event after each
    /// processed parent webhook.
    pub forward_webhook_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let enabled = env::var("MOBBEX_ENABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "mobbex_relay.db".to_string()),
            enabled,
            api_key: env::var("MOBBEX_API_KEY").unwrap_or_default(),
            access_token: env::var("MOBBEX_ACCESS_TOKEN").unwrap_or_default(),
            api_url: env::var("MOBBEX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            coupon_url: env::var("MOBBEX_COUPON_URL")
                .unwrap_or_else(|_| DEFAULT_COUPON_URL.to_string()),
            order_received_url: env::var("ORDER_RECEIVED_URL")
                .unwrap_or_else(|_| "/order-received/{order_id}".to_string()),
            cart_url: env::var("CART_URL").unwrap_or_else(|_| "/cart".to_string()),
            forward_webhook_url: env::var("FORWARD_WEBHOOK_URL").ok(),
        }
    }

    /// The integration is ready once it is enabled and both credentials are
    /// configured. Token checks are meaningless before this holds.
    pub fn is_ready(&self) -> bool {
        self.enabled && !self.api_key.is_empty() && !self.access_token.is_empty()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
