use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub account_service_url: String,
    pub documents_service_url: String,
    pub max_booking_hours: i64,
    pub outbox_poll_interval_secs: u64,
    pub outbox_publish_batch: usize,
    pub storage_retry_attempts: u32,
    pub storage_retry_base_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            account_service_url: env::var("ACCOUNT_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("ACCOUNT_SERVICE_URL not set, using empty value");
                    String::new()
                }),
            documents_service_url: env::var("DOCUMENTS_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCUMENTS_SERVICE_URL not set, using empty value");
                    String::new()
                }),
            max_booking_hours: env::var("MAX_BOOKING_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            outbox_poll_interval_secs: env::var("OUTBOX_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            outbox_publish_batch: env::var("OUTBOX_PUBLISH_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32),
            storage_retry_attempts: env::var("STORAGE_RETRY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            storage_retry_base_ms: env::var("STORAGE_RETRY_BASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.account_service_url.is_empty() && !self.documents_service_url.is_empty()
    }
}
