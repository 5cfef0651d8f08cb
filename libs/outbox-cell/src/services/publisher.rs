// libs/outbox-cell/src/services/publisher.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_models::OutboxEvent;
use shared_store::ScheduleStore;

use crate::models::OutboxError;

/// Downstream consumer of booking events. Delivery is at-least-once;
/// receivers deduplicate on `event_id`.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &OutboxEvent) -> Result<(), OutboxError>;
}

/// Posts each event as JSON to the hospital documents service.
pub struct HttpEventSink {
    client: Client,
    endpoint: String,
}

impl HttpEventSink {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.documents_service_url.clone(),
        }
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn deliver(&self, event: &OutboxEvent) -> Result<(), OutboxError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| OutboxError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OutboxError::Delivery(format!(
                "sink returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Tails the outbox log and pushes events to the sink in sequence order.
///
/// The cursor only advances after a successful delivery, so a failed or
/// crashed push re-delivers from the last acknowledged event. Publishing
/// never blocks booking commits; it reads the log after the fact.
pub struct OutboxPublisher {
    store: Arc<dyn ScheduleStore>,
    sink: Arc<dyn EventSink>,
    poll_interval: Duration,
    batch_size: usize,
    cursor: AtomicU64,
    is_shutdown: tokio::sync::RwLock<bool>,
}

impl OutboxPublisher {
    pub fn new(store: Arc<dyn ScheduleStore>, sink: Arc<dyn EventSink>, config: &AppConfig) -> Self {
        Self {
            store,
            sink,
            poll_interval: Duration::from_secs(config.outbox_poll_interval_secs),
            batch_size: config.outbox_publish_batch,
            cursor: AtomicU64::new(0),
            is_shutdown: tokio::sync::RwLock::new(false),
        }
    }

    /// Sequence of the last event the sink has acknowledged.
    pub fn published_cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    pub async fn shutdown(&self) {
        info!("Outbox publisher shutting down");
        *self.is_shutdown.write().await = true;
    }

    pub async fn run(&self) {
        info!(
            "Outbox publisher started (poll every {:?}, batch {})",
            self.poll_interval, self.batch_size
        );

        loop {
            if *self.is_shutdown.read().await {
                debug!("Outbox publisher stopped");
                break;
            }

            if let Err(e) = self.drain_once().await {
                warn!("Outbox drain interrupted: {}", e);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One poll cycle: read the next batch past the cursor and push events
    /// in order until the batch is done or a delivery fails. Stops at the
    /// first failure to preserve ordering for the retry.
    pub async fn drain_once(&self) -> Result<usize, OutboxError> {
        let after = self.cursor.load(Ordering::Acquire);
        let pending = self.store.events_after(after, self.batch_size).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut delivered = 0;
        for event in &pending {
            match self.sink.deliver(event).await {
                Ok(()) => {
                    self.cursor.store(event.sequence, Ordering::Release);
                    delivered += 1;
                    debug!(
                        "Published event {} (seq {}, kind {})",
                        event.event_id,
                        event.sequence,
                        event.payload.kind()
                    );
                }
                Err(e) => {
                    error!(
                        "Delivery failed for event {} (seq {}): {}",
                        event.event_id, event.sequence, e
                    );
                    return Err(e);
                }
            }
        }

        Ok(delivered)
    }
}
