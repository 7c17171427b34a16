//! Best-effort domain event publishing over NATS.

use tracing::{debug, info, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    /// Connects when a URL is configured. A failed connection disables publishing instead of failing startup.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                info!(url, "connected to NATS");
                Self { nats: Some(client) }
            }
            Err(e) => {
                warn!(url, error = %e, "NATS unavailable, events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self { Self { nats: None } }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.nats else { return };
        let subject = event.subject();
        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => {
                warn!(subject, error = %e, "could not encode event");
                return;
            }
        };
        match client.publish(subject.clone(), payload.into()).await {
            Ok(()) => debug!(subject, "published event"),
            Err(e) => warn!(subject, error = %e, "publishing event failed"),
        }
    }

    pub async fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in &events {
            self.publish(event).await;
        }
    }
}
