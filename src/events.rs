use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Events published after successful account and catalog mutations.
///
/// Account events carry the login id; product events carry the SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    AccountCreated(i32),
    ProfileUpdated(i32),
    PasswordChanged(i32),

    ProductAdded(String),
    ProductUpdated(String),
    ProductDeleted(String),
    CategoryCreated(i32),
    CategoryRemoved(i32),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel. Callers spawn this next to the services; it
/// runs until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "processing event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender.send(Event::AccountCreated(1)).await;
        assert!(result.is_err());
    }

    #[test]
    fn events_serialize_with_their_payload() {
        let json = serde_json::to_string(&Event::ProductAdded("SKU-1".to_string()))
            .expect("serialize event");
        assert_eq!(json, r#"{"ProductAdded":"SKU-1"}"#);
    }
}
