use std::sync::Arc;

use tracing::{debug, warn};

use crate::event::LifecycleEvent;
use crate::traits::EventHandler;

/// Isolated delivery path for lifecycle events.
///
/// One channel exists per activated plugin, plus one shared master channel
/// for system-wide events. The subscriber list is populated during
/// activation and read-only afterward; delivery is strictly sequential in
/// subscription order.
pub struct PluginChannel {
    label: String,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl PluginChannel {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            handlers: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Register a handler. Only called while the channel is being built.
    pub fn subscribe(&mut self, handler: Arc<dyn EventHandler>) {
        debug!(channel = %self.label, handler = %handler.name(), "Handler subscribed");
        self.handlers.push(handler);
    }

    /// Deliver one event to every subscriber in order.
    ///
    /// Each handler runs to completion before the next starts. Failures are
    /// collected and returned; they never short-circuit the chain.
    pub async fn post(&self, event: &LifecycleEvent) -> Vec<anyhow::Error> {
        let mut failures = Vec::new();
        for handler in &self.handlers {
            debug!(
                channel = %self.label,
                handler = %handler.name(),
                kind = %event.kind,
                "Delivering event"
            );
            if let Err(e) = handler.handle(event).await {
                warn!(
                    channel = %self.label,
                    handler = %handler.name(),
                    error = %e,
                    "Handler failed"
                );
                failures.push(e.context(format!("handler {} failed", handler.name())));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Probe {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn handle(&self, _event: &LifecycleEvent) -> Result<()> {
            self.log.lock().unwrap().push(self.name.clone());
            if self.fail {
                Err(anyhow!("{} blew up", self.name))
            } else {
                Ok(())
            }
        }
    }

    fn probe(name: &str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<Probe> {
        Arc::new(Probe {
            name: name.into(),
            log: log.clone(),
            fail,
        })
    }

    #[tokio::test]
    async fn test_post_delivers_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = PluginChannel::new("alpha");
        channel.subscribe(probe("first", &log, false));
        channel.subscribe(probe("second", &log, false));
        channel.subscribe(probe("third", &log, false));

        let event = LifecycleEvent::new(EventKind::Init, serde_json::Value::Null);
        let failures = channel.post(&event).await;

        assert!(failures.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = PluginChannel::new("alpha");
        channel.subscribe(probe("ok", &log, false));
        channel.subscribe(probe("bad", &log, true));
        channel.subscribe(probe("after", &log, false));

        let event = LifecycleEvent::new(EventKind::Construct, serde_json::Value::Null);
        let failures = channel.post(&event).await;

        assert_eq!(failures.len(), 1);
        assert!(format!("{:#}", failures[0]).contains("bad blew up"));
        assert_eq!(*log.lock().unwrap(), vec!["ok", "bad", "after"]);
    }

    #[tokio::test]
    async fn test_post_on_empty_channel_is_noop() {
        let channel = PluginChannel::new("empty");
        let event = LifecycleEvent::new(EventKind::Ready, serde_json::Value::Null);
        assert!(channel.post(&event).await.is_empty());
        assert_eq!(channel.handler_count(), 0);
    }
}
