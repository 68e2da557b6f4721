//! Adapter between config entries and the controller's plugin seam.
//!
//! A declared plugin participates in the lifecycle exactly like a
//! code-discovered one: it activates against its dedicated channel (unless
//! its config entry disables it) and logs every event it receives.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use loadstone_core::{EventHandler, LifecycleEvent, Plugin, PluginChannel, PluginMeta};

use crate::config::PluginEntry;

pub struct DeclaredPlugin {
    meta: PluginMeta,
    enabled: bool,
    settings: serde_json::Value,
}

impl DeclaredPlugin {
    pub fn from_entry(entry: &PluginEntry) -> Self {
        Self {
            meta: PluginMeta::new(
                entry.id.clone(),
                entry.name.clone(),
                entry.version.clone(),
                entry.source.clone(),
            ),
            enabled: entry.enabled,
            settings: entry.settings.clone(),
        }
    }
}

#[async_trait]
impl Plugin for DeclaredPlugin {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    async fn attach(&self, channel: &mut PluginChannel) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.settings.is_null() {
            debug!(plugin = %self.meta.id, settings = %self.settings, "Applying declared settings");
        }
        channel.subscribe(Arc::new(LogHandler {
            label: format!("{}/log", self.meta.id),
        }));
        true
    }
}

/// Logs every lifecycle event delivered to its plugin.
struct LogHandler {
    label: String,
}

#[async_trait]
impl EventHandler for LogHandler {
    fn name(&self) -> &str {
        &self.label
    }

    async fn handle(&self, event: &LifecycleEvent) -> Result<()> {
        let plugin = event
            .plugin
            .as_ref()
            .map(|m| m.id.as_str())
            .unwrap_or("<master>");
        info!(plugin = %plugin, kind = %event.kind, "Lifecycle event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(enabled: bool) -> PluginEntry {
        PluginEntry {
            id: "telemetry".into(),
            name: "Telemetry Relay".into(),
            version: "1.4.0".into(),
            source: "plugins/telemetry".into(),
            enabled,
            settings: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_enabled_entry_activates() {
        let plugin = DeclaredPlugin::from_entry(&entry(true));
        let mut channel = PluginChannel::new("telemetry");
        assert!(plugin.attach(&mut channel).await);
        assert_eq!(channel.handler_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_entry_declines() {
        let plugin = DeclaredPlugin::from_entry(&entry(false));
        let mut channel = PluginChannel::new("telemetry");
        assert!(!plugin.attach(&mut channel).await);
        assert_eq!(channel.handler_count(), 0);
    }
}
