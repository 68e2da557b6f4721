use anyhow::Result;
use async_trait::async_trait;

use crate::channel::PluginChannel;
use crate::event::LifecycleEvent;
use crate::types::PluginMeta;

/// A lifecycle event consumer subscribed on a channel.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Handle one event. An `Err` is attributed to the receiving plugin and
    /// never stops delivery to the rest of the chain.
    async fn handle(&self, event: &LifecycleEvent) -> Result<()>;
}

/// An extension module as seen by the lifecycle controller.
///
/// Plugin objects stay with the orchestrator; the controller only keeps
/// their metadata and the channel each one activated against.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn meta(&self) -> &PluginMeta;

    /// One-time activation against the plugin's dedicated channel.
    ///
    /// Subscribe handlers and return `true` to participate, or `false` to
    /// sit out. Declining is an ordinary outcome, not an error; the plugin
    /// stays visible in diagnostics as disabled.
    async fn attach(&self, channel: &mut PluginChannel) -> bool;
}
