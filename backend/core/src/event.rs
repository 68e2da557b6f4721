use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PluginMeta, PluginState};

/// Kinds of lifecycle events the host broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The plugin list is final; plugins may inspect their own metadata.
    Load,
    /// Plugins build their internal structures.
    Construct,
    /// Early setup before cross-plugin wiring.
    PreInit,
    /// Main initialization.
    Init,
    /// Late wiring once every plugin finished its own init.
    PostInit,
    /// The host is fully up.
    Ready,
    /// System-wide shutdown notice; master channel only.
    Shutdown,
}

impl EventKind {
    /// State a clean delivery of this event assigns to the receiving plugin.
    ///
    /// Master-only kinds carry no outcome and never reach a per-plugin sweep.
    pub fn outcome(&self) -> Option<PluginState> {
        match self {
            Self::Load => Some(PluginState::Loaded),
            Self::Construct => Some(PluginState::Constructed),
            Self::PreInit => Some(PluginState::PreInitialized),
            Self::Init => Some(PluginState::Initialized),
            Self::PostInit => Some(PluginState::PostInitialized),
            Self::Ready => Some(PluginState::Ready),
            Self::Shutdown => None,
        }
    }
}

impl FromStr for EventKind {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_owned()))
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

/// A lifecycle event delivered over a channel.
///
/// The same event value is broadcast to every plugin in a sweep; the
/// distributor attaches the receiving plugin's metadata to each copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub payload: serde_json::Value,
    /// Metadata of the plugin currently receiving the event; set per
    /// delivery, `None` on the master channel.
    pub plugin: Option<PluginMeta>,
}

impl LifecycleEvent {
    pub fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            payload,
            plugin: None,
        }
    }

    /// Build the payload-less event for an event-kind descriptor.
    ///
    /// An unknown descriptor is a construction failure.
    pub fn for_kind(descriptor: &str) -> anyhow::Result<Self> {
        let kind = descriptor
            .parse::<EventKind>()
            .with_context(|| format!("unknown event kind '{}'", descriptor))?;
        Ok(Self::new(kind, serde_json::Value::Null))
    }

    /// Copy of this event addressed to one plugin.
    pub fn with_plugin(&self, plugin: PluginMeta) -> Self {
        Self {
            plugin: Some(plugin),
            ..self.clone()
        }
    }
}
