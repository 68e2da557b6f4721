use serde::{Deserialize, Serialize};

/// Identity and provenance of a plugin, as supplied by the orchestrator.
///
/// The host never owns plugin objects; it keeps metadata clones for channel
/// labelling and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMeta {
    /// Stable unique id, e.g. `"telemetry-relay"`.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    pub version: String,
    /// Where the plugin came from (path, archive, registry coordinate).
    pub source: String,
}

impl PluginMeta {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            source: source.into(),
        }
    }
}

/// Lifecycle state of a single plugin.
///
/// A plugin's state is an append-only history of these values; the latest
/// entry is the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Tracked but not yet delivered anything.
    Unloaded,
    /// Plugin list is final; the plugin saw the load event.
    Loaded,
    Constructed,
    PreInitialized,
    Initialized,
    PostInitialized,
    /// Fully up and serving.
    Ready,
    /// Declined activation at bootstrap; excluded from distribution.
    Disabled,
    /// At least one failure was recorded against the plugin.
    Errored,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(PluginState::Unloaded.to_string(), "unloaded");
        assert_eq!(PluginState::PreInitialized.to_string(), "pre_initialized");
        assert_eq!(PluginState::Errored.to_string(), "errored");
    }

    #[test]
    fn test_meta_roundtrip() {
        let meta = PluginMeta::new("alpha", "Alpha", "1.2.0", "plugins/alpha");
        let json = serde_json::to_string(&meta).unwrap();
        let back: PluginMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
