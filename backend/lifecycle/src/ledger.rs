//! Append-only bookkeeping for the controller: per-plugin state histories
//! and recorded failures. Both structures keep deterministic insertion
//! order and expose no way to remove or rewrite an entry.

use std::sync::Arc;

use loadstone_core::PluginState;

/// Discovery-ordered record of every plugin's state history.
#[derive(Debug, Default)]
pub struct StateLedger {
    entries: Vec<(String, Vec<PluginState>)>,
}

impl StateLedger {
    /// Append a state to the plugin's history, creating the entry on first
    /// touch. Histories only ever grow.
    pub fn push(&mut self, id: &str, state: PluginState) {
        match self.entries.iter_mut().find(|(key, _)| key == id) {
            Some((_, history)) => history.push(state),
            None => self.entries.push((id.to_owned(), vec![state])),
        }
    }

    /// Latest recorded state for the plugin, if any.
    pub fn latest(&self, id: &str) -> Option<PluginState> {
        self.history(id).and_then(|h| h.last().copied())
    }

    pub fn history(&self, id: &str) -> Option<&[PluginState]> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, h)| h.as_slice())
    }

    /// Iterate `(id, history)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PluginState])> {
        self.entries.iter().map(|(id, h)| (id.as_str(), h.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only record of `(plugin id, cause)` failure pairs.
///
/// Records are never cleared: error presence is evaluated globally, so a
/// plugin that errored once keeps the whole system on the error path for
/// every later transition.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    records: Vec<(String, Arc<anyhow::Error>)>,
}

impl ErrorCollector {
    pub fn record(&mut self, id: &str, cause: anyhow::Error) {
        self.records.push((id.to_owned(), Arc::new(cause)));
    }

    /// Whether any failure was ever recorded against the plugin.
    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|(key, _)| key == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First record in collection order — a deterministic "first", not
    /// necessarily the chronologically most interesting one.
    pub fn first(&self) -> Option<(&str, &Arc<anyhow::Error>)> {
        self.records.first().map(|(id, cause)| (id.as_str(), cause))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<anyhow::Error>)> {
        self.records.iter().map(|(id, cause)| (id.as_str(), cause))
    }
}
