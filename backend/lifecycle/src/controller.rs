//! The lifecycle controller: builds the per-plugin channel registry once,
//! distributes phase events across it, tracks state histories and failures,
//! and validates every phase transition.
//!
//! Callers:
//! 1. Orchestrator hands over the ordered plugin list → `bootstrap(...)`
//! 2. For each phase: `transition(phase)?` → `distribute_state(phase, ...)`
//! 3. A dispatch layer reports a plugin failure → `error_occurred(...)`
//! 4. System-wide notices go out via `distribute_custom(...)`

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use loadstone_core::{LifecycleEvent, Plugin, PluginChannel, PluginMeta, PluginState};

use crate::error::LifecycleError;
use crate::ledger::{ErrorCollector, StateLedger};
use crate::phase::Phase;

/// Label of the shared master channel.
const MASTER_CHANNEL: &str = "master";

/// Drives the whole plugin population through the lifecycle phases.
///
/// Delivery is strictly sequential: one plugin, one handler at a time. The
/// channel registry and active list are write-once at bootstrap; the ledger
/// and collector are append-only.
pub struct LifecycleController {
    master: PluginChannel,
    /// Per-plugin channels in activation order. Built once by
    /// [`bootstrap`](Self::bootstrap), never mutated afterward.
    channels: Vec<(String, PluginChannel)>,
    /// Metadata for every plugin ever seen, active or disabled.
    index: HashMap<String, PluginMeta>,
    active: Vec<PluginMeta>,
    ledger: StateLedger,
    errors: ErrorCollector,
    phase: Phase,
    /// Id of the plugin currently receiving an event; only valid inside a
    /// sweep.
    receiving: Option<String>,
    bootstrapped: bool,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self {
            master: PluginChannel::new(MASTER_CHANNEL),
            channels: Vec::new(),
            index: HashMap::new(),
            active: Vec::new(),
            ledger: StateLedger::default(),
            errors: ErrorCollector::default(),
            phase: Phase::Pending,
            receiving: None,
            bootstrapped: false,
        }
    }

    /// Register a system-wide observer on the shared master channel.
    pub fn subscribe_master(&mut self, handler: Arc<dyn loadstone_core::EventHandler>) {
        self.master.subscribe(handler);
    }

    /// Build the channel registry from the orchestrator's ordered plugin
    /// list.
    ///
    /// Runs once per controller lifetime. Each plugin gets a dedicated
    /// channel and one chance to activate against it; decliners are tracked
    /// as disabled and receive no channel.
    pub async fn bootstrap(&mut self, plugins: &[Arc<dyn Plugin>]) {
        if self.bootstrapped {
            warn!("bootstrap called twice; keeping the existing registry");
            return;
        }
        self.bootstrapped = true;

        for plugin in plugins {
            let meta = plugin.meta().clone();
            let mut channel = PluginChannel::new(meta.id.clone());
            let is_active = plugin.attach(&mut channel).await;

            self.index.insert(meta.id.clone(), meta.clone());
            self.ledger.push(&meta.id, PluginState::Unloaded);

            if is_active {
                debug!(plugin = %meta.id, "Activating plugin");
                self.active.push(meta.clone());
                self.channels.push((meta.id.clone(), channel));
            } else {
                warn!(plugin = %meta.id, "Plugin disabled through configuration");
                self.ledger.push(&meta.id, PluginState::Disabled);
            }
        }

        info!(
            active = self.active.len(),
            total = plugins.len(),
            "Plugin registry built"
        );
    }

    /// Broadcast the phase's declared event, if any: post it on the master
    /// channel for system-wide observers, then sweep every active plugin
    /// channel with it. Phases with no event distribute nothing.
    pub async fn distribute_state(&mut self, phase: Phase, payload: Value) {
        let Some(kind) = phase.event_kind() else {
            debug!(phase = %phase, "Phase declares no event; nothing to distribute");
            return;
        };
        let event = LifecycleEvent::new(kind, payload);
        self.distribute_master(&event).await;
        self.sweep(event).await;
    }

    /// Deliver a phase-independent event on the shared master channel only —
    /// no per-plugin iteration, no state bookkeeping. Failures of master
    /// observers are logged and dropped; error records belong to plugins.
    pub async fn distribute_master(&self, event: &LifecycleEvent) {
        for failure in self.master.post(event).await {
            warn!(channel = MASTER_CHANNEL, error = %failure, "Master channel handler failed");
        }
    }

    /// One full pass over the registry in build order.
    ///
    /// A handler failure is recorded against its plugin and the sweep
    /// continues: every remaining plugin still receives the event. A plugin
    /// with any recorded failure comes out of the sweep as errored no
    /// matter what the event declared.
    async fn sweep(&mut self, event: LifecycleEvent) {
        for (id, channel) in &self.channels {
            let meta = match self.index.get(id) {
                Some(meta) => meta.clone(),
                None => continue,
            };
            self.receiving = Some(id.clone());
            let addressed = event.with_plugin(meta);
            for failure in channel.post(&addressed).await {
                self.errors.record(id, failure);
            }
            self.receiving = None;

            let state = if self.errors.contains(id) {
                PluginState::Errored
            } else {
                match event.kind.outcome() {
                    Some(outcome) => outcome,
                    // Master-only kinds never reach a sweep.
                    None => continue,
                }
            };
            self.ledger.push(id, state);
        }
    }

    /// Construct a payload-less event from its kind descriptor and post it
    /// on the master channel. Construction failure is fatal and touches no
    /// channel or state.
    pub async fn distribute_custom(&self, descriptor: &str) -> Result<(), LifecycleError> {
        let event = match LifecycleEvent::for_kind(descriptor) {
            Ok(event) => event,
            Err(source) => {
                error!(descriptor = %descriptor, error = %source, "Could not construct ad hoc event");
                return Err(LifecycleError::EventConstruction {
                    descriptor: descriptor.to_owned(),
                    source,
                });
            }
        };
        self.distribute_master(&event).await;
        Ok(())
    }

    /// Report that a plugin failed while processing the current event.
    ///
    /// The sole write path for failures; the distributor routes handler
    /// errors through the same collector.
    pub fn error_occurred(&mut self, plugin: &PluginMeta, cause: anyhow::Error) {
        self.errors.record(&plugin.id, cause);
    }

    /// Advance the phase machine and check the result against `desired`.
    ///
    /// A mismatch is fatal: the full per-plugin state report and every
    /// recorded failure are logged, and the returned error embeds the first
    /// recorded cause.
    pub fn transition(&mut self, desired: Phase) -> Result<(), LifecycleError> {
        let from = self.phase;
        self.phase = self.phase.next(!self.errors.is_empty());
        if self.phase == desired {
            return Ok(());
        }

        error!(
            from = %from,
            to = %desired,
            "Fatal errors were detected during the phase transition; loading cannot continue"
        );
        let report = self.print_states();
        error!("{}", report);
        error!("The following problems were captured during this phase");
        for (id, cause) in self.errors.iter() {
            error!(plugin = %id, "Caught failure: {:#}", cause);
        }

        let (plugin_id, cause) = match self.errors.first() {
            Some((id, cause)) => (id.to_owned(), Arc::clone(cause)),
            // Mismatch without any recorded failure, e.g. the caller asked
            // for a phase the machine cannot reach from here.
            None => (
                "<none>".to_owned(),
                Arc::new(anyhow!("no failure was recorded")),
            ),
        };
        Err(LifecycleError::Transition {
            expected: desired,
            computed: self.phase,
            plugin_id,
            cause,
            report,
        })
    }

    /// Render every tracked plugin with its full state history, in
    /// discovery order.
    pub fn print_states(&self) -> String {
        let mut out = String::new();
        for (id, history) in self.ledger.iter() {
            let (name, source) = match self.index.get(id) {
                Some(meta) => (meta.name.as_str(), meta.source.as_str()),
                None => (id, "unknown"),
            };
            let joined = history
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            out.push_str(&format!("\n\t{} ({}) {}", name, source, joined));
        }
        out
    }

    /// Plugins that activated successfully, in discovery order.
    pub fn active_list(&self) -> &[PluginMeta] {
        &self.active
    }

    /// Latest recorded state, or `Ready` for a plugin with no history yet.
    pub fn get_state(&self, plugin: &PluginMeta) -> PluginState {
        self.ledger.latest(&plugin.id).unwrap_or(PluginState::Ready)
    }

    /// The plugin currently receiving an event. Only meaningful during a
    /// sweep.
    pub fn active_plugin(&self) -> Option<&PluginMeta> {
        self.receiving.as_deref().and_then(|id| self.index.get(id))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a fresh controller through the complete boot sequence.
///
/// Transitions into each phase in order, then distributes that phase's
/// event; the same payload is broadcast with every event. Stops at the
/// first fatal transition.
pub async fn run_boot_sequence(
    controller: &mut LifecycleController,
    plugins: &[Arc<dyn Plugin>],
    payload: Value,
) -> Result<(), LifecycleError> {
    controller.transition(Phase::Loading)?;
    controller.bootstrap(plugins).await;
    controller
        .distribute_state(Phase::Loading, payload.clone())
        .await;

    for phase in [
        Phase::Construction,
        Phase::PreInit,
        Phase::Init,
        Phase::PostInit,
        Phase::Ready,
    ] {
        controller.transition(phase)?;
        controller.distribute_state(phase, payload.clone()).await;
    }

    info!(phase = %controller.phase(), "Boot sequence complete");
    Ok(())
}
