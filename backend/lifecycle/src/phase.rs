//! The phase state machine driving the whole plugin population.
//!
//! Phases form a fixed, totally ordered sequence of milestones. Each phase
//! knows its ordered successor, the phase reached instead when any failure
//! has been recorded, and the event it broadcasts while being swept.

use serde::{Deserialize, Serialize};

use loadstone_core::EventKind;

/// One step in the lifecycle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Controller constructed, nothing has happened yet.
    Pending,
    /// Plugin list assembled and channels built.
    Loading,
    /// Plugins construct their internal structures.
    Construction,
    PreInit,
    Init,
    PostInit,
    /// Load complete; the host is serving.
    Ready,
    /// Terminal failure phase.
    Errored,
}

impl Phase {
    /// Next phase given whether any error has been recorded.
    ///
    /// Pure: the machine holds no state of its own.
    pub fn next(self, any_errors: bool) -> Phase {
        if any_errors {
            return self.error_phase();
        }
        match self {
            Phase::Pending => Phase::Loading,
            Phase::Loading => Phase::Construction,
            Phase::Construction => Phase::PreInit,
            Phase::PreInit => Phase::Init,
            Phase::Init => Phase::PostInit,
            Phase::PostInit => Phase::Ready,
            Phase::Ready => Phase::Ready,
            Phase::Errored => Phase::Errored,
        }
    }

    /// Phase reached instead of the ordered successor when errors exist.
    /// Idempotent at the terminal: the error phase's own error phase is
    /// itself.
    fn error_phase(self) -> Phase {
        Phase::Errored
    }

    /// Event broadcast while sweeping this phase, if it declares one.
    pub fn event_kind(self) -> Option<EventKind> {
        match self {
            Phase::Loading => Some(EventKind::Load),
            Phase::Construction => Some(EventKind::Construct),
            Phase::PreInit => Some(EventKind::PreInit),
            Phase::Init => Some(EventKind::Init),
            Phase::PostInit => Some(EventKind::PostInit),
            Phase::Ready => Some(EventKind::Ready),
            Phase::Pending | Phase::Errored => None,
        }
    }
}

impl std::fmt::Display for Phase {
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
    use loadstone_core::PluginState;

    #[test]
    fn test_ordered_walk_without_errors() {
        let mut phase = Phase::Pending;
        let expected = [
            Phase::Loading,
            Phase::Construction,
            Phase::PreInit,
            Phase::Init,
            Phase::PostInit,
            Phase::Ready,
        ];
        for want in expected {
            phase = phase.next(false);
            assert_eq!(phase, want);
        }
        // Terminal success phase holds.
        assert_eq!(phase.next(false), Phase::Ready);
    }

    #[test]
    fn test_any_error_routes_to_error_phase() {
        assert_eq!(Phase::Loading.next(true), Phase::Errored);
        assert_eq!(Phase::Init.next(true), Phase::Errored);
        assert_eq!(Phase::Ready.next(true), Phase::Errored);
    }

    #[test]
    fn test_error_phase_is_idempotent() {
        assert_eq!(Phase::Errored.next(false), Phase::Errored);
        assert_eq!(Phase::Errored.next(true), Phase::Errored);
    }

    #[test]
    fn test_event_kinds_and_outcomes() {
        assert_eq!(Phase::Pending.event_kind(), None);
        assert_eq!(Phase::Errored.event_kind(), None);
        assert_eq!(Phase::Loading.event_kind(), Some(EventKind::Load));
        assert_eq!(
            Phase::Construction.event_kind().unwrap().outcome(),
            Some(PluginState::Constructed)
        );
        assert_eq!(
            Phase::Ready.event_kind().unwrap().outcome(),
            Some(PluginState::Ready)
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Phase::PreInit.to_string(), "pre_init");
        assert_eq!(Phase::Errored.to_string(), "errored");
    }
}
