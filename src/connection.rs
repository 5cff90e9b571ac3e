//! Backend reachability state shared by both stores.
//!
//! A store starts in `Simulation(NotConfigured)` when no backend exists, or
//! `Backend` when one does. The first failed call moves it to
//! `Simulation(Unreachable)`; only a successful `refresh()` moves it back.

use std::fmt;

use log::warn;

use crate::error::CommunityError;

/// Why a store is running on local data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationReason {
    /// No base URL configured; the backend is never called.
    NotConfigured,
    /// The last backend call failed with this message.
    Unreachable(String),
}

/// Where the store currently sends mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Backend,
    Simulation(SimulationReason),
}

impl ConnectionState {
    pub fn is_backend(&self) -> bool {
        matches!(self, ConnectionState::Backend)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Backend => write!(f, "backend"),
            ConnectionState::Simulation(SimulationReason::NotConfigured) => {
                write!(f, "simulation (no backend configured)")
            }
            ConnectionState::Simulation(SimulationReason::Unreachable(msg)) => {
                write!(f, "simulation (backend unreachable: {})", msg)
            }
        }
    }
}

/// Connection state plus the advisory message shown to the user.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    component: &'static str,
    state: ConnectionState,
    advisory: Option<String>,
}

impl Connection {
    pub(crate) fn new(component: &'static str, backend_configured: bool) -> Self {
        let state = if backend_configured {
            ConnectionState::Backend
        } else {
            ConnectionState::Simulation(SimulationReason::NotConfigured)
        };
        Self {
            component,
            state,
            advisory: None,
        }
    }

    pub(crate) fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub(crate) fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// Whether a backend call should be attempted for a mutation.
    pub(crate) fn should_try_backend(&self) -> bool {
        self.state.is_backend()
    }

    /// Whether `refresh()` should attempt the backend. A store that was
    /// downgraded retries here; an unconfigured one never does.
    pub(crate) fn should_try_refresh(&self) -> bool {
        !matches!(
            self.state,
            ConnectionState::Simulation(SimulationReason::NotConfigured)
        )
    }

    pub(crate) fn mark_reachable(&mut self) {
        self.state = ConnectionState::Backend;
        self.advisory = None;
    }

    /// Downgrade to simulation after a failed backend call.
    pub(crate) fn downgrade(&mut self, operation: &str, err: &CommunityError) {
        if matches!(err, CommunityError::NotConfigured) {
            self.state = ConnectionState::Simulation(SimulationReason::NotConfigured);
            return;
        }
        warn!(
            "[{}] {} failed, switching to simulation mode: {}",
            self.component, operation, err
        );
        self.state = ConnectionState::Simulation(SimulationReason::Unreachable(err.to_string()));
        self.advisory = Some(format!(
            "Server unavailable, changes are saved on this device ({})",
            operation
        ));
    }
}
