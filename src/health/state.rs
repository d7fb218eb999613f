//! Per-target liveness state.
//!
//! # States
//! - Unknown: no probe has completed yet
//! - Online: the last completed probe returned a JSON body
//! - Offline: the last completed probe failed (timeout, network, unparsable body)
//!
//! # Design Decisions
//! - Writes carry the generation they were dispatched under; stale writes are dropped
//! - The generation lock is held across each write so `invalidate()` is a barrier:
//!   once it returns, no write from an older generation can land

use std::sync::{PoisonError, RwLock};

use dashmap::DashMap;
use serde::Serialize;

/// Liveness classification of a target.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown = 0,
    Online = 1,
    Offline = 2,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthState::Unknown => "unknown",
            HealthState::Online => "online",
            HealthState::Offline => "offline",
        };
        f.write_str(s)
    }
}

/// Target name → liveness, written only by the monitor.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    states: DashMap<String, HealthState>,
    generation: RwLock<u64>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a slot exists for `name`, leaving an existing state untouched.
    pub fn register(&self, name: &str) {
        self.states
            .entry(name.to_string())
            .or_insert(HealthState::Unknown);
    }

    pub fn generation(&self) -> u64 {
        *self.generation.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new generation; writes tagged with older generations are ignored from now on.
    pub fn invalidate(&self) -> u64 {
        let mut generation = self.generation.write().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    /// Store `state` if `generation` is still current. Returns whether it was stored.
    pub fn record(&self, name: &str, generation: u64, state: HealthState) -> bool {
        let current = self.generation.read().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            return false;
        }

        let previous = self.states.insert(name.to_string(), state);
        if previous != Some(state) {
            tracing::info!(
                target_name = %name,
                from = %previous.unwrap_or(HealthState::Unknown),
                to = %state,
                "Backend liveness changed"
            );
        }
        true
    }

    /// Current state; `Unknown` for names never registered.
    pub fn current_state(&self, name: &str) -> HealthState {
        self.states
            .get(name)
            .map(|r| *r.value())
            .unwrap_or(HealthState::Unknown)
    }

    /// All (name, state) pairs, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, HealthState)> {
        let mut all: Vec<_> = self
            .states
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
