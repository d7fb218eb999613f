//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every target
//! - Update the liveness registry from probe results
//! - Stop cleanly: no state mutation once `stop()` returns

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::{HttpRequest, RequestOutcome, TimedRequestClient};
use crate::config::HealthCheckConfig;
use crate::health::state::{HealthRegistry, HealthState};
use crate::observability::metrics;
use crate::target::BackendTarget;

#[derive(Debug, Clone)]
struct ProbeSettings {
    path: String,
    timeout_ms: u64,
}

/// Polls targets on a fixed interval and exposes their last-known liveness.
pub struct HealthMonitor {
    client: TimedRequestClient,
    registry: Arc<HealthRegistry>,
    probe: ProbeSettings,
    running: Mutex<Option<CancellationToken>>,
}

impl HealthMonitor {
    pub fn new(client: TimedRequestClient, config: &HealthCheckConfig) -> Self {
        Self {
            client,
            registry: Arc::new(HealthRegistry::new()),
            probe: ProbeSettings {
                path: config.path.clone(),
                timeout_ms: config.timeout_ms,
            },
            running: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> Arc<HealthRegistry> {
        self.registry.clone()
    }

    /// Begin polling `targets`. The first tick fires immediately.
    ///
    /// Must be called from within a Tokio runtime. Starting an already running
    /// monitor stops the previous polling loop first.
    pub fn start(&self, targets: Vec<BackendTarget>, interval: Duration) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = running.take() {
            previous.cancel();
        }

        let generation = self.registry.invalidate();
        for target in &targets {
            self.registry.register(&target.name);
        }

        tracing::info!(
            targets = targets.len(),
            interval_ms = interval.as_millis() as u64,
            path = %self.probe.path,
            "Health monitor starting"
        );

        let cancel = CancellationToken::new();
        let ticker = Ticker {
            client: self.client.clone(),
            registry: self.registry.clone(),
            probe: self.probe.clone(),
            targets: targets.into(),
            generation,
            cancel: cancel.clone(),
        };
        tokio::spawn(ticker.run(interval.max(Duration::from_millis(1))));

        *running = Some(cancel);
    }

    /// Halt polling. In-flight probes are abandoned and their results discarded.
    pub fn stop(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cancel) = running.take() {
            cancel.cancel();
            tracing::info!("Health monitor stopped");
        }
        self.registry.invalidate();
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn current_state(&self, target_name: &str) -> HealthState {
        self.registry.current_state(target_name)
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(cancel) = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            cancel.cancel();
        }
    }
}

/// The polling task owned by one `start()` call.
struct Ticker {
    client: TimedRequestClient,
    registry: Arc<HealthRegistry>,
    probe: ProbeSettings,
    targets: Arc<[BackendTarget]>,
    generation: u64,
    cancel: CancellationToken,
}

impl Ticker {
    async fn run(self, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.dispatch(),
                _ = self.cancel.cancelled() => {
                    tracing::debug!(generation = self.generation, "Health ticker cancelled");
                    break;
                }
            }
        }
    }

    /// Fire one probe per target without waiting on any of them.
    fn dispatch(&self) {
        for target in self.targets.iter() {
            tokio::spawn(probe(
                self.client.clone(),
                self.registry.clone(),
                target.clone(),
                self.probe.clone(),
                self.generation,
                self.cancel.clone(),
            ));
        }
    }
}

async fn probe(
    client: TimedRequestClient,
    registry: Arc<HealthRegistry>,
    target: BackendTarget,
    settings: ProbeSettings,
    generation: u64,
    cancel: CancellationToken,
) {
    let request = HttpRequest::get(target.url_for(&settings.path))
        .header("user-agent", "backend-harness-health-check");

    let outcome = tokio::select! {
        outcome = client.send(request, settings.timeout_ms) => outcome,
        _ = cancel.cancelled() => return,
    };

    let state = match outcome {
        RequestOutcome::Success(response) => {
            if response.json().is_some() {
                HealthState::Online
            } else {
                tracing::warn!(
                    target_name = %target.name,
                    status = response.status,
                    "Health check failed: body is not JSON"
                );
                HealthState::Offline
            }
        }
        RequestOutcome::Failure(failure) => {
            tracing::warn!(
                target_name = %target.name,
                kind = ?failure.kind,
                error = %failure.detail,
                "Health check failed"
            );
            HealthState::Offline
        }
    };

    if registry.record(&target.name, generation, state) {
        metrics::record_probe(&target.name, state);
    } else {
        tracing::debug!(target_name = %target.name, "Discarding probe result from stopped monitor");
    }
}
