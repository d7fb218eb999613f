//! Startup orchestration.
//!
//! # Responsibilities
//! - Build targets from configuration
//! - Wire the shared timed client into the monitor and the runner
//! - Load persisted context and inject the SDK capability

use std::sync::Arc;
use std::time::Duration;

use crate::client::{TimedRequestClient, Transport};
use crate::config::HarnessConfig;
use crate::context::{ContextError, ContextStore};
use crate::health::HealthMonitor;
use crate::operations::{BackendOperationRunner, ResultLog};
use crate::sdk::{LocalSdk, SdkCapability, SdkOperations};
use crate::target::BackendTarget;

/// Every long-lived component of a running harness.
pub struct Harness {
    pub config: HarnessConfig,
    pub targets: Vec<BackendTarget>,
    pub monitor: HealthMonitor,
    pub runner: BackendOperationRunner,
    pub context: Arc<ContextStore>,
    pub results: Arc<ResultLog>,
    pub sdk: SdkOperations,
}

impl Harness {
    /// Build a harness whose SDK is the in-process [`LocalSdk`].
    pub fn build(config: HarnessConfig, transport: Arc<dyn Transport>) -> Result<Self, ContextError> {
        let context = Arc::new(ContextStore::load_from_file(&config.context.store_path)?);
        let sdk: Arc<dyn SdkCapability> = Arc::new(LocalSdk::new(context.clone()));
        Ok(Self::with_sdk(config, transport, context, sdk))
    }

    pub fn with_sdk(
        config: HarnessConfig,
        transport: Arc<dyn Transport>,
        context: Arc<ContextStore>,
        sdk: Arc<dyn SdkCapability>,
    ) -> Self {
        let targets: Vec<BackendTarget> = config.targets.iter().map(BackendTarget::from).collect();
        let client = TimedRequestClient::new(transport);

        let monitor = HealthMonitor::new(client.clone(), &config.health_check);
        for target in &targets {
            monitor.registry().register(&target.name);
        }
        let runner = BackendOperationRunner::new(client).with_timeout_ms(config.requests.timeout_ms);
        let results = Arc::new(ResultLog::new(config.results.capacity));
        let sdk = SdkOperations::new(sdk, results.clone());

        tracing::info!(
            targets = targets.len(),
            request_timeout_ms = config.requests.timeout_ms,
            "Harness initialized"
        );

        Self {
            config,
            targets,
            monitor,
            runner,
            context,
            results,
            sdk,
        }
    }

    pub fn target(&self, name: &str) -> Option<&BackendTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Start background health polling if enabled.
    pub fn start_monitor(&self) {
        if !self.config.health_check.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }
        self.monitor.start(
            self.targets.clone(),
            Duration::from_millis(self.config.health_check.interval_ms),
        );
    }

    /// Stop polling and persist context.
    pub fn shutdown(&self) {
        self.monitor.stop();
        if let Err(e) = self.context.save_to_file() {
            tracing::error!(error = %e, "Failed to persist context on shutdown");
        }
    }
}
