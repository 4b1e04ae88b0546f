//! Pass scheduling
//!
//! The Scheduler repeats reconciliation passes forever:
//!
//! ```text
//! Idle ──▶ Checking ──▶ Sleeping ──▶ Checking ──▶ ...
//! ```
//!
//! Exactly one pass is active at a time. After a successful pass the next
//! one starts `config.interval` seconds later; after any failure it starts
//! after the fallback delay (with optional doubling up to a ceiling).
//! A shutdown signal is only observed while sleeping, so a pass that has
//! started always runs to completion.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::engine::{PassOutcome, ReconciliationState, Reconciler};
use crate::error::Result;
use crate::traits::ConfigSource;

/// Repeating driver around a [`Reconciler`]
pub struct Scheduler {
    /// Where the configuration for each pass comes from
    config_source: Box<dyn ConfigSource>,

    /// Pass logic
    reconciler: Reconciler,

    /// Failure delay policy
    policy: SchedulerConfig,

    /// State threaded from pass to pass
    state: ReconciliationState,

    /// Failures since the last successful pass
    consecutive_failures: u32,
}

impl Scheduler {
    /// Create a new scheduler
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: If the scheduler policy is invalid
    pub fn new(
        config_source: Box<dyn ConfigSource>,
        reconciler: Reconciler,
        policy: SchedulerConfig,
    ) -> Result<Self> {
        policy.validate()?;

        Ok(Self {
            config_source,
            reconciler,
            policy,
            state: ReconciliationState::new(),
            consecutive_failures: 0,
        })
    }

    /// State carried between passes
    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    /// Failures since the last successful pass
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Run one pass and return the delay before the next
    ///
    /// Never fails: every error is logged and turned into the failure
    /// delay.
    pub async fn tick(&mut self) -> Duration {
        info!("Checking IP...");

        let config = match self.config_source.load().await {
            Ok(config) => config,
            Err(e) => {
                error!(
                    "Failed to load configuration from {}: {}",
                    self.config_source.describe(),
                    e
                );
                return self.failure_delay();
            }
        };

        match self.reconciler.reconcile(&config, &mut self.state).await {
            Ok(outcome) => {
                self.log_outcome(&outcome);
                self.consecutive_failures = 0;
                Duration::from_secs(config.interval)
            }
            Err(e) => {
                if e.is_config() {
                    error!("Invalid configuration: {}", e);
                } else {
                    error!("Pass failed: {}", e);
                }
                self.failure_delay()
            }
        }
    }

    /// Run until Ctrl-C is received
    pub async fn run(&mut self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(());
            }
        });

        self.run_with_shutdown(shutdown_rx).await
    }

    /// Run until `shutdown_rx` fires (or its sender is dropped)
    pub async fn run_with_shutdown(&mut self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        info!(
            "Scheduler started (ip source: {}, provider: {}, config: {})",
            self.reconciler.source_name(),
            self.reconciler.provider_name(),
            self.config_source.describe()
        );

        loop {
            let delay = self.tick().await;
            info!("Next check in {} seconds", delay.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Scheduler stopped");
        Ok(())
    }

    fn failure_delay(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let secs = self.policy.failure_delay_secs(self.consecutive_failures);
        if self.consecutive_failures > 1 {
            warn!(
                "{} consecutive failed passes, backing off for {} seconds",
                self.consecutive_failures, secs
            );
        }
        Duration::from_secs(secs)
    }

    fn log_outcome(&self, outcome: &PassOutcome) {
        match outcome {
            PassOutcome::Unchanged { .. } => {}
            PassOutcome::AlreadyCurrent { ip, .. } => {
                info!("Record already matches {}", ip);
            }
            PassOutcome::Created { ip, record_id } => {
                info!(
                    "Created record -> {} (id: {})",
                    ip,
                    record_id.as_deref().unwrap_or("unknown")
                );
            }
            PassOutcome::Updated {
                ip,
                record_id,
                previous_value,
            } => {
                info!("Updated record {}: {} -> {}", record_id, previous_value, ip);
            }
        }
    }
}
