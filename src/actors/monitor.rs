//! MonitorActor - drives the periodic evaluation loop
//!
//! One evaluation cycle runs immediately at startup (cold-start
//! visibility), then one per interval, forever. The actor awaits each cycle
//! to completion before sleeping again, so cycles never overlap; an
//! overrunning cycle delays the next tick rather than stacking behind it.
//!
//! A store failure fails the cycle as a whole: the error is logged, no
//! summary line is printed, and the actor waits for the next tick. Nothing
//! here is fatal to the process.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument};

use crate::config::{AbsentBoundPolicy, MonitorConfig};
use crate::pipeline::{AlertSink, CycleSummary, run_cycle};
use crate::store::ReadingsStore;

use super::messages::MonitorCommand;

/// Actor that schedules and runs evaluation cycles
pub struct MonitorActor<S: AlertSink> {
    /// Readings store queried once per cycle
    store: Arc<dyn ReadingsStore>,

    /// Where breaching aggregates go
    sink: S,

    /// Trailing aggregation window
    window: chrono::Duration,

    /// Absent-bound handling for the evaluator
    policy: AbsentBoundPolicy,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<MonitorCommand>,

    /// Current evaluation interval
    interval_duration: Duration,
}

impl<S: AlertSink> MonitorActor<S> {
    pub fn new(
        store: Arc<dyn ReadingsStore>,
        sink: S,
        config: &MonitorConfig,
        command_rx: mpsc::Receiver<MonitorCommand>,
    ) -> Self {
        Self {
            store,
            sink,
            window: config.window(),
            policy: config.absent_bounds,
            command_rx,
            interval_duration: config.interval(),
        }
    }

    /// Run the actor's main loop
    ///
    /// The first tick of a tokio interval completes immediately, which
    /// gives the required evaluation-at-startup for free.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!(
            "starting monitor actor with interval {:?}",
            self.interval_duration
        );

        let mut ticker = interval(self.interval_duration);
        // next tick is measured from completion of the late one, not from
        // wall-clock schedule
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.evaluate_once().await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MonitorCommand::RunNow { respond_to }) => {
                            debug!("received RunNow command");
                            let summary = self.evaluate_once().await;
                            let _ = respond_to.send(summary);
                        }

                        Some(MonitorCommand::UpdateInterval { interval_secs }) => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs);
                            ticker = interval(self.interval_duration);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                            // fresh intervals tick immediately; burn that one
                            ticker.tick().await;
                        }

                        Some(MonitorCommand::Shutdown) | None => {
                            debug!("shutting down monitor actor");
                            break;
                        }
                    }
                }
            }
        }

        debug!("monitor actor stopped");
    }

    /// Run one evaluation cycle and log its outcome
    async fn evaluate_once(&self) -> Option<CycleSummary> {
        match run_cycle(self.store.as_ref(), self.window, self.policy, &self.sink).await {
            Ok(summary) => {
                info!(
                    "{} devices examined, {} alerts sent",
                    summary.groups_examined, summary.alerts_sent
                );
                Some(summary)
            }
            Err(e) => {
                error!("evaluation cycle failed: {e}");
                None
            }
        }
    }
}

/// Handle for controlling a MonitorActor
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
}

impl MonitorHandle {
    /// Spawn a new monitor actor
    pub fn spawn<S: AlertSink + 'static>(
        store: Arc<dyn ReadingsStore>,
        sink: S,
        config: &MonitorConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = MonitorActor::new(store, sink, config, cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Trigger an immediate evaluation cycle
    ///
    /// Returns the cycle summary, or `None` if the cycle failed at the
    /// store.
    pub async fn run_now(&self) -> Result<Option<CycleSummary>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::RunNow { respond_to: tx })
            .await
            .context("failed to send RunNow command")?;

        rx.await.context("failed to receive response")
    }

    /// Update the evaluation interval
    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(MonitorCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Gracefully shut down the monitor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(MonitorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
