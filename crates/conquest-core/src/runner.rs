//! Simulation loop runner with operator controls.
//!
//! [`run_simulation`] drives [`TickEngine::run_tick`] on a fixed interval
//! and adds the control plane around it:
//!
//! - **Bounded simulation**: stop after `max_ticks`
//! - **Pause/resume**: operator can halt and continue the tick loop
//! - **Variable tick speed**: interval adjustable at runtime
//! - **Operator stop**: clean stop via the operator API
//!
//! Ticks never overlap: the loop awaits each tick before sleeping. A failed
//! tick is logged and the loop carries on, unless
//! `max_consecutive_failures` is set and exceeded.

use std::sync::Arc;

use conquest_db::StateStore;
use tracing::{error, info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{TickEngine, TickError, TickSummary};

/// Errors that end the run abnormally.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Too many ticks failed back to back.
    #[error("{count} consecutive tick failures, last: {last}")]
    TooManyFailures {
        /// Failures in a row.
        count: u32,
        /// The most recent failure.
        last: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last successful tick summary, if any.
    pub final_summary: Option<TickSummary>,
    /// Ticks that completed successfully.
    pub total_ticks: u64,
    /// Ticks that failed.
    pub failed_ticks: u64,
}

/// Callback invoked after each successful tick.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary);
}

/// A no-op tick callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError::TooManyFailures`] if `max_consecutive_failures`
/// is non-zero and that many ticks fail in a row.
pub async fn run_simulation<S: StateStore>(
    engine: &TickEngine<S>,
    operator: &Arc<OperatorState>,
    max_consecutive_failures: u32,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut failed_ticks: u64 = 0;
    let mut failure_streak: u32 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.finish(reason);
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
                failed_ticks,
            });
        }

        // --- Execute tick ---
        match engine.run_tick().await {
            Ok(summary) => {
                failure_streak = 0;
                total_ticks = total_ticks.saturating_add(1);
                operator.record_tick(summary.tick);
                callback.on_tick(&summary);
                last_summary = Some(summary);
            }
            Err(e) => {
                failed_ticks = failed_ticks.saturating_add(1);
                failure_streak = failure_streak.saturating_add(1);
                warn!(error = %e, streak = failure_streak, "Tick failed");
                if max_consecutive_failures > 0 && failure_streak >= max_consecutive_failures {
                    error!(count = failure_streak, "Giving up after repeated tick failures");
                    operator.finish(SimulationEndReason::TooManyFailures);
                    return Err(RunnerError::TooManyFailures {
                        count: failure_streak,
                        last: e,
                    });
                }
            }
        }

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                total_ticks,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = SimulationEndReason::MaxTicksReached;
            operator.finish(reason);
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
                failed_ticks,
            });
        }

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        failed_ticks = result.failed_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}
