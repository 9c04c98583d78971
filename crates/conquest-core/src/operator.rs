//! Runtime controls for a match in progress.
//!
//! One [`OperatorState`] is shared by the runner and the HTTP operator
//! routes. The run is always in one of three [`RunMode`]s. Stopping is
//! terminal: once a stop is requested, pause and resume have no effect.
//!
//! The mode lives in a `watch` channel so a paused runner can park on it and
//! wake on the next transition. Tick interval and progress are plain atomics
//! read once per loop iteration.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::SimulationBoundsConfig;

/// Smallest tick interval the operator may set at runtime.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

/// Why a run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// `simulation.max_ticks` ticks completed.
    MaxTicksReached,
    /// Stopped through the operator API or an interrupt.
    OperatorStop,
    /// `simulation.max_consecutive_failures` ticks failed back to back.
    TooManyFailures,
}

/// What the runner should be doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Ticking on schedule.
    Running,
    /// Parked until resumed or stopped.
    Paused,
    /// Finishing; no further ticks start.
    Stopping,
}

/// Controls shared between the runner and the operator API.
#[derive(Debug)]
pub struct OperatorState {
    mode: watch::Sender<RunMode>,
    tick_interval_ms: AtomicU64,
    last_tick: AtomicU64,
    max_ticks: u64,
    started_at: DateTime<Utc>,
    ended: OnceLock<SimulationEndReason>,
}

impl OperatorState {
    /// Running, with the given interval and tick limit.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        let (mode, _) = watch::channel(RunMode::Running);
        Self {
            mode,
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            last_tick: AtomicU64::new(0),
            max_ticks: bounds.max_ticks,
            started_at: Utc::now(),
            ended: OnceLock::new(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> RunMode {
        *self.mode.borrow()
    }

    /// Whether the runner is parked.
    pub fn is_paused(&self) -> bool {
        self.mode() == RunMode::Paused
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.mode() == RunMode::Stopping
    }

    /// Park the runner before its next tick.
    pub fn pause(&self) {
        self.transition(RunMode::Paused);
    }

    /// Let a parked runner continue.
    pub fn resume(&self) {
        self.transition(RunMode::Running);
    }

    /// Stop after the tick in flight. Wakes a parked runner.
    pub fn request_stop(&self) {
        self.mode.send_replace(RunMode::Stopping);
    }

    fn transition(&self, next: RunMode) {
        self.mode.send_if_modified(|mode| {
            if *mode == RunMode::Stopping || *mode == next {
                return false;
            }
            *mode = next;
            true
        });
    }

    /// Return once the mode is anything but [`RunMode::Paused`].
    pub async fn wait_if_paused(&self) {
        let mut rx = self.mode.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|mode| *mode != RunMode::Paused).await;
    }

    /// Milliseconds slept between ticks.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the interval used from the next sleep on.
    ///
    /// Values under [`MIN_TICK_INTERVAL_MS`] are refused with `None`;
    /// otherwise the old interval is returned.
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        (ms >= MIN_TICK_INTERVAL_MS).then(|| self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    /// Note that tick `tick` finished.
    pub fn record_tick(&self, tick: u64) {
        self.last_tick.store(tick, Ordering::Release);
    }

    /// Number of the most recent finished tick.
    pub fn current_tick(&self) -> u64 {
        self.last_tick.load(Ordering::Acquire)
    }

    /// True once `ticks_run` meets a non-zero `max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks != 0 && ticks_run >= self.max_ticks
    }

    /// Configured tick limit, `0` for none.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Mark the run finished. Only the first reason recorded sticks.
    pub fn finish(&self, reason: SimulationEndReason) {
        let _ = self.ended.set(reason);
    }

    /// How the run finished, if it has.
    pub fn end_reason(&self) -> Option<SimulationEndReason> {
        self.ended.get().copied()
    }

    /// Whole seconds since this state was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let secs = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(secs).unwrap_or(0)
    }

    /// Point-in-time view for `GET /api/operator/status`.
    pub fn status(&self) -> SimulationStatus {
        let mode = self.mode();
        SimulationStatus {
            tick: self.current_tick(),
            mode,
            paused: mode == RunMode::Paused,
            stop_requested: mode == RunMode::Stopping,
            tick_interval_ms: self.tick_interval_ms(),
            started_at: self.started_at,
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            end_reason: self.end_reason(),
        }
    }
}

/// Body of the operator status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Most recent finished tick.
    pub tick: u64,
    /// Current mode.
    pub mode: RunMode,
    /// `mode == paused`.
    pub paused: bool,
    /// `mode == stopping`.
    pub stop_requested: bool,
    /// Interval between ticks.
    pub tick_interval_ms: u64,
    /// When the engine started.
    pub started_at: DateTime<Utc>,
    /// Seconds since `started_at`.
    pub elapsed_seconds: u64,
    /// Tick limit, `0` for none.
    pub max_ticks: u64,
    /// Set once the run is over.
    pub end_reason: Option<SimulationEndReason>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn operator(max_ticks: u64) -> OperatorState {
        OperatorState::new(
            1000,
            &SimulationBoundsConfig {
                max_ticks,
                ..SimulationBoundsConfig::default()
            },
        )
    }

    #[test]
    fn interval_floor_is_enforced() {
        let op = operator(0);
        assert_eq!(op.set_tick_interval_ms(50), None);
        assert_eq!(op.tick_interval_ms(), 1000);
        assert_eq!(op.set_tick_interval_ms(250), Some(1000));
        assert_eq!(op.tick_interval_ms(), 250);
    }

    #[test]
    fn zero_max_ticks_is_unlimited() {
        assert!(!operator(0).tick_limit_reached(u64::MAX));
        assert!(!operator(3).tick_limit_reached(2));
        assert!(operator(3).tick_limit_reached(3));
    }

    #[test]
    fn stopping_is_terminal() {
        let op = operator(0);
        op.pause();
        op.request_stop();
        op.resume();
        assert_eq!(op.mode(), RunMode::Stopping);
        op.pause();
        assert!(op.is_stop_requested());
        assert!(!op.is_paused());
    }

    #[test]
    fn first_end_reason_wins() {
        let op = operator(0);
        assert_eq!(op.end_reason(), None);
        op.finish(SimulationEndReason::OperatorStop);
        op.finish(SimulationEndReason::MaxTicksReached);
        assert_eq!(op.end_reason(), Some(SimulationEndReason::OperatorStop));
    }

    #[tokio::test]
    async fn resume_wakes_waiter() {
        let op = Arc::new(operator(0));
        op.pause();
        let waiter = {
            let op = Arc::clone(&op);
            tokio::spawn(async move { op.wait_if_paused().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        op.resume();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn stop_wakes_paused_waiter() {
        let op = Arc::new(operator(0));
        op.pause();
        let waiter = {
            let op = Arc::clone(&op);
            tokio::spawn(async move { op.wait_if_paused().await })
        };
        op.request_stop();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(joined.is_ok());
    }

    #[test]
    fn status_reflects_controls() {
        let op = operator(10);
        op.pause();
        op.record_tick(4);
        op.finish(SimulationEndReason::OperatorStop);
        let status = op.status();
        assert_eq!(status.tick, 4);
        assert_eq!(status.mode, RunMode::Paused);
        assert!(status.paused);
        assert_eq!(status.max_ticks, 10);
        assert_eq!(status.end_reason, Some(SimulationEndReason::OperatorStop));
    }
}
