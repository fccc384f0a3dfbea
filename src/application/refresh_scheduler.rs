// Refresh scheduler - Periodic redraw of realtime channels while visible
use crate::application::channel_controller::ChannelController;
use crate::application::error::EngineError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);
const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

struct SchedulerState {
    task: Option<JoinHandle<()>>,
    visible: bool,
}

pub struct RefreshScheduler {
    controller: Arc<ChannelController>,
    period: Duration,
    state: Mutex<SchedulerState>,
}

impl RefreshScheduler {
    /// `period` is clamped to at least one millisecond; `interval` rejects zero.
    pub fn new(controller: Arc<ChannelController>, period: Duration) -> Self {
        Self {
            controller,
            period: period.max(MIN_REFRESH_PERIOD),
            state: Mutex::new(SchedulerState {
                task: None,
                visible: true,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start ticking, with one tick right away. A running scheduler is left
    /// alone unless `force` is set. Nothing starts while the view is hidden.
    /// Returns whether a new loop was started.
    pub fn start(&self, force: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let running = state.task.as_ref().is_some_and(|t| !t.is_finished());
        if running && !force {
            return false;
        }
        if let Some(task) = state.task.take() {
            task.abort();
        }
        if !state.visible {
            tracing::debug!("View hidden, refresh not started");
            return false;
        }

        let controller = self.controller.clone();
        let period = self.period;
        state.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match controller.refresh_realtime().await {
                    Ok(redrawn) => tracing::debug!("Refresh tick redrew {} channels", redrawn),
                    Err(EngineError::NoBoardSelected) => tracing::debug!("Refresh tick skipped, no board"),
                    Err(e) => tracing::debug!("Refresh tick produced nothing: {}", e),
                }
            }
        }));
        tracing::info!("Auto refresh started (every {:?})", period);
        true
    }

    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = state.task.take() {
            task.abort();
            tracing::info!("Auto refresh stopped");
        }
    }

    /// Hidden views get no background ticks; becoming visible restarts with an
    /// immediate tick.
    pub fn set_visible(&self, visible: bool) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.visible = visible;
        }
        if visible {
            self.start(true);
        } else {
            self.stop();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
