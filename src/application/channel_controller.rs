// Channel controller - Owns per-variable mode state and drives the chart sink
use crate::application::active_board::ActiveBoard;
use crate::application::chart_sink::ChartSink;
use crate::application::error::{ControlError, EngineError};
use crate::application::mode_executor::ModeExecutor;
use crate::domain::channel::{initial_channels, Channel, ChannelMap, Rendering};
use crate::domain::mode::{resolve, FilterInputs, Intent, Mode};
use crate::domain::variable::Variable;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Which of two overlapping fetches for one channel gets displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOrdering {
    /// Results of superseded requests are dropped.
    #[default]
    LastRequestWins,
    /// Every result is shown as it arrives, slower stale ones included.
    LastCompletionWins,
}

pub struct ChannelController {
    executor: Arc<ModeExecutor>,
    sink: Arc<dyn ChartSink>,
    board: ActiveBoard,
    channels: Mutex<ChannelMap>,
    ordering: RenderOrdering,
    board_wait: Duration,
}

impl ChannelController {
    pub fn new(
        executor: Arc<ModeExecutor>,
        sink: Arc<dyn ChartSink>,
        board: ActiveBoard,
        ordering: RenderOrdering,
        board_wait: Duration,
    ) -> Self {
        Self {
            executor,
            sink,
            board,
            channels: Mutex::new(initial_channels()),
            ordering,
            board_wait,
        }
    }

    pub async fn channel(&self, variable: Variable) -> Channel {
        self.channels
            .lock()
            .await
            .get(&variable)
            .cloned()
            .unwrap_or_else(|| Channel::new(variable))
    }

    pub async fn channels(&self) -> ChannelMap {
        self.channels.lock().await.clone()
    }

    /// Enter `mode` and fetch its data. The channel's display is reset right
    /// away; the result is applied when the fetch completes.
    pub async fn select_mode(&self, variable: Variable, mode: Mode) -> Result<Rendering, EngineError> {
        let board = self.board.wait(self.board_wait).await;
        if board.is_none() {
            return Err(EngineError::NoBoardSelected);
        }

        let generation = self
            .transition(variable, |channel| channel.enter(mode.clone()))
            .await;
        self.sink.reset(variable);

        match self.executor.execute(board.as_ref(), variable, &mode).await {
            Ok(rendering) => {
                self.commit(variable, generation, rendering.clone(), false).await;
                Ok(rendering)
            }
            Err(e) => {
                tracing::debug!("{} for {} produced nothing: {}", mode, variable, e);
                Err(e)
            }
        }
    }

    /// Run a button intent against the channel's current filter inputs.
    pub async fn trigger(&self, variable: Variable, intent: Intent) -> Result<Rendering, ControlError> {
        if intent == Intent::Live {
            return Ok(self.go_live(variable).await?);
        }
        let inputs = self.channel(variable).await.inputs;
        let mode = resolve(intent, &inputs)?;
        Ok(self.select_mode(variable, mode).await?)
    }

    /// Clear the inputs and return to realtime.
    pub async fn go_live(&self, variable: Variable) -> Result<Rendering, EngineError> {
        self.transition(variable, |channel| channel.with_inputs(FilterInputs::default()))
            .await;
        self.sink.caption(variable, "");
        self.select_mode(variable, Mode::Realtime).await
    }

    /// Store new filter inputs. When every input is empty the channel falls back
    /// to realtime on its own, and the outcome of that fetch is returned.
    pub async fn update_inputs(
        &self,
        variable: Variable,
        inputs: FilterInputs,
    ) -> Option<Result<Rendering, EngineError>> {
        let cleared = inputs.is_empty();
        self.transition(variable, |channel| channel.with_inputs(inputs))
            .await;
        if !cleared {
            return None;
        }
        Some(self.select_mode(variable, Mode::Realtime).await)
    }

    /// Put every channel back into realtime with an empty display. The next
    /// scheduler tick fills them in.
    pub async fn reset_all(&self) {
        let mut channels = self.channels.lock().await;
        for variable in Variable::ALL {
            let current = channels
                .get(&variable)
                .cloned()
                .unwrap_or_else(|| Channel::new(variable));
            channels.insert(variable, current.enter(Mode::Realtime));
            self.sink.reset(variable);
            self.sink.caption(variable, "");
        }
    }

    /// One scheduler pass: fetch the full history once and redraw every channel
    /// that is still in realtime. Returns how many channels were redrawn.
    pub async fn refresh_realtime(&self) -> Result<usize, EngineError> {
        let board = self
            .board
            .wait(self.board_wait)
            .await
            .ok_or(EngineError::NoBoardSelected)?;

        let targets: Vec<(Variable, u64)> = self
            .channels
            .lock()
            .await
            .values()
            .filter(|c| c.mode.is_realtime())
            .map(|c| (c.variable, c.generation))
            .collect();

        let samples = self.executor.samples(&board, None).await?;
        if samples.is_empty() {
            return Err(EngineError::NoData);
        }

        let mut redrawn = 0;
        for (variable, generation) in targets {
            let rendering = self.executor.realtime(variable, &samples)?;
            if self.commit(variable, generation, rendering, true).await {
                redrawn += 1;
            }
        }
        Ok(redrawn)
    }

    async fn transition(&self, variable: Variable, f: impl FnOnce(&Channel) -> Channel) -> u64 {
        let mut channels = self.channels.lock().await;
        let current = channels
            .get(&variable)
            .cloned()
            .unwrap_or_else(|| Channel::new(variable));
        let next = f(&current);
        let generation = next.generation;
        channels.insert(variable, next);
        generation
    }

    /// Apply a finished result if the ordering policy still allows it.
    async fn commit(&self, variable: Variable, generation: u64, rendering: Rendering, realtime_only: bool) -> bool {
        let mut channels = self.channels.lock().await;
        let Some(current) = channels.get(&variable) else {
            return false;
        };

        if realtime_only && !current.mode.is_realtime() {
            return false;
        }
        if self.ordering == RenderOrdering::LastRequestWins && current.generation != generation {
            tracing::debug!(
                "Dropping stale result for {} (generation {} < {})",
                variable,
                generation,
                current.generation
            );
            return false;
        }

        let next = current.apply(rendering);
        self.publish(&next);
        channels.insert(variable, next);
        true
    }

    fn publish(&self, channel: &Channel) {
        let rendering = &channel.rendering;
        self.sink
            .render(channel.variable, &rendering.labels, &rendering.series);
        self.sink.caption(channel.variable, &rendering.caption);
        if let Some(tier) = channel.tier {
            self.sink.status(channel.variable, tier);
        }
    }
}
