// Mode executor - Fetches history and reduces it to a displayable series
use crate::application::error::EngineError;
use crate::application::history_store::{HistoryStore, KeyRange};
use crate::domain::board::Board;
use crate::domain::channel::{Rendering, Series};
use crate::domain::mode::{DayWindow, Mode};
use crate::domain::sample::{normalize, Sample};
use crate::domain::threshold::ThresholdTable;
use crate::domain::variable::Variable;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

pub const DEFAULT_REALTIME_WINDOW: usize = 25;

#[derive(Clone)]
pub struct ModeExecutor {
    store: Arc<dyn HistoryStore>,
    thresholds: ThresholdTable,
    realtime_window: usize,
}

impl ModeExecutor {
    pub fn new(store: Arc<dyn HistoryStore>, thresholds: ThresholdTable, realtime_window: usize) -> Self {
        Self {
            store,
            thresholds,
            realtime_window: realtime_window.max(1),
        }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub async fn execute(
        &self,
        board: Option<&Board>,
        variable: Variable,
        mode: &Mode,
    ) -> Result<Rendering, EngineError> {
        let board = board.ok_or(EngineError::NoBoardSelected)?;
        tracing::debug!("Executing {} for {} on {}", mode, variable, board.id);

        match mode {
            Mode::Realtime => {
                let samples = self.samples(board, None).await?;
                self.realtime(variable, &samples)
            }
            Mode::Range(window) => {
                let samples = self.samples(board, Some(window_range(window))).await?;
                self.timeline(variable, &samples, window.day.to_string())
            }
            Mode::DayAverage(day) => {
                let samples = self.samples(board, None).await?;
                self.day_average(variable, &samples, *day)
            }
            Mode::DayMinMax(day) => {
                let samples = self.samples(board, None).await?;
                let on_day: Vec<Sample> = samples.into_iter().filter(|s| s.is_on(*day)).collect();
                self.min_max(variable, &on_day, day.to_string())
            }
            Mode::HistoricalMinMax => {
                let samples = self.samples(board, None).await?;
                self.min_max(variable, &samples, "Historical".to_string())
            }
            Mode::CompareDays {
                first,
                second,
                start,
                end,
            } => self.compare_days(board, variable, *first, *second, *start, *end).await,
            Mode::OutOfRange => {
                let samples = self.samples(board, None).await?;
                self.out_of_range(variable, &samples)
            }
        }
    }

    /// Fetch and normalize. A failed fetch is logged and reported as a transport failure.
    pub async fn samples(&self, board: &Board, range: Option<KeyRange>) -> Result<Vec<Sample>, EngineError> {
        match self.store.fetch(&board.root, range.as_ref()).await {
            Ok(records) => Ok(normalize(records)),
            Err(e) => {
                tracing::warn!("History fetch for {} failed: {:#}", board.root, e);
                Err(EngineError::TransportFailure(e.to_string()))
            }
        }
    }

    /// Last-N series over already fetched samples, labelled by time of day.
    pub fn realtime(&self, variable: Variable, samples: &[Sample]) -> Result<Rendering, EngineError> {
        let skip = samples.len().saturating_sub(self.realtime_window);
        self.timeline(variable, &samples[skip..], String::new())
    }

    fn timeline(&self, variable: Variable, samples: &[Sample], caption: String) -> Result<Rendering, EngineError> {
        let last = samples.last().ok_or(EngineError::NoData)?;
        Ok(Rendering {
            labels: samples.iter().map(Sample::time_of_day).collect(),
            series: vec![single_series(variable, samples.iter().map(|s| s.value(variable)).collect())],
            caption,
            tier: self.thresholds.evaluate(variable, last.value(variable)),
        })
    }

    fn day_average(&self, variable: Variable, samples: &[Sample], day: NaiveDate) -> Result<Rendering, EngineError> {
        let values: Vec<f64> = samples
            .iter()
            .filter(|s| s.is_on(day))
            .filter_map(|s| s.value(variable))
            .collect();
        if values.is_empty() {
            return Err(EngineError::NoData);
        }

        let mean = round2(values.iter().sum::<f64>() / values.len() as f64);
        Ok(Rendering {
            labels: vec!["avg".to_string()],
            series: vec![single_series(variable, vec![Some(mean)])],
            caption: day.to_string(),
            tier: self.thresholds.evaluate(variable, Some(mean)),
        })
    }

    fn min_max(&self, variable: Variable, samples: &[Sample], caption: String) -> Result<Rendering, EngineError> {
        let (min, max) = samples
            .iter()
            .filter_map(|s| s.value(variable))
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .ok_or(EngineError::NoData)?;

        Ok(Rendering {
            labels: vec!["min".to_string(), "max".to_string()],
            series: vec![single_series(variable, vec![Some(min), Some(max)])],
            caption,
            tier: self.thresholds.evaluate(variable, Some(max)),
        })
    }

    async fn compare_days(
        &self,
        board: &Board,
        variable: Variable,
        first: NaiveDate,
        second: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Rendering, EngineError> {
        let first_window = DayWindow::new(first, start, end);
        let second_window = DayWindow::new(second, start, end);
        let (a, b) = tokio::join!(
            self.samples(board, Some(window_range(&first_window))),
            self.samples(board, Some(window_range(&second_window))),
        );
        let (a, b) = (a?, b?);

        let last = match (a.last(), b.is_empty()) {
            (Some(last), false) => last,
            _ => return Err(EngineError::NoData),
        };

        Ok(Rendering {
            labels: a.iter().map(Sample::time_of_day).collect(),
            series: vec![
                Series::new(first.to_string(), a.iter().map(|s| s.value(variable)).collect()),
                Series::new(second.to_string(), b.iter().map(|s| s.value(variable)).collect()),
            ],
            caption: format!("{} vs {}", first, second),
            tier: self.thresholds.evaluate(variable, last.value(variable)),
        })
    }

    fn out_of_range(&self, variable: Variable, samples: &[Sample]) -> Result<Rendering, EngineError> {
        let threshold = self.thresholds.get(variable);
        let outliers: Vec<Sample> = samples
            .iter()
            .filter(|s| s.value(variable).is_some_and(|v| threshold.is_out_of_range(v)))
            .cloned()
            .collect();
        self.timeline(variable, &outliers, "Out of range".to_string())
    }
}

fn window_range(window: &DayWindow) -> KeyRange {
    KeyRange::new(window.start_key(), window.end_key())
}

fn single_series(variable: Variable, values: Vec<Option<f64>>) -> Series {
    Series::new(variable.key().to_uppercase(), values)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
