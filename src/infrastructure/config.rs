use crate::application::channel_controller::RenderOrdering;
use crate::application::mode_executor::DEFAULT_REALTIME_WINDOW;
use crate::domain::threshold::{Threshold, ThresholdTable};
use crate::domain::variable::Variable;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub store: StoreSettings,
    pub engine: EngineSettings,
    pub thresholds: HashMap<Variable, Threshold>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreSettings {
    pub database_url: String,
    pub data_path: String,
    pub boards_path: String,
    pub history_suffix: String,
    pub auth_token: Option<String>,
    pub request_timeout_ms: u64,
    pub directory_poll_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: "http://localhost:9000".to_string(),
            data_path: "data".to_string(),
            boards_path: "boards".to_string(),
            history_suffix: "historial".to_string(),
            auth_token: None,
            request_timeout_ms: 15_000,
            directory_poll_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub realtime_window: usize,
    pub refresh_period_ms: u64,
    pub board_wait_ms: u64,
    pub store_wait_ms: u64,
    pub render_ordering: RenderOrdering,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            realtime_window: DEFAULT_REALTIME_WINDOW,
            refresh_period_ms: 60_000,
            board_wait_ms: 6_000,
            store_wait_ms: 8_000,
            render_ordering: RenderOrdering::default(),
        }
    }
}

impl EngineSettings {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms)
    }

    pub fn board_wait(&self) -> Duration {
        Duration::from_millis(self.board_wait_ms)
    }

    pub fn store_wait(&self) -> Duration {
        Duration::from_millis(self.store_wait_ms)
    }
}

impl DashboardConfig {
    /// Built-in table with any configured rows layered on top.
    pub fn threshold_table(&self) -> ThresholdTable {
        self.thresholds
            .iter()
            .fold(ThresholdTable::default(), |table, (variable, threshold)| {
                table.with(*variable, *threshold)
            })
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
