// Query-mode and refresh engine for a multi-board environmental sensor dashboard
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::chart_sink::ChartSink;
pub use application::error::{ControlError, EngineError};
pub use application::history_store::{DeviceDirectory, HistoryStore, KeyRange};
pub use domain::mode::{FilterInputs, Intent, Mode};
pub use domain::variable::Variable;
pub use presentation::dashboard::Dashboard;
