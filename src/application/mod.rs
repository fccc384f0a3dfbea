// Application layer - Use cases and ports
pub mod active_board;
pub mod admin_service;
pub mod board_registry;
pub mod channel_controller;
pub mod chart_sink;
pub mod error;
pub mod export_service;
pub mod history_store;
pub mod mode_executor;
pub mod refresh_scheduler;

#[cfg(test)]
pub(crate) mod testing;
