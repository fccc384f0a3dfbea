// Presentation layer - Facade and output adapters
pub mod chart_log;
pub mod dashboard;
