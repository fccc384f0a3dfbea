// Chart sink that writes every update to the log
use crate::application::chart_sink::ChartSink;
use crate::domain::channel::Series;
use crate::domain::threshold::Tier;
use crate::domain::variable::Variable;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChartSink;

impl ChartSink for TracingChartSink {
    fn render(&self, variable: Variable, labels: &[String], series: &[Series]) {
        for s in series {
            let latest = s.values.iter().rev().find_map(|v| *v);
            tracing::info!(
                "{} [{}] {} points, latest {:?} ({} .. {})",
                variable.title(),
                s.name,
                s.values.len(),
                latest,
                labels.first().map(String::as_str).unwrap_or("-"),
                labels.last().map(String::as_str).unwrap_or("-"),
            );
        }
    }

    fn reset(&self, variable: Variable) {
        tracing::debug!("{} reset", variable);
    }

    fn status(&self, variable: Variable, tier: Tier) {
        match tier {
            Tier::Normal => tracing::info!("{}: {}", variable, tier.message()),
            Tier::Warning | Tier::Critical => tracing::warn!("{}: {}", variable, tier.message()),
        }
    }

    fn caption(&self, variable: Variable, text: &str) {
        if !text.is_empty() {
            tracing::debug!("{} showing {}", variable, text);
        }
    }
}
