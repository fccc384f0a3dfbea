// Output port towards the chart layer
use crate::domain::channel::Series;
use crate::domain::threshold::Tier;
use crate::domain::variable::Variable;

pub trait ChartSink: Send + Sync {
    /// Replace everything plotted for a channel.
    fn render(&self, variable: Variable, labels: &[String], series: &[Series]);

    /// Drop back to a single empty series.
    fn reset(&self, variable: Variable);

    fn status(&self, _variable: Variable, _tier: Tier) {}

    fn caption(&self, _variable: Variable, _text: &str) {}
}
