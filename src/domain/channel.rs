// Per-variable channel state
use super::mode::{FilterInputs, Mode};
use super::threshold::Tier;
use super::variable::Variable;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// What a channel currently shows: one label axis shared by one or more series.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub caption: String,
    pub tier: Option<Tier>,
}

impl Rendering {
    /// Single empty series, nothing plotted.
    pub fn baseline(variable: Variable) -> Self {
        Self {
            labels: Vec::new(),
            series: vec![Series::new(variable.key().to_uppercase(), Vec::new())],
            caption: String::new(),
            tier: None,
        }
    }
}

/// Immutable channel record. Every transition returns a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub variable: Variable,
    pub mode: Mode,
    pub inputs: FilterInputs,
    pub rendering: Rendering,
    pub tier: Option<Tier>,
    /// Bumped on every mode entry; fetch results carry the value they started with.
    pub generation: u64,
}

impl Channel {
    pub fn new(variable: Variable) -> Self {
        Self {
            variable,
            mode: Mode::Realtime,
            inputs: FilterInputs::default(),
            rendering: Rendering::baseline(variable),
            tier: None,
            generation: 0,
        }
    }

    /// Switch mode, dropping whatever was on display.
    pub fn enter(&self, mode: Mode) -> Self {
        Self {
            mode,
            rendering: Rendering::baseline(self.variable),
            generation: self.generation + 1,
            ..self.clone()
        }
    }

    pub fn with_inputs(&self, inputs: FilterInputs) -> Self {
        Self {
            inputs,
            ..self.clone()
        }
    }

    /// Show a finished result. A result without a tier keeps the previous one.
    pub fn apply(&self, rendering: Rendering) -> Self {
        Self {
            tier: rendering.tier.or(self.tier),
            rendering,
            ..self.clone()
        }
    }
}

/// Finite map from variable to its channel, one entry per variable.
pub type ChannelMap = BTreeMap<Variable, Channel>;

pub fn initial_channels() -> ChannelMap {
    Variable::ALL
        .into_iter()
        .map(|v| (v, Channel::new(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_enter_resets_to_single_series() {
        let channel = Channel::new(Variable::Temp).apply(Rendering {
            labels: vec!["08:00".into()],
            series: vec![Series::new("a", vec![Some(1.0)]), Series::new("b", vec![Some(2.0)])],
            caption: "x vs y".into(),
            tier: Some(Tier::Warning),
        });

        let next = channel.enter(Mode::Realtime);
        assert_eq!(next.rendering.series.len(), 1);
        assert!(next.rendering.labels.is_empty());
        assert_eq!(next.generation, channel.generation + 1);
        assert_eq!(next.tier, Some(Tier::Warning));
    }

    #[test]
    fn test_apply_without_tier_keeps_previous() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let channel = Channel::new(Variable::Hum)
            .enter(Mode::DayAverage(day))
            .apply(Rendering {
                tier: Some(Tier::Critical),
                ..Rendering::baseline(Variable::Hum)
            });
        let next = channel.apply(Rendering::baseline(Variable::Hum));
        assert_eq!(next.tier, Some(Tier::Critical));
        assert_eq!(next.mode, Mode::DayAverage(day));
    }

    #[test]
    fn test_initial_channels_cover_all_variables() {
        let channels = initial_channels();
        assert_eq!(channels.len(), 6);
        assert!(channels.values().all(|c| c.mode.is_realtime()));
    }
}
