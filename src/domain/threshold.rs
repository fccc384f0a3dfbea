// Threshold table and status evaluation
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Normal,
    Warning,
    Critical,
}

impl Tier {
    pub fn message(&self) -> &'static str {
        match self {
            Tier::Normal => "Within normal range",
            Tier::Warning => "Elevated - keep an eye on it",
            Tier::Critical => "High - check now",
        }
    }
}

/// Floor plus the two ceilings that split a variable's values into tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub floor: f64,
    pub normal: f64,
    pub warn: f64,
}

impl Threshold {
    pub const fn new(floor: f64, normal: f64, warn: f64) -> Self {
        Self { floor, normal, warn }
    }

    pub fn tier(&self, value: f64) -> Tier {
        if value <= self.normal {
            Tier::Normal
        } else if value <= self.warn {
            Tier::Warning
        } else {
            Tier::Critical
        }
    }

    /// Values equal to the floor or the warn ceiling count as in range.
    pub fn is_out_of_range(&self, value: f64) -> bool {
        value > self.warn || value < self.floor
    }

    /// Human-readable bounds for the normal, warning and critical bands.
    pub fn legend(&self) -> [String; 3] {
        [
            format!("≤ {}", self.normal),
            format!("{} – {}", self.normal + 1.0, self.warn),
            format!("> {}", self.warn),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    rows: HashMap<Variable, Threshold>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let rows = HashMap::from([
            (Variable::Temp, Threshold::new(18.0, 28.0, 32.0)),
            (Variable::Hum, Threshold::new(40.0, 60.0, 75.0)),
            (Variable::Co2, Threshold::new(400.0, 1000.0, 1500.0)),
            (Variable::Pm25, Threshold::new(0.0, 35.0, 55.0)),
            (Variable::Pm1, Threshold::new(0.0, 20.0, 35.0)),
            (Variable::Pm10, Threshold::new(0.0, 50.0, 75.0)),
        ]);
        Self { rows }
    }
}

impl ThresholdTable {
    pub fn empty() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    pub fn with(mut self, variable: Variable, threshold: Threshold) -> Self {
        self.rows.insert(variable, threshold);
        self
    }

    /// Row for a variable, falling back to PM2.5, then to the built-in PM2.5 row.
    pub fn get(&self, variable: Variable) -> Threshold {
        self.rows
            .get(&variable)
            .or_else(|| self.rows.get(&Variable::Pm25))
            .copied()
            .unwrap_or(Threshold::new(0.0, 35.0, 55.0))
    }

    /// `None` for a missing value, so the caller keeps its previous tier.
    pub fn evaluate(&self, variable: Variable, value: Option<f64>) -> Option<Tier> {
        value
            .filter(|v| v.is_finite())
            .map(|v| self.get(variable).tier(v))
    }
}
