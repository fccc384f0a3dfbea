// Monitored variable domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six quantities every board reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Temp,
    Hum,
    Co2,
    Pm1,
    Pm25,
    Pm10,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Temp,
        Variable::Hum,
        Variable::Co2,
        Variable::Pm25,
        Variable::Pm1,
        Variable::Pm10,
    ];

    /// Field name used by the history store records.
    pub fn key(&self) -> &'static str {
        match self {
            Variable::Temp => "temp",
            Variable::Hum => "hum",
            Variable::Co2 => "co2",
            Variable::Pm1 => "pm1",
            Variable::Pm25 => "pm25",
            Variable::Pm10 => "pm10",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variable::Temp => "Temperature (°C)",
            Variable::Hum => "Humidity (%)",
            Variable::Co2 => "CO\u{2082} (ppm)",
            Variable::Pm1 => "PM1.0 (µg/m³)",
            Variable::Pm25 => "PM2.5 (µg/m³)",
            Variable::Pm10 => "PM10 (µg/m³)",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown variable: {0}")]
pub struct UnknownVariable(pub String);

impl FromStr for Variable {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.key() == s)
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!("pm25".parse::<Variable>().unwrap(), Variable::Pm25);
        assert_eq!("co2".parse::<Variable>().unwrap(), Variable::Co2);
        assert!("pm2.5".parse::<Variable>().is_err());
    }
}
