// Query modes and resolution of UI filter inputs into a mode
use super::sample::range_key;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// One day restricted to a time-of-day window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(day: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { day, start, end }
    }

    pub fn start_key(&self) -> String {
        range_key(self.day, self.start)
    }

    pub fn end_key(&self) -> String {
        range_key(self.day, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Realtime,
    Range(DayWindow),
    DayAverage(NaiveDate),
    DayMinMax(NaiveDate),
    HistoricalMinMax,
    CompareDays {
        first: NaiveDate,
        second: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    OutOfRange,
}

impl Mode {
    pub fn is_realtime(&self) -> bool {
        matches!(self, Mode::Realtime)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Realtime => "realtime",
            Mode::Range(_) => "range",
            Mode::DayAverage(_) => "day_average",
            Mode::DayMinMax(_) => "day_min_max",
            Mode::HistoricalMinMax => "historical_min_max",
            Mode::CompareDays { .. } => "compare_days",
            Mode::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw values of a channel's filter inputs, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub day: Option<String>,
    pub day2: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FilterInputs {
    pub fn is_empty(&self) -> bool {
        [&self.day, &self.day2, &self.start, &self.end]
            .into_iter()
            .all(|field| filled(field).is_none())
    }
}

/// Buttons offered on every channel card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Range,
    Average,
    MinMax,
    Compare,
    OutOfRange,
    Live,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("missing input: {0}")]
    MissingInputs(&'static str),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid time: {0}")]
    InvalidTime(String),
}

fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_day(raw: &str) -> Result<NaiveDate, IntentError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| IntentError::InvalidDate(raw.to_string()))
}

fn parse_time(raw: &str) -> Result<NaiveTime, IntentError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| IntentError::InvalidTime(raw.to_string()))
}

/// Map a button press plus the current inputs to the mode it requests.
pub fn resolve(intent: Intent, inputs: &FilterInputs) -> Result<Mode, IntentError> {
    let day = filled(&inputs.day);
    let day2 = filled(&inputs.day2);
    let start = filled(&inputs.start);
    let end = filled(&inputs.end);

    match intent {
        Intent::Range => match (day, start, end) {
            (Some(d), Some(s), Some(e)) => Ok(Mode::Range(DayWindow::new(
                parse_day(d)?,
                parse_time(s)?,
                parse_time(e)?,
            ))),
            _ => Err(IntentError::MissingInputs("select a date and a time range")),
        },
        Intent::Average => match day {
            Some(d) => Ok(Mode::DayAverage(parse_day(d)?)),
            None => Err(IntentError::MissingInputs("select a date")),
        },
        Intent::MinMax => match day {
            Some(d) => Ok(Mode::DayMinMax(parse_day(d)?)),
            None => Ok(Mode::HistoricalMinMax),
        },
        Intent::Compare => match (day, day2, start, end) {
            (Some(d1), Some(d2), Some(s), Some(e)) => Ok(Mode::CompareDays {
                first: parse_day(d1)?,
                second: parse_day(d2)?,
                start: parse_time(s)?,
                end: parse_time(e)?,
            }),
            _ => Err(IntentError::MissingInputs("select both days and a time range")),
        },
        Intent::OutOfRange => Ok(Mode::OutOfRange),
        Intent::Live => Ok(Mode::Realtime),
    }
}
