// Export service - CSV download of a board's history
use crate::application::active_board::ActiveBoard;
use crate::application::error::EngineError;
use crate::application::history_store::KeyRange;
use crate::application::mode_executor::ModeExecutor;
use crate::domain::sample::{range_key, Sample};
use crate::domain::variable::Variable;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;

const SEPARATOR: char = ';';
const COLUMNS: [Variable; 6] = [
    Variable::Temp,
    Variable::Hum,
    Variable::Co2,
    Variable::Pm1,
    Variable::Pm25,
    Variable::Pm10,
];

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub struct ExportService {
    executor: Arc<ModeExecutor>,
    active: ActiveBoard,
    board_wait: Duration,
}

impl ExportService {
    pub fn new(executor: Arc<ModeExecutor>, active: ActiveBoard, board_wait: Duration) -> Self {
        Self {
            executor,
            active,
            board_wait,
        }
    }

    /// All samples from the start of `from` to the end of `to`, as CSV.
    pub async fn export_csv(&self, from: NaiveDate, to: NaiveDate) -> Result<CsvExport, EngineError> {
        let board = self
            .active
            .wait(self.board_wait)
            .await
            .ok_or(EngineError::NoBoardSelected)?;

        let range = KeyRange::new(
            range_key(from, NaiveTime::default()),
            range_key(to, NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()),
        );
        let samples = self.executor.samples(&board, Some(range)).await?;
        if samples.is_empty() {
            return Err(EngineError::NoData);
        }

        tracing::info!("Exporting {} samples of {}", samples.len(), board.id);
        Ok(CsvExport {
            file_name: format!("data_{}_{}_to_{}.csv", board.id, from, to),
            content: to_csv(&samples),
        })
    }
}

/// Semicolon-separated, CRLF line endings, UTF-8 BOM so spreadsheet tools
/// pick up the encoding.
pub fn to_csv(samples: &[Sample]) -> String {
    let sep = SEPARATOR.to_string();
    let header = std::iter::once("timestamp")
        .chain(COLUMNS.iter().map(Variable::key))
        .collect::<Vec<_>>()
        .join(&sep);

    let rows = samples.iter().map(|s| {
        std::iter::once(escape(&s.key))
            .chain(
                COLUMNS
                    .iter()
                    .map(|v| s.value(*v).map(|x| x.to_string()).unwrap_or_default()),
            )
            .collect::<Vec<_>>()
            .join(&sep)
    });

    let mut out = String::from('\u{feff}');
    out.push_str(
        &std::iter::once(header)
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\r\n"),
    );
    out
}

fn escape(field: &str) -> String {
    if field.contains([SEPARATOR, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryStore;
    use crate::domain::board::Board;
    use crate::domain::threshold::ThresholdTable;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let samples = vec![
            Sample::new("2024-01-01T08:00:00", [(Variable::Temp, 21.5), (Variable::Pm25, 7.0)]),
            Sample::new("odd;key", [(Variable::Co2, 415.0)]),
        ];

        let csv = to_csv(&samples);
        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(lines[0], "timestamp;temp;hum;co2;pm1;pm25;pm10");
        assert_eq!(lines[1], "2024-01-01T08:00:00;21.5;;;;7;");
        assert_eq!(lines[2], "\"odd;key\";;;415;;;");
    }

    #[tokio::test]
    async fn test_export_covers_whole_days() {
        let store = Arc::new(MemoryStore::with_root(
            "lab/historial",
            vec![
                ("2024-01-01T00:00:00".into(), json!({"temp": 1.0})),
                ("2024-01-02T23:59:59".into(), json!({"temp": 2.0})),
                ("2024-01-03T00:00:00".into(), json!({"temp": 3.0})),
            ],
        ));
        let active = ActiveBoard::new();
        active.set(Board::new("lab", "historial"));
        let executor = Arc::new(ModeExecutor::new(store.clone(), ThresholdTable::default(), 25));
        let export = ExportService::new(executor, active, Duration::from_millis(10));

        let csv = export.export_csv(day("2024-01-01"), day("2024-01-02")).await.unwrap();
        assert_eq!(csv.file_name, "data_lab_2024-01-01_to_2024-01-02.csv");
        assert_eq!(csv.content.split("\r\n").count(), 3);

        let err = export
            .export_csv(day("2024-02-01"), day("2024-02-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NoData));
    }
}
