use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, trace, warn};

use crate::domain::CREATED_ON_COLUMN;
use crate::duration::format_elapsed;
use crate::model::{Dataset, DisplayRow, RowAccessor};

// Layouts tried after RFC 3339. Values without an offset are read as UTC.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

const NAIVE_DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Builds one display row per sorted record id, in that order.
///
/// When the dataset has a creation timestamp column, every row after the
/// first carries the time elapsed since its predecessor. Rows whose own or
/// predecessor's timestamp cannot be parsed get no elapsed time.
pub fn project_rows<R: RowAccessor>(dataset: &Dataset<R>) -> Vec<DisplayRow<'_, R>> {
    let has_created_on = dataset.has_column(CREATED_ON_COLUMN);
    let fields: Vec<&str> = dataset
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .filter(|&name| name != CREATED_ON_COLUMN)
        .collect();

    let mut previous: Option<&R> = None;
    let rows: Vec<DisplayRow<'_, R>> = dataset
        .records_in_order()
        .enumerate()
        .map(|(idx, record)| {
            let values = fields
                .iter()
                .map(|&field| {
                    let value = record.formatted_value(field);
                    trace!("Row {idx}: {field} = {value:?}");
                    (field.to_string(), value)
                })
                .collect();

            let elapsed_time = match previous {
                Some(prev) if has_created_on => elapsed_between(idx, prev, record),
                _ => None,
            };
            previous = Some(record);

            DisplayRow {
                key: record.record_id(),
                raw: record,
                values,
                elapsed_time,
            }
        })
        .collect();

    debug!(
        "Projected {} rows (elapsed time: {})",
        rows.len(),
        has_created_on
    );
    rows
}

fn elapsed_between<R: RowAccessor>(idx: usize, previous: &R, current: &R) -> Option<String> {
    let prev_raw = previous.formatted_value(CREATED_ON_COLUMN);
    let curr_raw = current.formatted_value(CREATED_ON_COLUMN);
    match (parse_timestamp(&prev_raw), parse_timestamp(&curr_raw)) {
        (Some(prev), Some(curr)) => {
            // Not clamped: out of order input shows up as a negative duration.
            let elapsed_seconds = (curr - prev) as f64 / 1000.0;
            let elapsed = format_elapsed(elapsed_seconds);
            trace!("Elapsed time for row {idx}: {elapsed}");
            Some(elapsed)
        }
        _ => {
            warn!(
                "Row {idx}: cannot derive elapsed time from {CREATED_ON_COLUMN} values {prev_raw:?} -> {curr_raw:?}"
            );
            None
        }
    }
}

/// Parses a formatted timestamp into epoch milliseconds.
///
/// Accepts RFC 3339, ISO dates with minute precision and an offset
/// (`2024-05-01T10:00Z`), the naive layouts above, and the bare dates
/// `2024-05-01` and `5/1/2024` (midnight UTC). Month and day may be one or
/// two digits.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.timestamp_millis());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
