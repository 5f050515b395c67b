use tracing::trace;

use crate::domain::{
    CREATED_ON_COLUMN, ELAPSED_TIME_FIELD, ELAPSED_TIME_LABEL, ELAPSED_TIME_MIN_WIDTH,
};
use crate::model::{ColumnDescriptor, DisplayColumn};

/// Builds the display schema: the creation timestamp column is hidden, the
/// rest is ordered by `order`, and an elapsed time column closes the list when
/// the timestamp column was present.
pub fn project_columns(columns: &[ColumnDescriptor]) -> Vec<DisplayColumn> {
    let mut visible: Vec<&ColumnDescriptor> = columns
        .iter()
        .filter(|c| c.name != CREATED_ON_COLUMN)
        .collect();
    // Stable, so ties keep their input order.
    visible.sort_by(|a, b| order_key(a).total_cmp(&order_key(b)));

    let mut mapped: Vec<DisplayColumn> = visible
        .into_iter()
        .map(|c| DisplayColumn {
            key: c.name.clone(),
            name: c.display_name.clone(),
            field_name: c.name.clone(),
            min_width: c.visual_size_factor,
        })
        .collect();

    if columns.iter().any(|c| c.name == CREATED_ON_COLUMN) {
        mapped.push(elapsed_time_column());
    }

    trace!("Mapped columns: {:?}", mapped);
    mapped
}

pub fn elapsed_time_column() -> DisplayColumn {
    DisplayColumn {
        key: ELAPSED_TIME_FIELD.to_string(),
        name: ELAPSED_TIME_LABEL.to_string(),
        field_name: ELAPSED_TIME_FIELD.to_string(),
        min_width: ELAPSED_TIME_MIN_WIDTH,
    }
}

// Columns without a usable order go last.
fn order_key(column: &ColumnDescriptor) -> f64 {
    if column.order.is_nan() {
        f64::INFINITY
    } else {
        column.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, order: f64) -> ColumnDescriptor {
        ColumnDescriptor::new(name, &name.to_uppercase(), order, 50)
    }

    fn keys(columns: &[DisplayColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn sorts_by_order_regardless_of_input_position() {
        let out = project_columns(&[col("c", 3.0), col("a", 1.0), col("b", 2.0)]);
        assert_eq!(keys(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn maps_descriptor_fields() {
        let out = project_columns(&[ColumnDescriptor::new("title", "Title", 1.0, 150)]);
        assert_eq!(
            out,
            vec![DisplayColumn {
                key: "title".into(),
                name: "Title".into(),
                field_name: "title".into(),
                min_width: 150,
            }]
        );
    }

    #[test]
    fn without_timestamp_column_count_is_unchanged() {
        let input = [col("a", 0.0), col("b", 1.0)];
        let out = project_columns(&input);
        assert_eq!(out.len(), input.len());
        assert!(out.iter().all(|c| c.key != ELAPSED_TIME_FIELD));
    }

    #[test]
    fn timestamp_column_is_replaced_by_trailing_elapsed_time() {
        // The synthetic column goes last even though createdon sorts first.
        let out = project_columns(&[col("b", 2.0), col(CREATED_ON_COLUMN, 0.0), col("a", 1.0)]);
        assert_eq!(keys(&out), vec!["a", "b", ELAPSED_TIME_FIELD]);
        assert_eq!(out.last(), Some(&elapsed_time_column()));
    }

    #[test]
    fn timestamp_match_is_case_sensitive() {
        let out = project_columns(&[col("CreatedOn", 0.0)]);
        assert_eq!(keys(&out), vec!["CreatedOn"]);
    }

    #[test]
    fn missing_order_sorts_last_and_ties_keep_input_order() {
        let out = project_columns(&[
            col("x", f64::NAN),
            col("b", 1.0),
            col("a", 1.0),
            col("y", f64::NAN),
            col("first", -1.0),
        ]);
        assert_eq!(keys(&out), vec!["first", "b", "a", "x", "y"]);
    }

    #[test]
    fn empty_input_gives_empty_schema() {
        assert!(project_columns(&[]).is_empty());
    }
}
