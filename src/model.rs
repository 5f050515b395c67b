use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::columns::project_columns;
use crate::domain::{CREATED_ON_COLUMN, DVError, ELAPSED_TIME_FIELD};
use crate::rows::project_rows;

/// Metadata of one input column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub display_name: String,
    /// Display position, lowest first. NaN marks a missing order.
    pub order: f64,
    pub visual_size_factor: u32,
}

impl ColumnDescriptor {
    pub fn new(name: &str, display_name: &str, order: f64, visual_size_factor: u32) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            order,
            visual_size_factor,
        }
    }
}

/// Read access to a single record of a host dataset.
pub trait RowAccessor {
    /// Formatted value of `column`. Unknown columns yield an empty string.
    fn formatted_value(&self, column: &str) -> String;
    fn record_id(&self) -> String;
}

/// Column metadata, display ordered record ids and the records behind them.
#[derive(Debug)]
pub struct Dataset<R> {
    columns: Vec<ColumnDescriptor>,
    sorted_record_ids: Vec<String>,
    records: HashMap<String, R>,
}

impl<R: RowAccessor> Dataset<R> {
    /// Builds a dataset, rejecting duplicate column names, duplicate ids and
    /// ids without a record. With a creation timestamp column present, an
    /// input column named like the derived elapsed time column is a duplicate.
    pub fn new(
        columns: Vec<ColumnDescriptor>,
        sorted_record_ids: Vec<String>,
        records: HashMap<String, R>,
    ) -> Result<Self, DVError> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in columns.iter() {
            if !names.insert(column.name.as_str()) {
                return Err(DVError::DuplicateColumn(column.name.clone()));
            }
        }
        if names.contains(CREATED_ON_COLUMN) && names.contains(ELAPSED_TIME_FIELD) {
            return Err(DVError::DuplicateColumn(ELAPSED_TIME_FIELD.to_string()));
        }

        let mut ids = HashSet::with_capacity(sorted_record_ids.len());
        for id in sorted_record_ids.iter() {
            if !ids.insert(id.as_str()) {
                return Err(DVError::DuplicateRecord(id.clone()));
            }
            if !records.contains_key(id) {
                return Err(DVError::MissingRecord(id.clone()));
            }
        }

        trace!(
            "Dataset: {} columns, {} sorted ids, {} records",
            columns.len(),
            sorted_record_ids.len(),
            records.len()
        );
        Ok(Self {
            columns,
            sorted_record_ids,
            records,
        })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn sorted_record_ids(&self) -> &[String] {
        &self.sorted_record_ids
    }

    pub fn record(&self, id: &str) -> Option<&R> {
        self.records.get(id)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Records in display order. Every sorted id resolves, see [`Dataset::new`].
    pub fn records_in_order(&self) -> impl Iterator<Item = &R> {
        self.sorted_record_ids
            .iter()
            .filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.sorted_record_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_record_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayColumn {
    pub key: String,
    pub name: String,
    pub field_name: String,
    pub min_width: u32,
}

/// One display record. `values` follows the dataset's column order.
#[derive(Debug, PartialEq)]
pub struct DisplayRow<'a, R> {
    pub key: String,
    pub raw: &'a R,
    pub values: Vec<(String, String)>,
    pub elapsed_time: Option<String>,
}

impl<R> DisplayRow<'_, R> {
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, PartialEq)]
pub struct ViewModel<'a, R> {
    pub columns: Vec<DisplayColumn>,
    pub rows: Vec<DisplayRow<'a, R>>,
}

/// Runs both projections over the same dataset.
pub fn project_view<R: RowAccessor>(dataset: &Dataset<R>) -> ViewModel<'_, R> {
    ViewModel {
        columns: project_columns(dataset.columns()),
        rows: project_rows(dataset),
    }
}
