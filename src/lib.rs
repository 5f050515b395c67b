//! Shapes a tabular dataset into display-ready columns and rows.
//!
//! The creation timestamp column (`createdon`) is hidden from the output and
//! replaced by a trailing "Elapsed Time" column holding the time since the
//! previous row.

pub mod columns;
pub mod domain;
pub mod duration;
pub mod frame;
pub mod model;
pub mod rows;

pub use columns::project_columns;
pub use domain::{DVError, ViewerConfig};
pub use duration::format_elapsed;
pub use model::{
    ColumnDescriptor, Dataset, DisplayColumn, DisplayRow, RowAccessor, ViewModel, project_view,
};
pub use rows::project_rows;
