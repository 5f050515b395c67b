use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::{COLUMN_WIDTH_MARGIN, DVError, NULL_VALUE, ViewerConfig};
use crate::model::{ColumnDescriptor, Dataset, RowAccessor};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

// One loaded column, all values already formatted.
#[derive(Debug)]
struct FrameColumn {
    name: String,
    max_width: usize,
    data: Vec<String>,
}

#[derive(Debug)]
struct FrameColumns {
    index: HashMap<String, usize>,
    columns: Vec<FrameColumn>,
}

/// A row of a loaded data frame. Rows share the column storage.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    id: String,
    row: usize,
    frame: Arc<FrameColumns>,
}

impl RowAccessor for FrameRecord {
    fn formatted_value(&self, column: &str) -> String {
        self.frame
            .index
            .get(column)
            .and_then(|&cidx| self.frame.columns[cidx].data.get(self.row))
            .cloned()
            .unwrap_or_default()
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// Loads a CSV, Parquet or Arrow IPC file as a dataset in file order.
pub fn load_dataset(path: PathBuf, config: &ViewerConfig) -> Result<Dataset<FrameRecord>, DVError> {
    let path = check_file(path)?;
    let frame = match detect_file_type(&path)? {
        FileType::CSV => load_csv(&path)?,
        FileType::PARQUET => load_parquet(&path)?,
        FileType::ARROW => load_arrow(&path)?,
    };
    let df = frame.collect()?;
    info!("Loaded {} rows from {}", df.height(), path.display());
    dataset_from_frame(&df, config)
}

/// Turns a data frame into a dataset. Column order in the frame becomes the
/// display order, row order becomes the record order.
pub fn dataset_from_frame(
    df: &DataFrame,
    config: &ViewerConfig,
) -> Result<Dataset<FrameRecord>, DVError> {
    let start_time = Instant::now();

    // Each column is formatted on its own thread.
    let columns: Result<Vec<FrameColumn>, PolarsError> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(df, name))
        .collect();
    let columns = columns?;
    debug!(
        "Formatting {} columns took {}ms",
        columns.len(),
        start_time.elapsed().as_millis()
    );

    let descriptors: Vec<ColumnDescriptor> = columns
        .iter()
        .enumerate()
        .map(|(idx, c)| ColumnDescriptor {
            name: c.name.clone(),
            display_name: c.name.clone(),
            order: idx as f64,
            visual_size_factor: size_factor(column_width(c, config.max_column_width)),
        })
        .collect();

    let index: HashMap<String, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.name.clone(), idx))
        .collect();
    let id_column = match &config.id_column {
        Some(name) => Some(
            *index
                .get(name)
                .ok_or_else(|| DVError::UnknownColumn(name.clone()))?,
        ),
        None => None,
    };

    let frame = Arc::new(FrameColumns { index, columns });
    let mut sorted_ids = Vec::with_capacity(df.height());
    let mut records = HashMap::with_capacity(df.height());
    for row in 0..df.height() {
        let id = match id_column {
            Some(cidx) => frame.columns[cidx].data[row].clone(),
            None => (row + 1).to_string(),
        };
        sorted_ids.push(id.clone());
        let record = FrameRecord {
            id: id.clone(),
            row,
            frame: Arc::clone(&frame),
        };
        records.insert(id, record);
    }

    // Repeated ids show up twice in `sorted_ids` and are rejected there.
    Dataset::new(descriptors, sorted_ids, records)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<FrameColumn, PolarsError> {
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let mut data = Vec::with_capacity(series.len());

    let mut max_width = 0;
    for value in series.into_iter() {
        let ss = match value {
            Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
            None => String::from(NULL_VALUE),
        };
        max_width = max_width.max(ss.chars().count());
        data.push(ss);
    }

    Ok(FrameColumn {
        name: col_name.to_string(),
        max_width,
        data,
    })
}

fn column_width(column: &FrameColumn, max_column_width: usize) -> usize {
    let width = column.name.chars().count().max(column.max_width) + COLUMN_WIDTH_MARGIN;
    width.min(max_column_width)
}

// Saturates instead of wrapping for widths beyond `u32`.
fn size_factor(width: usize) -> u32 {
    u32::try_from(width).unwrap_or(u32::MAX)
}

fn check_file(path: PathBuf) -> Result<PathBuf, DVError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DVError::FileNotFound,
        ErrorKind::PermissionDenied => DVError::PermissionDenied,
        _ => DVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DVError::LoadingFailed("Not a file!".into()));
    }
    Ok(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, DVError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DVError::UnknownFileType),
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
