use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use dsview::domain::{DEFAULT_MAX_COLUMN_WIDTH, DVError, ELAPSED_TIME_FIELD, ViewerConfig};
use dsview::frame::load_dataset;
use dsview::{ViewModel, project_view};

/// Print a data file as display rows with the elapsed time between records.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV, Parquet or Arrow IPC file. Rows must already be in display order.
    path: String,

    /// Column holding the record ids (defaults to row numbers)
    #[arg(long)]
    id_column: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    max_column_width: usize,

    /// Print at most this many rows
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> ExitCode {
    init_tracing();
    match run(Args::parse()) {
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(ErrorLayer::default())
        .init();
}

fn run(args: Args) -> Result<(), DVError> {
    let path = shellexpand::full(&args.path)
        .map_err(|e| DVError::LoadingFailed(e.to_string()))?
        .into_owned();
    let cfg = ViewerConfig::default()
        .id_column(args.id_column)
        .max_column_width(args.max_column_width)
        .limit(args.limit);
    debug!("Config: {:?}", cfg);

    let dataset = load_dataset(PathBuf::from(path), &cfg)?;
    let view = project_view(&dataset);
    info!(
        "Projected {} columns, {} rows",
        view.columns.len(),
        view.rows.len()
    );

    let mut out = io::stdout().lock();
    write_table(&mut out, &view, &cfg)?;
    out.flush()?;
    Ok(())
}

fn write_table<R>(
    out: &mut impl Write,
    view: &ViewModel<'_, R>,
    cfg: &ViewerConfig,
) -> io::Result<()> {
    let rows = &view.rows[..cfg.limit.unwrap_or(view.rows.len()).min(view.rows.len())];

    let cells: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| {
            view.columns
                .iter()
                .map(|c| match &row.elapsed_time {
                    Some(elapsed) if c.field_name == ELAPSED_TIME_FIELD => elapsed.as_str(),
                    _ => row.value(&c.field_name).unwrap_or(""),
                })
                .collect()
        })
        .collect();

    // Columns are at least `min_width` wide, and never wider than the cap.
    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(cidx, c)| {
            cells
                .iter()
                .map(|r| r[cidx].chars().count())
                .chain([c.name.chars().count(), c.min_width as usize])
                .max()
                .unwrap_or(0)
                .min(cfg.max_column_width)
        })
        .collect();

    let header: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
    write_line(out, &header, &widths)?;
    for row in cells.iter() {
        write_line(out, row, &widths)?;
    }
    Ok(())
}

fn write_line(out: &mut impl Write, cells: &[&str], widths: &[usize]) -> io::Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", visible_text(cell, width)))
        .collect();
    writeln!(out, "{}", line.join(" ").trim_end())
}

// Shortens text that does not fit, marking the cut with "...".
fn visible_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width < 3 {
        return String::new();
    }
    let mut reduced: String = text.chars().take(width - 3).collect();
    reduced.push_str("...");
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsview::{DisplayColumn, DisplayRow};

    #[test]
    fn visible_text_cuts_long_values() {
        assert_eq!(visible_text("Email", 10), "Email");
        assert_eq!(visible_text("Quarterly review", 10), "Quarter...");
        assert_eq!(visible_text("Quarterly review", 2), "");
    }

    fn column(key: &str, name: &str, min_width: u32) -> DisplayColumn {
        DisplayColumn {
            key: key.to_string(),
            name: name.to_string(),
            field_name: key.to_string(),
            min_width,
        }
    }

    #[test]
    fn write_table_honours_min_width_and_cap() {
        let view = ViewModel {
            columns: vec![
                column("title", "Title", 8),
                column(ELAPSED_TIME_FIELD, "Elapsed Time", 100),
            ],
            rows: vec![
                DisplayRow {
                    key: "a".to_string(),
                    raw: &(),
                    values: vec![("title".to_string(), "Call".to_string())],
                    elapsed_time: None,
                },
                DisplayRow {
                    key: "b".to_string(),
                    raw: &(),
                    values: vec![("title".to_string(), "Email".to_string())],
                    elapsed_time: Some("1m 30s".to_string()),
                },
            ],
        };
        let cfg = ViewerConfig::default().max_column_width(14);
        let mut buf = Vec::new();
        write_table(&mut buf, &view, &cfg).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Title    Elapsed Time", "Call", "Email    1m 30s"]);
    }

    #[test]
    fn write_table_respects_limit() {
        let view = ViewModel {
            columns: vec![column("title", "Title", 0)],
            rows: ["a", "b", "c"]
                .iter()
                .map(|&k| DisplayRow {
                    key: k.to_string(),
                    raw: &(),
                    values: vec![("title".to_string(), k.to_string())],
                    elapsed_time: None,
                })
                .collect(),
        };
        let cfg = ViewerConfig::default().limit(Some(2));
        let mut buf = Vec::new();
        write_table(&mut buf, &view, &cfg).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Title\na\nb\n");
    }

    #[test]
    fn write_line_pads_cells() {
        let mut buf = Vec::new();
        write_line(&mut buf, &["ab", "c"], &[4, 3]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "ab   c\n");
    }
}
