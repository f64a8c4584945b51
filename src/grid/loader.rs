// src/grid/loader.rs
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::grid::{Cell, Grid};
use crate::utils::error::LoadError;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "ods"];

/// Loads a report into memory as a `Grid`.
///
/// Spreadsheets go through calamine (first sheet unless `sheet` names one);
/// `.csv` files go through the csv crate. Cell type distinctions and the
/// authored row/column order are kept, and the grid origin is always A1.
pub fn load_grid<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<Grid, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let grid = if extension == "csv" {
        if sheet.is_some() {
            tracing::warn!("Sheet selection ignored for CSV input: {}", path.display());
        }
        let file = std::fs::File::open(path)?;
        read_csv_grid(file)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        load_workbook_grid(path, sheet)?
    } else {
        return Err(LoadError::UnsupportedFormat(path.display().to_string()));
    };

    if grid.is_empty() {
        tracing::warn!("Document {} contains no cells", path.display());
    }
    tracing::info!(
        "Loaded grid from {}: {} rows x {} columns",
        path.display(),
        grid.height(),
        grid.width()
    );
    Ok(grid)
}

fn load_workbook_grid(path: &Path, sheet: Option<&str>) -> Result<Grid, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound(name.to_string()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::NoSheets(path.display().to_string()))?,
    };
    tracing::debug!("Reading sheet '{}' of {}", sheet_name, path.display());

    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(grid_from_range(&range))
}

/// Converts a calamine range into a grid anchored at A1.
///
/// calamine ranges start at the first used cell, so leading blank rows and
/// columns are restored as empty cells to keep absolute positions intact.
pub fn grid_from_range(range: &Range<Data>) -> Grid {
    let (start, end) = match (range.start(), range.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Grid::default(),
    };

    let height = end.0 as usize + 1;
    let width = end.1 as usize + 1;
    let mut rows = vec![vec![Cell::Empty; width]; height];

    for (row, col, value) in range.cells() {
        let abs_row = start.0 as usize + row;
        let abs_col = start.1 as usize + col;
        rows[abs_row][abs_col] = cell_from_data(value);
    }

    Grid::from_rows(rows)
}

fn cell_from_data(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}

/// Reads a header-less CSV grid. Ragged records are allowed and padded.
///
/// Blank lines stay in the grid as empty rows, since they end dynamic
/// sections. A record whose quoted field spans several lines is kept whole.
pub fn read_csv_grid<R: Read>(mut reader: R) -> Result<Grid, LoadError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    let mut rows = Vec::new();
    let mut pending = String::new();
    let mut pending_lines = 0usize;

    for line in input.lines() {
        if pending_lines > 0 {
            pending.push('\n');
        }
        pending.push_str(line);
        pending_lines += 1;

        // Odd quote count: a quoted field is still open
        if pending.matches('"').count() % 2 == 1 {
            continue;
        }
        rows.push(parse_csv_record(&pending)?);
        pending.clear();
        pending_lines = 0;
    }
    if pending_lines > 0 {
        rows.push(parse_csv_record(&pending)?);
    }

    Ok(Grid::from_rows(rows))
}

fn parse_csv_record(text: &str) -> Result<Vec<Cell>, LoadError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    match csv_reader.records().next() {
        Some(record) => Ok(record?.iter().map(cell_from_field).collect()),
        None => Ok(Vec::new()),
    }
}

fn cell_from_field(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(field.to_string()),
    }
}
