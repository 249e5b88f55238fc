//! Raw table decoding: xlsx workbooks and HTML tables into string frames.
//!
//! Every raw frame holds only `String` columns. Header cells become column
//! names after blank and duplicate names are made unique.

use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use polars::prelude::*;
use scraper::{ElementRef, Html, Selector};

use super::provider::DataError;

/// Build a string frame from a header and rows. Short rows are padded with
/// empty cells, long rows are truncated to the header width.
pub fn frame_from_rows(header: &[String], rows: &[Vec<String>]) -> Result<DataFrame, DataError> {
    let names = unique_names(header);
    let columns = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let values: Vec<String> = rows
                .iter()
                .map(|row| row.get(i).cloned().unwrap_or_default())
                .collect();
            Column::new(name.into(), values)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Build a frame with positional names (`column_0`, `column_1`, ...) from rows
/// of uneven width. The header, if any, stays in the data.
pub fn positional_frame(rows: &[Vec<String>]) -> Result<DataFrame, DataError> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let header: Vec<String> = (0..width).map(|i| format!("column_{i}")).collect();
    frame_from_rows(&header, rows)
}

/// Use the first row as column names and drop it from the data.
pub fn promote_header_row(df: &DataFrame) -> Result<DataFrame, DataError> {
    if df.height() == 0 {
        return Err(DataError::ResponseFormatChanged(
            "table has no header row".into(),
        ));
    }

    let mut header = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let cell = column.str()?.get(0).unwrap_or_default();
        header.push(cell.to_string());
    }

    let mut body = df.slice(1, df.height() - 1);
    let names = unique_names(&header);
    let old: Vec<String> = body
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    for (from, to) in old.iter().zip(names) {
        body.rename(from, to.into())?;
    }
    Ok(body)
}

/// Decode the first worksheet of an xlsx workbook. The first row is the header.
pub fn read_xlsx(bytes: &[u8]) -> Result<DataFrame, DataError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| DataError::ResponseFormatChanged(format!("open xlsx: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::ResponseFormatChanged("workbook has no worksheets".into()))?
        .map_err(|e| DataError::ResponseFormatChanged(format!("read worksheet: {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let header = rows
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("worksheet is empty".into()))?;
    let body: Vec<Vec<String>> = rows.filter(|row| row.iter().any(|c| !c.is_empty())).collect();

    frame_from_rows(&header, &body)
}

/// Extract the rows of the first `<table>` in an HTML document.
pub fn extract_first_table(html: &str) -> Result<Vec<Vec<String>>, DataError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no <table> in page".into()))?;

    let rows: Vec<Vec<String>> = table
        .select(&row_sel)
        .map(|row| row.select(&cell_sel).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return Err(DataError::ResponseFormatChanged("table has no rows".into()));
    }
    Ok(rows)
}

fn selector(css: &str) -> Result<Selector, DataError> {
    Selector::parse(css).map_err(|e| DataError::ResponseFormatChanged(format!("selector {css}: {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    collapse_whitespace(&cell.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => collapse_whitespace(s),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn unique_names(header: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = collapse_whitespace(raw);
            let name = if base.is_empty() {
                format!("column_{i}")
            } else if seen.contains(&base) {
                format!("{base}_{i}")
            } else {
                base
            };
            seen.insert(name.clone());
            name
        })
        .collect()
}
