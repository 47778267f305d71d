//! HTML report document model.
//!
//! Platform exports are HTML pages with one or more `<table>` blocks. This
//! module flattens each table into rows of optional cell strings so the
//! classifier and the parsers never touch HTML directly.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{EngineError, Result};

/// One embedded table: rows of cells, `None` for an empty cell.
///
/// Every row is padded to the table width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from raw rows, padding short rows with empty cells.
    #[must_use]
    pub fn from_rows(mut rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, None);
        }
        Self { rows }
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Cell text at (`row`, `col`), if present and non-empty.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// A raw report: its file name and the tables found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    file_name: String,
    tables: Vec<Table>,
}

impl RawReport {
    /// Assemble a report from already extracted tables.
    pub fn new(file_name: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            file_name: file_name.into(),
            tables,
        }
    }

    /// Parse the raw bytes of an HTML report.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; a document with no
    /// non-empty table is an [`EngineError::UnrecognizedFormat`].
    pub fn from_html(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let file_name = file_name.into();
        let text = String::from_utf8_lossy(bytes);
        let tables = extract_tables(&text);

        if tables.is_empty() {
            return Err(EngineError::UnrecognizedFormat {
                file: file_name,
                reason: "document contains no tables".to_string(),
            });
        }

        debug!(file = %file_name, tables = tables.len(), "Extracted report tables");
        Ok(Self { file_name, tables })
    }

    /// Report file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Tables in document order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

#[allow(clippy::expect_used)] // Selectors are compile-time constants; parse cannot fail
fn extract_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector is valid");
    let row_sel = Selector::parse("tr").expect("tr selector is valid");
    let cell_sel = Selector::parse("td, th").expect("cell selector is valid");

    document
        .select(&table_sel)
        .map(|table| {
            let rows = table
                .select(&row_sel)
                .filter(|tr| owning_table(*tr).is_some_and(|t| t.id() == table.id()))
                .map(|tr| {
                    tr.select(&cell_sel)
                        .filter(|cell| owning_row(*cell).is_some_and(|r| r.id() == tr.id()))
                        .flat_map(|cell| {
                            let text = cell_text(cell);
                            std::iter::repeat_n(text, colspan(cell))
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();
            Table::from_rows(rows)
        })
        .filter(|t| !t.rows().is_empty())
        .collect()
}

fn owning_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

fn owning_row(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "tr")
}

fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

fn cell_text(cell: ElementRef<'_>) -> Option<String> {
    let joined = cell.text().collect::<Vec<_>>().join(" ");
    let normalized = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
