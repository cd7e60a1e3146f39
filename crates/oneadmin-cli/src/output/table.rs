//! Table formatting for CLI output

use comfy_table::{Cell, Color, ContentArrangement, Table as ComfyTable};

/// Collects headers and rows, then renders through comfy-table.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn add_row(mut self, row: &[&str]) -> Self {
        self.rows.push(row.iter().map(|s| Cell::new(s)).collect());
        self
    }

    /// Row with pre-styled cells, e.g. colored status labels.
    pub fn add_cells(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    #[must_use]
    pub fn build(self) -> Table {
        let mut inner = ComfyTable::new();
        inner
            .set_header(&self.headers)
            .set_content_arrangement(ContentArrangement::Dynamic);
        for row in self.rows {
            inner.add_row(row);
        }
        Table { inner }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    inner: ComfyTable,
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    pub fn row_count(&self) -> usize {
        self.inner.row_iter().count()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Cell colored by a palette name used in the console's labels.
pub fn colored_cell(content: impl Into<String>, color: &str) -> Cell {
    let fg = match color {
        "green" => Color::Green,
        "lime" => Color::DarkGreen,
        "yellow" | "orange" => Color::Yellow,
        "red" => Color::Red,
        "blue" => Color::Blue,
        "grey" | "black" => Color::Grey,
        _ => return Cell::new(content.into()),
    };
    Cell::new(content.into()).fg(fg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_renders_headers_and_rows() {
        let table = Table::builder()
            .headers(&["ID", "Name"])
            .add_row(&["1", "primary"])
            .add_cells(vec![Cell::new("2"), colored_cell("backup", "green")])
            .build();

        assert_eq!(table.row_count(), 2);
        let output = table.to_string();
        assert!(output.contains("Name"));
        assert!(output.contains("primary"));
        assert!(output.contains("backup"));
    }
}
