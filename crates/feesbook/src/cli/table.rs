use colored::Colorize;

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub width: usize,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, width: usize) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Row data for a [`Table`].
#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<String>,
}

/// Simple table model used for rendering read-only overviews.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new<T: Into<String>>(title: Option<T>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(|value| value.into()),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        let row = TableRow {
            cells: cells.into_iter().map(|value| value.into()).collect(),
        };
        self.rows.push(row);
    }

    /// Renders the table with padded columns, headers in bold.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            out.push_str(&format!("{}\n", title.bold()));
        }

        if !self.columns.is_empty() {
            let total_width = self
                .columns
                .iter()
                .map(|col| col.width + 1)
                .sum::<usize>()
                .max(1);
            out.push_str(&"-".repeat(total_width));
            out.push('\n');

            let header = self
                .columns
                .iter()
                .map(|col| format!("{:width$} ", col.header, width = col.width))
                .collect::<String>();
            out.push_str(&format!("{}\n", header.trim_end().bold()));
            out.push_str(&"-".repeat(total_width));
            out.push('\n');
        }

        for row in &self.rows {
            let mut line = String::new();
            for (idx, column) in self.columns.iter().enumerate() {
                if idx > 0 {
                    line.push(' ');
                }
                let cell = row.cells.get(idx).map(String::as_str).unwrap_or("");
                line.push_str(&format!("{:width$}", cell, width = column.width));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }

        out
    }
}
