//! Raw tabular data as loaded from a spreadsheet.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    /// Build a cell from raw text; blank text becomes `Empty`.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    /// True for missing cells, including whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric value of the cell, coercing text.
    ///
    /// Returns `None` for anything that is not a finite number.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Trimmed text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// Native date value, if the source stored one.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the non-missing cells.
    pub fn present(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_empty())
    }

    /// All present cells are natively date-typed.
    pub fn is_date_typed(&self) -> bool {
        let mut present = self.present().peekable();
        present.peek().is_some() && present.all(|c| matches!(c, Cell::Date(_)))
    }

    /// All present cells are numbers or numeric text, and there is at least one.
    pub fn is_numeric(&self) -> bool {
        let mut present = self.present().peekable();
        present.peek().is_some() && present.all(|c| c.as_number().is_some())
    }
}

/// Ordered, row-aligned collection of named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<Column>,
    rows: usize,
}

impl RawTable {
    /// Create a table from columns, which must all have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(Error::InvalidParameter(format!(
                "column '{}' has {} rows, expected {}",
                bad.name(),
                bad.len(),
                rows
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Create a table from a header row and data rows.
    ///
    /// Short rows are padded with `Empty`, blank headers are named
    /// `Unnamed: <index>` and repeated headers get a `.1`, `.2`, ... suffix.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let names = unique_headers(&headers, width);
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); width];
        for row in &rows {
            for (j, column) in columns.iter_mut().enumerate() {
                column.push(row.get(j).cloned().unwrap_or(Cell::Empty));
            }
        }

        Self {
            rows: rows.len(),
            columns: names
                .into_iter()
                .zip(columns)
                .map(|(name, cells)| Column::new(name, cells))
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there are no columns or no data rows.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

fn unique_headers(headers: &[String], width: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(width);
    for j in 0..width {
        let base = headers
            .get(j)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unnamed: {}", j));

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn cell_numeric_coercion() {
        assert_eq!(Cell::Number(4.5).as_number(), Some(4.5));
        assert_eq!(text(" 1200.50 ").as_number(), Some(1200.5));
        assert_eq!(text("-3").as_number(), Some(-3.0));
        assert_eq!(text("12k").as_number(), None);
        assert_eq!(text("NaN").as_number(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(Cell::from_text("   ").is_empty());
        assert_eq!(Cell::from_text(""), Cell::Empty);
        assert!(!Cell::from_text("x").is_empty());
        assert!(Cell::Number(f64::NAN).is_empty());
    }

    #[test]
    fn column_type_checks_ignore_missing_cells() {
        let numeric = Column::new("n", vec![text("1"), Cell::Empty, Cell::Number(2.0)]);
        assert!(numeric.is_numeric());

        let mixed = Column::new("m", vec![text("1"), text("abc")]);
        assert!(!mixed.is_numeric());

        let blank = Column::new("b", vec![Cell::Empty, Cell::Empty]);
        assert!(!blank.is_numeric());
        assert!(!blank.is_date_typed());

        let d = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dates = Column::new("d", vec![Cell::Date(d), Cell::Empty]);
        assert!(dates.is_date_typed());
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = RawTable::new(vec![
            Column::new("a", vec![Cell::Empty; 3]),
            Column::new("b", vec![Cell::Empty; 2]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn from_rows_pads_and_names_columns() {
        let table = RawTable::from_rows(
            vec!["Date".into(), "".into(), "Date".into()],
            vec![
                vec![text("2024-01-01"), text("1")],
                vec![text("2024-02-01"), text("2"), text("x"), text("extra")],
            ],
        );

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column_names(),
            vec!["Date", "Unnamed: 1", "Date.1", "Unnamed: 3"]
        );
        assert_eq!(table.column("Date.1").unwrap().cells()[0], Cell::Empty);
        assert_eq!(table.column("Unnamed: 3").unwrap().cells()[1], text("extra"));
    }

    #[test]
    fn empty_table_detection() {
        let table = RawTable::from_rows(vec!["a".into()], vec![]);
        assert!(table.is_empty());
        assert!(RawTable::default().is_empty());
    }
}
