use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// One record of the table
///
/// Values are stored positionally, in the same order as the table's
/// column names, so a row always holds exactly one value per column.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Row {
    pub values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Row { values }
    }

    pub fn get(&self, col: usize) -> Option<&str> {
        self.values.get(col).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Parsed tabular data: ordered rows sharing one ordered list of column names
///
/// Column names are fixed when the table is built and are never recomputed
/// by edits.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table, padding or truncating each row to the column count
    ///
    /// # Arguments
    /// * `columns` - Column names in display order
    /// * `rows` - Records; missing trailing values become empty strings
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.values.resize(width, String::new());
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `[row][column]`, or `None` if either is unknown
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Overwrite a single cell, leaving every other cell and the row order intact
    ///
    /// # Errors
    /// * `EditError::IndexOutOfRange` - `row` is not an existing row index
    /// * `EditError::UnknownColumn` - `column` is not one of the table's columns
    /// * `EditError::MissingCell` - the row holds fewer values than there are columns
    pub fn set_cell(&mut self, row: usize, column: &str, value: String) -> Result<(), EditError> {
        let len = self.rows.len();
        let col = self
            .column_index(column)
            .ok_or_else(|| EditError::UnknownColumn(column.to_string()))?;
        let target = self
            .rows
            .get_mut(row)
            .ok_or(EditError::IndexOutOfRange { row, len })?;
        let cell = target
            .values
            .get_mut(col)
            .ok_or_else(|| EditError::MissingCell {
                row,
                column: column.to_string(),
            })?;
        *cell = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new(
            vec!["id".to_string(), "first_name".to_string()],
            vec![Row::from_iter(["1", "Alice"]), Row::from_iter(["2", "Bob"])],
        )
    }

    #[test]
    fn short_rows_are_padded_to_column_count() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![Row::from_iter(["1"])],
        );
        assert_eq!(table.rows[0].values, vec!["1", "", ""]);
    }

    #[test]
    fn cell_lookup_by_name() {
        let table = people();
        assert_eq!(table.cell(1, "first_name"), Some("Bob"));
        assert_eq!(table.cell(2, "first_name"), None);
        assert_eq!(table.cell(0, "email"), None);
    }

    #[test]
    fn set_cell_overwrites_only_target() {
        let mut table = people();
        table.set_cell(0, "first_name", "Alicia".to_string()).unwrap();
        assert_eq!(table.cell(0, "first_name"), Some("Alicia"));
        assert_eq!(table.cell(0, "id"), Some("1"));
        assert_eq!(table.cell(1, "first_name"), Some("Bob"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_cell_checks_bounds() {
        let mut table = people();
        let before = table.clone();
        assert_eq!(
            table.set_cell(5, "id", "9".to_string()),
            Err(EditError::IndexOutOfRange { row: 5, len: 2 })
        );
        assert_eq!(
            table.set_cell(0, "email", "x".to_string()),
            Err(EditError::UnknownColumn("email".to_string()))
        );
        assert_eq!(table, before);
    }

    #[test]
    fn set_cell_on_short_row_is_an_error() {
        // built without `Table::new`, so the row is not padded
        let mut table = Table {
            columns: vec!["id".to_string(), "first_name".to_string()],
            rows: vec![Row::from_iter(["1"])],
        };
        assert_eq!(
            table.set_cell(0, "first_name", "Alicia".to_string()),
            Err(EditError::MissingCell {
                row: 0,
                column: "first_name".to_string(),
            })
        );
        assert_eq!(table.rows[0].values, vec!["1"]);

        table.set_cell(0, "id", "2".to_string()).unwrap();
        assert_eq!(table.cell(0, "id"), Some("2"));
    }
}
