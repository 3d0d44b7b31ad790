use serde_json::Value;

/// Column-ordered table of annotation results.
///
/// Column names are unique. Every row has exactly one cell per column;
/// absent values are `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.ensure_column(&column.into());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    /// Appends a row given as (column, value) pairs. Unknown columns are
    /// added at the end; columns the row does not mention are null.
    pub fn push_record<I, S>(&mut self, record: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut row = vec![Value::Null; self.columns.len()];
        for (column, value) in record {
            let index = self.ensure_column(&column.into());
            if index >= row.len() {
                row.resize(index + 1, Value::Null);
            }
            row[index] = value;
        }
        self.rows.push(row);
    }

    /// Sets `name` to `value` on every row, adding the column if needed.
    pub fn set_constant(&mut self, name: &str, value: Value) {
        let index = self.ensure_column(name);
        for row in &mut self.rows {
            row[index] = value.clone();
        }
    }

    /// Fills `target` from the values of `source`, adding `target` if needed.
    /// Does nothing when `source` is absent.
    pub fn derive_column<F>(&mut self, source: &str, target: &str, mut f: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(source_index) = self.column_index(source) else {
            return false;
        };
        let target_index = self.ensure_column(target);
        for row in &mut self.rows {
            row[target_index] = f(&row[source_index]);
        }
        true
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.has_column(from);
        }
        let Some(index) = self.column_index(from) else {
            return false;
        };
        self.drop_column(to);
        // dropping may shift the source column left
        let index = self.column_index(from).unwrap_or(index);
        self.columns[index] = to.to_string();
        true
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Concatenates `other` below `self`. The resulting columns are the
    /// union of both in first-seen order.
    pub fn append(&mut self, other: ResultTable) {
        let mapping = other
            .columns
            .iter()
            .map(|column| self.ensure_column(column))
            .collect::<Vec<_>>();
        let width = self.columns.len();
        for cells in other.rows {
            let mut row = vec![Value::Null; width];
            for (value, index) in cells.into_iter().zip(&mapping) {
                row[*index] = value;
            }
            self.rows.push(row);
        }
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }
}
