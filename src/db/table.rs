use serde::Serialize;
use serde_json::Value;

/// Column-name-keyed, row-ordered query result.
///
/// Columns keep their SELECT order; each column holds one value per row.
/// Accessors default instead of panicking so a missing column or a NULL
/// cell degrades to "no data" rather than a fault.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    columns: Vec<ColumnData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnData {
    pub name: String,
    pub values: Vec<Value>,
}

impl Table {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            columns: names
                .into_iter()
                .map(|name| ColumnData {
                    name,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append one row. Extra cells are dropped, missing cells become NULL.
    pub fn push_row(&mut self, row: Vec<Value>) {
        let mut cells = row.into_iter();
        for column in &mut self.columns {
            column.values.push(cells.next().unwrap_or(Value::Null));
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// String cell, empty when missing or NULL.
    pub fn get_str(&self, row: usize, name: &str) -> String {
        match self.cell(row, name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Integer cell, 0 when missing, NULL, or non-numeric.
    pub fn get_i64(&self, row: usize, name: &str) -> i64 {
        match self.cell(row, name) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            _ => 0,
        }
    }

    /// Float cell as an optional, None when missing or NULL.
    pub fn get_f64(&self, row: usize, name: &str) -> Option<f64> {
        match self.cell(row, name) {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// All values of a string column, in row order, skipping NULLs.
    pub fn str_column(&self, name: &str) -> Vec<String> {
        self.column(name)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        let mut table = Table::new(vec!["league".to_string(), "total_games".to_string()]);
        table.push_row(vec![json!("Premier League"), json!(380)]);
        table.push_row(vec![json!("La Liga"), json!(342)]);
        table
    }

    #[test]
    fn test_row_order_and_access() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["league", "total_games"]);
        assert_eq!(table.get_str(0, "league"), "Premier League");
        assert_eq!(table.get_i64(1, "total_games"), 342);
    }

    #[test]
    fn test_missing_column_defaults() {
        let table = sample();
        assert_eq!(table.get_str(0, "no_such_column"), "");
        assert_eq!(table.get_i64(0, "no_such_column"), 0);
        assert_eq!(table.get_f64(0, "no_such_column"), None);
    }

    #[test]
    fn test_short_row_padded_with_null() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![json!(1)]);
        assert_eq!(table.get_i64(0, "a"), 1);
        assert_eq!(table.get_f64(0, "b"), None);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(table.get_str(0, "anything"), "");
    }
}
