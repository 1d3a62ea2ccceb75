use crate::schema::Schema;

/// Builds the parameterized insert statement for a table.
///
/// Placeholders must follow column order: parameter `i + 1` belongs to
/// the column with order `i`.
pub trait StatementBuilder {
    fn build_insert(&self, table: &str, schema: &Schema) -> String;
}

/// `INSERT INTO t (a, b) VALUES (?, ?)` with positional `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertSql {
    quote_identifiers: bool,
}

impl InsertSql {
    /// Wrap table and column names in double quotes.
    pub fn quoted() -> Self {
        Self { quote_identifiers: true }
    }

    fn ident(&self, name: &str) -> String {
        if self.quote_identifiers {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }
}

impl StatementBuilder for InsertSql {
    fn build_insert(&self, table: &str, schema: &Schema) -> String {
        let columns: Vec<String> = schema.names().map(|n| self.ident(n)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.ident(table),
            columns.join(", "),
            placeholders,
        )
    }
}
