use std::collections::HashSet;
use std::sync::Arc;

use crate::column::Column;
use crate::error::{RowError, SchemaError, ShapeError};
use crate::record::Record;
use crate::value::Value;

/// Ordered column set of a load.
///
/// Columns are kept sorted by `order`; construction guarantees the orders
/// are exactly `0..n` and names are unique.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Arc<[Column]>,
}

/// Outcome of checking a whole record against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Shape(ShapeError),
    Field(RowError),
}

impl Schema {
    pub fn new(mut columns: Vec<Column>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        columns.sort_by_key(Column::order);

        for (expected, pair) in columns.windows(2).enumerate() {
            if pair[0].order() == pair[1].order() {
                return Err(SchemaError::DuplicateOrder {
                    order: pair[0].order(),
                    first: pair[0].name().to_string(),
                    second: pair[1].name().to_string(),
                });
            }
            if pair[0].order() != expected {
                return Err(SchemaError::MissingOrder(expected));
            }
        }
        let last = columns.len() - 1;
        if columns[last].order() != last {
            return Err(SchemaError::MissingOrder(last));
        }

        let mut names = HashSet::new();
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(SchemaError::DuplicateName(column.name().to_string()));
            }
        }

        Ok(Self { columns: columns.into() })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns sorted by order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column bound to field position `order`.
    pub fn column(&self, order: usize) -> Option<&Column> {
        self.columns.get(order)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn ensure_shape(&self, row: u64, record: &Record) -> Result<(), ShapeError> {
        if record.len() == self.len() {
            Ok(())
        } else {
            Err(ShapeError { row, expected: self.len(), actual: record.len() })
        }
    }

    /// Convert every field of `record`, stopping at the first bad one.
    pub fn convert(&self, row: u64, record: &Record) -> Result<Vec<Value>, RecordError> {
        self.ensure_shape(row, record).map_err(RecordError::Shape)?;
        self.columns
            .iter()
            .zip(record.iter())
            .map(|(column, raw)| {
                column
                    .check(raw)
                    .map_err(|e| RecordError::Field(RowError::new(row, column.name(), raw, e)))
            })
            .collect()
    }

    /// Every field-level problem of `record`, without touching any statement.
    pub fn validate(&self, row: u64, record: &Record) -> Result<Vec<RowError>, ShapeError> {
        self.ensure_shape(row, record)?;
        Ok(self
            .columns
            .iter()
            .zip(record.iter())
            .filter_map(|(column, raw)| {
                column.check(raw).err().map(|e| RowError::new(row, column.name(), raw, e))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn sample() -> Schema {
        Schema::new(vec![Column::text(1, "label"), Column::int(0, "int_val")]).unwrap()
    }

    #[test]
    fn columns_are_sorted_by_order() {
        let schema = sample();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["int_val", "label"]);
        assert_eq!(schema.column(1).map(Column::name), Some("label"));
    }

    #[test]
    fn rejects_gaps_duplicates_and_empty() {
        assert_eq!(Schema::new(vec![]).unwrap_err(), SchemaError::Empty);
        assert_eq!(
            Schema::new(vec![Column::int(0, "a"), Column::int(2, "b")]).unwrap_err(),
            SchemaError::MissingOrder(1)
        );
        assert_eq!(
            Schema::new(vec![Column::int(1, "a")]).unwrap_err(),
            SchemaError::MissingOrder(0)
        );
        assert!(matches!(
            Schema::new(vec![Column::int(0, "a"), Column::int(0, "b")]).unwrap_err(),
            SchemaError::DuplicateOrder { order: 0, .. }
        ));
        assert_eq!(
            Schema::new(vec![Column::int(0, "a"), Column::int(1, "a")]).unwrap_err(),
            SchemaError::DuplicateName("a".into())
        );
    }

    #[test]
    fn convert_yields_typed_values() {
        let schema = sample();
        let values = schema.convert(1, &["", "a"].into_iter().collect()).unwrap();
        assert_eq!(values, vec![Value::Null(ValueKind::Int), Value::Text("a".into())]);
    }

    #[test]
    fn convert_reports_shape_and_field() {
        let schema = sample();
        let err = schema.convert(4, &["1"].into_iter().collect()).unwrap_err();
        assert_eq!(err, RecordError::Shape(ShapeError { row: 4, expected: 2, actual: 1 }));

        let err = schema.convert(2, &["x", "b"].into_iter().collect()).unwrap_err();
        match err {
            RecordError::Field(e) => {
                assert_eq!((e.row(), e.column(), e.raw(), e.reason()), (2, "int_val", "x", "conversion"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_collects_all_fields() {
        let schema = Schema::new(vec![Column::int(0, "a"), Column::float(1, "b")]).unwrap();
        let errors = schema.validate(7, &["x", "y"].into_iter().collect()).unwrap();
        assert_eq!(errors.iter().map(RowError::column).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(schema.validate(7, &["1", "2.5"].into_iter().collect()).unwrap().is_empty());
    }
}
