use tabload_api::{Record, RowError, Schema, Statement};

/// Binds one record's fields to a prepared statement, column by column.
pub(crate) struct StatementBinder<'s> {
    schema: &'s Schema,
}

impl<'s> StatementBinder<'s> {
    pub(crate) fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Check and bind every field of `record` (shape already verified).
    ///
    /// Column with order `n` goes to parameter `n + 1`. Stops at the first
    /// field that fails; parameters bound before it are left as they are.
    pub(crate) fn bind(&self, statement: &mut dyn Statement, row: u64, record: &Record) -> Result<(), RowError> {
        for (column, raw) in self.schema.columns().iter().zip(record.iter()) {
            let value = column
                .check(raw)
                .map_err(|e| RowError::new(row, column.name(), raw, e))?;
            column
                .bind_value(statement, column.order() + 1, raw, &value)
                .map_err(|e| RowError::new(row, column.name(), raw, e.into()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabload_api::{Column, Constraint, DriverError, Value, ValueKind};

    #[derive(Default)]
    struct Params {
        set: Vec<(usize, Value)>,
        reject_text: bool,
    }

    impl Statement for Params {
        fn parameter_count(&self) -> usize {
            3
        }
        fn set_int(&mut self, index: usize, value: i64) -> Result<(), DriverError> {
            self.set.push((index, Value::Int(value)));
            Ok(())
        }
        fn set_double(&mut self, index: usize, value: f64) -> Result<(), DriverError> {
            self.set.push((index, Value::Float(value)));
            Ok(())
        }
        fn set_string(&mut self, index: usize, value: &str) -> Result<(), DriverError> {
            if self.reject_text {
                return Err(DriverError::new("text not accepted"));
            }
            self.set.push((index, Value::Text(value.to_string())));
            Ok(())
        }
        fn set_null(&mut self, index: usize, kind: ValueKind) -> Result<(), DriverError> {
            self.set.push((index, Value::Null(kind)));
            Ok(())
        }
        fn clear_parameters(&mut self) -> Result<(), DriverError> {
            self.set.clear();
            Ok(())
        }
        fn add_batch(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn execute(&mut self) -> Result<u64, DriverError> {
            Ok(1)
        }
        fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError> {
            Ok(Vec::new())
        }
        fn close(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn is_closed(&self) -> bool {
            false
        }
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Column::int(0, "id"),
            Column::float(1, "price").with_constraint(Constraint { min: Some(0.0), ..Default::default() }),
            Column::text(2, "name"),
        ])
        .unwrap()
    }

    #[test]
    fn parameters_follow_column_order() {
        let schema = schema();
        let mut st = Params::default();
        StatementBinder::new(&schema)
            .bind(&mut st, 1, &Record::from_iter(["7", "", "pen"]))
            .unwrap();
        assert_eq!(
            st.set,
            vec![
                (1, Value::Int(7)),
                (2, Value::Null(ValueKind::Float)),
                (3, Value::Text("pen".into())),
            ]
        );
    }

    #[test]
    fn first_bad_field_is_reported() {
        let schema = schema();
        let mut st = Params::default();
        let err = StatementBinder::new(&schema)
            .bind(&mut st, 4, &Record::from_iter(["x", "-1", "pen"]))
            .unwrap_err();
        assert_eq!((err.row(), err.column(), err.raw(), err.reason()), (4, "id", "x", "conversion"));
        assert!(st.set.is_empty());
    }

    #[test]
    fn predicate_failure_is_validation() {
        let schema = schema();
        let mut st = Params::default();
        let err = StatementBinder::new(&schema)
            .bind(&mut st, 2, &Record::from_iter(["1", "-1", "pen"]))
            .unwrap_err();
        assert_eq!((err.column(), err.reason()), ("price", "validation"));
    }

    #[test]
    fn driver_rejection_is_bind() {
        let schema = schema();
        let mut st = Params { reject_text: true, ..Default::default() };
        let err = StatementBinder::new(&schema)
            .bind(&mut st, 3, &Record::from_iter(["1", "2.5", "pen"]))
            .unwrap_err();
        assert_eq!(err.reason(), "bind");
        assert_eq!(err.error().to_string(), "setString error with value 'pen': text not accepted");
    }
}
