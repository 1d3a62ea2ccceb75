pub mod column;
pub mod error;
pub mod format;
pub mod kind;
pub mod record;
pub mod schema;
pub mod sql;
pub mod storage;
pub mod value;

pub use column::{Column, Constraint};
pub use error::{BindError, ColumnError, ConversionError, DriverError, RowError, SchemaError, ShapeError, ValidityError};
pub use format::{RecordParser, RecordStream};
pub use kind::{KindRegistry, KindStrategy};
pub use record::Record;
pub use schema::{RecordError, Schema};
pub use sql::{InsertSql, StatementBuilder};
pub use storage::{Connection, Statement};
pub use value::{Value, ValueKind};
