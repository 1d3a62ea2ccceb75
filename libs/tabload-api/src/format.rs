use std::io::BufRead;

use crate::record::Record;
use crate::schema::Schema;

/// Lazy, finite, single-pass stream of records.
pub type RecordStream<'a> = Box<dyn Iterator<Item = std::io::Result<Record>> + 'a>;

/// Text format that turns a source into records for a fixed schema.
///
/// - `schema()`: columns the produced records must match, field for field.
/// - `records()`: pulls lines from `source` on demand. Read failures
///   surface as `Err` items; the stream ends at end of input.
pub trait RecordParser {
    fn schema(&self) -> &Schema;

    fn records<'a>(&'a self, source: Box<dyn BufRead + 'a>) -> RecordStream<'a>;
}
