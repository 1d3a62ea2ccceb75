mod dialect;
mod parser;

use std::io::BufRead;

use tabload_api::{Record, RecordParser, RecordStream, Schema};

pub use dialect::{Dialect, parse_delimiter};

/// Delimited-text [`RecordParser`]: one line, one record.
///
/// Blank lines are skipped, trailing `\r` is trimmed, and the header line
/// (if the dialect has one) is dropped before the first record.
#[derive(Debug, Clone)]
pub struct DelimitedParser {
    schema: Schema,
    dialect: Dialect,
}

impl DelimitedParser {
    pub fn new(schema: Schema, dialect: Dialect) -> Self {
        Self { schema, dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Split a single line.
    pub fn parse_line(&self, line: &str) -> Record {
        parser::split_fields(line, self.dialect.delimiter, self.dialect.quoting).into()
    }
}

impl RecordParser for DelimitedParser {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn records<'a>(&'a self, source: Box<dyn BufRead + 'a>) -> RecordStream<'a> {
        Box::new(Lines { parser: self, lines: source.lines(), header_pending: self.dialect.header })
    }
}

struct Lines<'a> {
    parser: &'a DelimitedParser,
    lines: std::io::Lines<Box<dyn BufRead + 'a>>,
    header_pending: bool,
}

impl Iterator for Lines<'_> {
    type Item = std::io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if std::mem::take(&mut self.header_pending) {
                continue;
            }
            return Some(Ok(self.parser.parse_line(line)));
        }
    }
}
