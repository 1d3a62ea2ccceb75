use serde::Deserialize;

/// Line format of a delimited source.
///
/// Deserializes from the `[csv]` table of a load configuration; every
/// key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDialect")]
pub struct Dialect {
    /// Field separator (default `,`).
    pub delimiter: char,
    /// RFC 4180 double-quote handling (default on).
    pub quoting: bool,
    /// First line holds column names and is skipped (default off).
    pub header: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self { delimiter: ',', quoting: true, header: false }
    }
}

impl Dialect {
    pub fn tsv() -> Self {
        Self { delimiter: '\t', quoting: false, ..Self::default() }
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawDialect {
    delimiter: String,
    quoting: bool,
    header: bool,
}

impl Default for RawDialect {
    fn default() -> Self {
        Self { delimiter: ",".to_string(), quoting: true, header: false }
    }
}

impl TryFrom<RawDialect> for Dialect {
    type Error = String;

    fn try_from(raw: RawDialect) -> Result<Self, Self::Error> {
        Ok(Self {
            delimiter: parse_delimiter(&raw.delimiter)?,
            quoting: raw.quoting,
            header: raw.header,
        })
    }
}

/// Accepts a single character or the escape `\t`.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (s, chars.next(), chars.next()) {
        ("\\t", _, _) => Ok('\t'),
        (_, Some('"'), None) => Err("CSV: delimiter cannot be the quote character".to_string()),
        (_, Some(c), None) if c != '\n' && c != '\r' => Ok(c),
        (other, _, _) => Err(format!("CSV: delimiter must be a single character, got {other:?}")),
    }
}
