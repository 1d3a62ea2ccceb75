use std::sync::Arc;

/// One parsed row: raw text fields in source order.
///
/// Field `i` belongs to the column with order `i`. The fields live in a
/// shared immutable slice, so clones are cheap and nobody can mutate a
/// record after the parser produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record(Arc<[String]>);

impl Record {
    pub fn new(fields: impl Into<Arc<[String]>>) -> Self {
        Self(fields.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self(fields.into())
    }
}

impl FromIterator<String> for Record {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Record {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}
