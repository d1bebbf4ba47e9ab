use serde::{Deserialize, Serialize};

/// Row id of the single record holding the list.
pub const NUMBERS_RECORD_ID: u32 = 1;

/// The persisted list. Values stay strings because that is what the table column holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumberList(Vec<String>);

impl NumberList {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Returns a new list with `value` at the end; `self` is left untouched.
    pub fn appended(&self, value: impl Into<String>) -> Self {
        let mut values = Vec::with_capacity(self.0.len() + 1);
        values.extend(self.0.iter().cloned());
        values.push(value.into());
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `1, 2, 3`
    pub fn display(&self) -> String {
        self.0.join(", ")
    }
}

impl From<Vec<String>> for NumberList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<'a> From<&'a [&'a str]> for NumberList {
    fn from(values: &'a [&'a str]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}
