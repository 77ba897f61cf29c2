use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named column of single-precision values
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Column {
    pub name: String,
    pub doc: String,
    pub values: Vec<f32>,
}

/// A flat table with a fixed number of rows
///
/// A singleton table has exactly one row that extends the row of
/// the parent object (e.g. the event) instead of forming a
/// collection of its own.
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatTable {
    name: String,
    nrows: usize,
    singleton: bool,
    doc: String,
    columns: Vec<Column>,
}

impl FlatTable {
    /// A table without columns
    pub fn new(nrows: usize, name: impl Into<String>, singleton: bool) -> Self {
        Self {
            name: name.into(),
            nrows,
            singleton,
            doc: String::new(),
            columns: Vec::new(),
        }
    }

    pub fn set_doc(&mut self, doc: impl Into<String>) {
        self.doc = doc.into();
    }

    /// Add a column
    ///
    /// The number of values has to match the number of rows.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: &[f64],
        doc: impl Into<String>,
    ) {
        assert_eq!(values.len(), self.nrows, "column length mismatch");
        self.columns.push(Column {
            name: name.into(),
            doc: doc.into(),
            values: values.iter().map(|&v| v as f32).collect(),
        });
    }

    /// Add a column to a table with a single row
    pub fn add_column_value(
        &mut self,
        name: impl Into<String>,
        value: f64,
        doc: impl Into<String>,
    ) {
        self.add_column(name, &[value], doc)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn singleton(&self) -> bool {
        self.singleton
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column with the given name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of the column with the given name
    pub fn values(&self, name: &str) -> Option<&[f32]> {
        self.column(name).map(|c| c.values.as_slice())
    }
}

/// A named per-run entry with documentation
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry<T> {
    pub name: String,
    pub doc: String,
    pub value: T,
}

/// Per-run counters that are added up when outputs are combined
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergableCounterTable {
    ints: Vec<Entry<u64>>,
    floats: Vec<Entry<f64>>,
    vfloats: Vec<Entry<Vec<f64>>>,
}

impl MergableCounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_int(&mut self, name: impl Into<String>, doc: impl Into<String>, value: u64) {
        self.ints.push(Entry { name: name.into(), doc: doc.into(), value })
    }

    pub fn add_float(&mut self, name: impl Into<String>, doc: impl Into<String>, value: f64) {
        self.floats.push(Entry { name: name.into(), doc: doc.into(), value })
    }

    pub fn add_vfloat(
        &mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        value: Vec<f64>,
    ) {
        self.vfloats.push(Entry { name: name.into(), doc: doc.into(), value })
    }

    pub fn int(&self, name: &str) -> Option<u64> {
        self.ints.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.floats.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn vfloat(&self, name: &str) -> Option<&[f64]> {
        self.vfloats
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_slice())
    }

    pub fn ints(&self) -> &[Entry<u64>] {
        &self.ints
    }

    pub fn floats(&self) -> &[Entry<f64>] {
        &self.floats
    }

    pub fn vfloats(&self) -> &[Entry<Vec<f64>>] {
        &self.vfloats
    }

    /// Add up the entries of another table with the same layout
    ///
    /// On error, `self` is left unchanged.
    pub fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        let mut merged = self.clone();
        merged.merge_in_place(other)?;
        *self = merged;
        Ok(())
    }

    fn merge_in_place(&mut self, other: &Self) -> Result<(), MergeError> {
        merge_entries(&mut self.ints, &other.ints, |a, b| {
            *a += b;
            Ok(())
        })?;
        merge_entries(&mut self.floats, &other.floats, |a, b| {
            *a += b;
            Ok(())
        })?;
        merge_entries(&mut self.vfloats, &other.vfloats, |a, b| {
            if a.is_empty() {
                a.resize(b.len(), 0.);
            }
            if !b.is_empty() && a.len() != b.len() {
                return Err((a.len(), b.len()));
            }
            for (a, b) in a.iter_mut().zip(b) {
                *a += b;
            }
            Ok(())
        })
    }
}

fn merge_entries<T, F>(
    entries: &mut [Entry<T>],
    other: &[Entry<T>],
    mut add: F,
) -> Result<(), MergeError>
where
    F: FnMut(&mut T, &T) -> Result<(), (usize, usize)>,
{
    if entries.len() != other.len() {
        return Err(MergeError::EntryCount(entries.len(), other.len()));
    }
    for (e, o) in entries.iter_mut().zip(other) {
        if e.name != o.name {
            return Err(MergeError::Name(e.name.clone(), o.name.clone()));
        }
        add(&mut e.value, &o.value)
            .map_err(|(a, b)| MergeError::Length(e.name.clone(), a, b))?;
    }
    Ok(())
}

/// Error combining counter tables
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Number of entries differs: {0} vs. {1}")]
    EntryCount(usize, usize),
    #[error("Entry names differ: {0} vs. {1}")]
    Name(String, String),
    #[error("Lengths of entry {0} differ: {1} vs. {2}")]
    Length(String, usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns() {
        let mut table = FlatTable::new(2, "LHEScaleWeight", false);
        table.add_column("", &[1.5, 0.5], "scale");
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.values(""), Some([1.5f32, 0.5].as_slice()));
        assert_eq!(table.column("").map(|c| c.doc.as_str()), Some("scale"));
        assert!(table.values("x").is_none());
    }

    #[test]
    #[should_panic]
    fn column_length() {
        let mut table = FlatTable::new(1, "genWeight", true);
        table.add_column("", &[1., 2.], "");
    }

    #[test]
    fn merge() {
        let mut a = MergableCounterTable::new();
        a.add_int("genEventCount", "event count", 2);
        a.add_float("genEventSumw", "sum of gen weights", 4.);
        a.add_vfloat("LHEScaleSumw", "", vec![]);
        let mut b = MergableCounterTable::new();
        b.add_int("genEventCount", "event count", 3);
        b.add_float("genEventSumw", "sum of gen weights", 1.);
        b.add_vfloat("LHEScaleSumw", "", vec![1., 2.]);
        a.merge(&b).unwrap();
        assert_eq!(a.int("genEventCount"), Some(5));
        assert_eq!(a.float("genEventSumw"), Some(5.));
        assert_eq!(a.vfloat("LHEScaleSumw"), Some([1., 2.].as_slice()));

        let mut c = MergableCounterTable::new();
        c.add_int("genEventCount", "event count", 3);
        let before = a.clone();
        assert!(a.merge(&c).is_err());
        assert_eq!(a, before);
    }
}
