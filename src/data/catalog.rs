//! Named-column access to per-object arrays.
//!
//! Catalog storage formats are out of scope; callers load their data however
//! they like and expose it through `ColumnSource`.

use std::collections::BTreeMap;

use crate::error::{DiagError, ErrorKind};

/// Read access to equally long, named per-object columns.
pub trait ColumnSource {
    /// Number of objects (rows).
    fn len(&self) -> usize;

    fn column(&self, name: &str) -> Option<&[f64]>;

    fn flag(&self, name: &str) -> Option<&[bool]>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn require_column(&self, name: &str) -> Result<&[f64], DiagError> {
        self.column(name)
            .ok_or_else(|| DiagError::new(ErrorKind::InvalidInput, format!("Missing catalog column '{name}'.")))
    }
}

/// In-memory catalog of float and flag columns.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    len: usize,
    columns: BTreeMap<String, Vec<f64>>,
    flags: BTreeMap<String, Vec<bool>>,
}

impl Catalog {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), DiagError> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn insert_flag(&mut self, name: impl Into<String>, values: Vec<bool>) -> Result<(), DiagError> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.flags.insert(name, values);
        Ok(())
    }

    /// Builder form of [`Catalog::insert_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, DiagError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    pub fn with_flag(mut self, name: impl Into<String>, values: Vec<bool>) -> Result<Self, DiagError> {
        self.insert_flag(name, values)?;
        Ok(self)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    fn check_len(&self, name: &str, len: usize) -> Result<(), DiagError> {
        if len != self.len {
            return Err(DiagError::new(
                ErrorKind::InvalidInput,
                format!("Column '{name}' has {len} rows, catalog has {}.", self.len),
            ));
        }
        Ok(())
    }
}

impl ColumnSource for Catalog {
    fn len(&self) -> usize {
        self.len
    }

    fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    fn flag(&self, name: &str) -> Option<&[bool]> {
        self.flags.get(name).map(Vec::as_slice)
    }
}

/// Objects with any of `flags` set. Flags the source does not have are ignored.
pub fn flag_union<S: ColumnSource + ?Sized>(source: &S, flags: &[String]) -> Vec<bool> {
    let mut bad = vec![false; source.len()];
    for name in flags {
        match source.flag(name) {
            Some(values) => {
                for (b, &v) in bad.iter_mut().zip(values) {
                    *b |= v;
                }
            }
            None => log::debug!("flag '{name}' not in catalog; ignored"),
        }
    }
    bad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_columns_of_wrong_length() {
        let mut cat = Catalog::new(3);
        assert!(cat.insert_column("mag", vec![1.0, 2.0, 3.0]).is_ok());
        let err = cat.insert_column("bad", vec![1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(cat.require_column("missing").is_err());
        assert_eq!(cat.require_column("mag").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn flag_union_ignores_unknown_flags() {
        let cat = Catalog::new(3)
            .with_flag("a", vec![true, false, false])
            .unwrap()
            .with_flag("b", vec![false, false, true])
            .unwrap();
        let flags = vec!["a".to_string(), "b".to_string(), "nope".to_string()];
        assert_eq!(flag_union(&cat, &flags), vec![true, false, true]);
    }
}
