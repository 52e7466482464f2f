use hashbrown::HashSet;

use crate::{Column, FrameError};

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    pub fn new(pairs: Vec<(String, Column)>) -> Result<Self, FrameError> {
        let n_rows = pairs.first().map_or(0, |(_, c)| c.len());
        let mut seen: HashSet<&str> = HashSet::new();
        for (name, column) in pairs.iter() {
            if !seen.insert(name.as_str()) {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
            if column.len() != n_rows {
                return Err(FrameError::LengthMismatch {
                    name: name.clone(),
                    expected: n_rows,
                    found: column.len(),
                });
            }
        }
        drop(seen);
        let (names, columns) = pairs.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, FrameError> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn column_at(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn take(&self, idx: &[usize]) -> Frame {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(idx)).collect(),
            n_rows: idx.len(),
        }
    }

    pub fn filter<F>(&self, keep: F) -> Frame
    where
        F: Fn(usize) -> bool,
    {
        let idx: Vec<usize> = (0..self.n_rows).filter(|i| keep(*i)).collect();
        self.take(&idx)
    }

    pub fn map_columns<F>(self, mut f: F) -> Frame
    where
        F: FnMut(&str, Column) -> Column,
    {
        let columns = self
            .names
            .iter()
            .zip(self.columns)
            .map(|(name, column)| f(name, column))
            .collect();
        Frame {
            names: self.names,
            columns,
            n_rows: self.n_rows,
        }
    }

    pub fn estimated_bytes(&self) -> usize {
        self.columns.iter().map(Column::estimated_bytes).sum()
    }
}
