use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use hashbrown::HashSet;
use once_cell::sync::OnceCell;
use pubframe::{
    optimize_frame, read_frame, Column, ColumnKind, Frame, GroupKey, OptimizeOptions,
};
use tracing::info;

use crate::{
    common::{Field, REQUIRED_FIELDS},
    StatsError,
};

//one row per (publication, leader) association, never mutated
#[derive(Debug, Clone)]
pub struct PublicationTable {
    frame: Frame,
    slots: [usize; REQUIRED_FIELDS.len()],
}

pub struct DataCache {
    path: PathBuf,
    optimize: Option<OptimizeOptions>,
    cell: OnceCell<Arc<PublicationTable>>,
}

impl PublicationTable {
    pub fn new(frame: Frame) -> Result<Self, StatsError> {
        let mut slots = [0; REQUIRED_FIELDS.len()];
        for field in REQUIRED_FIELDS {
            slots[field.slot()] = frame
                .position(field.column_name())
                .ok_or(StatsError::MissingColumn(field.column_name()))?;
        }
        let flag = frame.column_at(slots[Field::OpenData.slot()]);
        if matches!(flag.kind(), ColumnKind::Text | ColumnKind::Categorical) {
            return Err(StatsError::NotAFlag {
                name: Field::OpenData.column_name(),
                kind: flag.kind(),
            });
        }
        Ok(Self { frame, slots })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn n_rows(&self) -> usize {
        self.frame.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn column(&self, field: Field) -> &Column {
        self.frame.column_at(self.slots[field.slot()])
    }

    //first appearance order, missing included
    pub fn distinct(&self, field: Field) -> Vec<GroupKey> {
        let column = self.column(field);
        let mut seen = HashSet::new();
        (0..column.len())
            .map(|i| column.key(i))
            .filter(|k| seen.insert(k.clone()))
            .collect()
    }

    pub(crate) fn with_frame(&self, frame: Frame) -> Self {
        Self {
            frame,
            slots: self.slots,
        }
    }
}

impl DataCache {
    pub fn new(path: impl Into<PathBuf>, optimize: Option<OptimizeOptions>) -> Self {
        Self {
            path: path.into(),
            optimize,
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<PublicationTable>, StatsError> {
        self.cell
            .get_or_try_init(|| load_data(&self.path, self.optimize.as_ref()).map(Arc::new))
            .cloned()
    }
}

pub fn load_data(
    path: &Path,
    optimize: Option<&OptimizeOptions>,
) -> Result<PublicationTable, StatsError> {
    let start = Instant::now();
    let mut frame = read_frame(path)?;
    if let Some(options) = optimize {
        frame = optimize_frame(frame, options);
    }
    let table = PublicationTable::new(frame)?;
    info!(
        "loaded {} rows x {} columns from {} in {:?}",
        table.n_rows(),
        table.frame.n_cols(),
        path.display(),
        start.elapsed()
    );
    Ok(table)
}
