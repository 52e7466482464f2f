use pubframe::{ColumnKind, FrameError};

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed reading publications: {0}")]
    Frame(#[from] FrameError),

    #[error("publication table lacks column {0}")]
    MissingColumn(&'static str),

    #[error("column {name} holds {kind:?} values, expected a flag")]
    NotAFlag { name: &'static str, kind: ColumnKind },
}
