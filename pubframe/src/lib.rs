//in-memory columnar frames for small analytical datasets
//a frame is a set of equally long, named columns
//columns come in a closed set of kinds, narrow kinds only appear after optimizing

mod column;
mod error;
mod frame;
mod optimize;
pub mod readers;

pub use column::{Column, ColumnKind, FloatKey, GroupKey};
pub use error::FrameError;
pub use frame::Frame;
pub use optimize::{
    optimize, optimize_frame, MissingPolicy, OptimizeOptions, CATEGORY_RATIO, MISSING_SENTINEL,
};
pub use readers::read_frame;
