//! Converts indentation between tabs and spaces across files, folders,
//! projects and solutions, counting what changed at each level.

pub mod app;

pub use app::host::{ActiveDocument, DocumentHost, FileSelection, FsHost, HostError};
pub use app::models::{Collection, Extensions, Node, Operation, Settings};
pub use app::tally::Tally;
pub use app::transform::{transform, TransformError, Transformed, Transformer};
pub use app::traverse::{apply_to_selection, LeafFailure, Traverser};
