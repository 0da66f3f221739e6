//! # Pipeline Module
//!
//! Pipeline concorrente classify-copy-compress, divisa in sottomoduli:
//! - `path_resolver`: `FileRecord` e calcolo dei path derivati
//! - `file_task`: Worker per singoli file
//! - `aggregate`: Contatori e resource list condivisi tra i worker
//! - `coordinator`: Enumerazione, dispatch, barriera e finalizzazione

pub mod aggregate;
pub mod coordinator;
pub mod file_task;
pub mod path_resolver;

pub use aggregate::AggregateState;
pub use coordinator::{Coordinator, CoordinatorOptions, PipelineState};
pub use file_task::{FileOutcome, FileTask};
pub use path_resolver::{FileRecord, PathResolver};
