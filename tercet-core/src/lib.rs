pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod seed;

pub use catalog::{BatchInsert, Catalog, CatalogStore, Reference};
pub use error::{CatalogError, PipelineError};
pub use pipeline::{Outcome, Pipeline, RecordCallback};
