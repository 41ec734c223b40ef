//! Catalog module - asset descriptors eligible for assignment to anchors.

mod catalog_model;
mod model_catalog;
mod seed;

pub use catalog_model::ModelDescriptor;
pub use model_catalog::ModelCatalog;
pub use seed::{default_seed, parse_seed};
