//! Catalog Adapters.
//!
//! - `YamlCatalog` - Immutable catalog loaded once from a YAML file

mod yaml_catalog;

pub use yaml_catalog::YamlCatalog;
