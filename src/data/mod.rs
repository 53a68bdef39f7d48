pub mod catalog_db;
pub mod exporter;
pub mod result_set;

pub use catalog_db::{spawn_load, CatalogDb, LoadOutcome};
pub use result_set::{CellValue, ResultSet};
