//! Reading input tables and the bundled demo data.

pub mod demo;
mod loader;

pub use demo::{demo_table, write_demo_csv};
pub use loader::{load_table, read_csv, WORKBOOK_EXTENSIONS};
