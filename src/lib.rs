//! Renders the monthly school catalog workbook (cover, roster grid, subject
//! completion page) from class-division records.

pub mod config;
pub mod cover;
pub mod http;
pub mod labels;
pub mod layout;
pub mod model;
pub mod report;
pub mod roster;
pub mod store;
pub mod subjects;

pub use config::ServiceConfig;
pub use model::{Clock, FixedClock, SystemClock};
pub use report::{generate_catalog_report, ReportError, ReportOutput, ReportRequest};
pub use store::{CatalogStore, JsonDirStore, MemoryStore, StoreError};
