//! Core domain types for the trust center content service.
//!
//! This crate defines the data model shared by the database layer, the
//! HTTP server and the admin CLI:
//! - The closed set of served resources and their tables
//! - Typed row records decoded from Postgres
//! - CSV inspection and column type inference for seeding
//! - Relay JSON to CSV conversion
//! - Configuration types

pub mod config;
pub mod convert;
pub mod csv_file;
pub mod error;
pub mod resource;
pub mod row;
pub mod schema;

pub use csv_file::{CsvPreview, inspect_csv};
pub use error::{Error, Result};
pub use resource::Resource;
pub use row::{Row, Value};
pub use schema::{InferredColumn, SqlType, infer_columns, infer_type};
