//! Small convenience wrappers for everyday file work: keyword-driven text
//! readers, filesystem helpers, and tabular / structured data loaders.

pub mod data;
pub mod error;
pub mod keywords;
pub mod os;

pub use data::model::{CellValue, Column, ColumnType, Table};
pub use error::{Error, Result};
pub use keywords::{KeywordFile, KeywordOptions};
