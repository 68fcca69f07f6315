// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod cell;
pub mod error;
pub mod file;
pub mod infer;
pub mod markup;
pub mod pipeline;
pub mod progress;
pub mod sheet;
pub mod table;
pub mod worker;

pub use cell::{CellKind, CellValue, ErrorCode};
pub use error::{Error, ScrapeError, SheetError, TableError};
pub use table::TableModel;
