// src/lib.rs
//! Chinese homophone substitution.
//!
//! A [`HomophoneTable`] is built once from tab-separated dictionaries and is
//! read-only afterwards. The conversion functions take the table explicitly:
//!
//! ```
//! use homophone_core::{build_table, convert_once, enumerate_all};
//!
//! let table = build_table(&["ma1\t妈\t马\t骂"]);
//! let out = convert_once(&table, "妈", 42);
//! assert!(out == "马" || out == "骂");
//! assert_eq!(enumerate_all(&table, "妈").len(), 3);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;

pub use crate::config::EngineConfig;
pub use crate::core::converter::{convert_many, convert_once, enumerate_all, table_size};
pub use crate::core::dictionary::{build_table, DictionaryBuilder};
pub use crate::core::engine::HomophoneEngine;
pub use crate::core::table::HomophoneTable;
pub use crate::error::{HomophoneError, Result};
