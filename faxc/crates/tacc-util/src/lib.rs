//! Shared error and result types used across the `tacc` compiler front end.
//!
//! Every crate in the workspace (`tacc-lex`, `tacc-par`, `tacc-ir`, `tacc-drv`)
//! reports failures through [`Error`]. There is a single class of error
//! surfaced to callers, matching the translation unit's contract: the first
//! failure aborts the translation and is reported with its source line.

mod error;

pub use error::{Error, Result};
