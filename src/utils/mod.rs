//! Stream helpers and validation shared across the crate.

pub mod io;
pub mod validation;
