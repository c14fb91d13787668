//! Core data types for assembled tigs.
//!
//! This module provides the in-memory model and its binary encoding:
//!
//! - [`GrowableBuffer`](buffer::GrowableBuffer): reusable length/capacity array behind every section
//! - [`PositionRecord`](position::PositionRecord): placement of a read, unitig, or contig in a tig
//! - [`VariantRecord`](variant::VariantRecord): a called variant and its alleles
//! - [`TigHeader`](header::TigHeader): fixed-size summary written ahead of every tig
//! - [`Tig`](tig::Tig): the full tig with the save/load protocol
//! - [`Library`](library::Library): read group name, ID, and technology
//!
//! ## Record Sizes
//!
//! | Record | Bytes |
//! |--------|-------|
//! | `TigHeader` | 56 |
//! | `PositionRecord` | 36 |
//! | `VariantRecord` (fixed part) | 36 |
//! | `Library` | 176 |
//!
//! All integers and floats are little-endian. Children refer to other objects
//! only by numeric ID.

pub mod buffer;
pub mod error;
pub mod header;
pub mod library;
pub mod position;
pub mod tig;
pub mod types;
pub mod variant;
