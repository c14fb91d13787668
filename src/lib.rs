//! # tigstore
//!
//! A library for storing assembled tigs: contigs and unitigs together with
//! their consensus sequence, the placement of every read in them, and the
//! variants called along them.
//!
//! Each tig is saved as one self-describing binary record: a fixed-size
//! header carrying every section length, followed by the sections in a fixed
//! order. Records can be concatenated into a store and read back one at a
//! time. A text layout format gives a readable view of a tig's identity and
//! child placements.
//!
//! ## Features
//!
//! - **Binary records**: fixed-size headers and children, little-endian throughout
//! - **Streaming**: tigs are read one after another until a clean end of stream
//! - **Validation**: malformed or truncated records are rejected, never half-loaded
//! - **Layouts**: dump and re-import tig layouts as text
//! - **Libraries**: read group names sanitized for use as file prefixes
//!
//! ## Example
//!
//! ```rust,no_run
//! use tigstore::{ChildKind, PositionRecord, Tig};
//!
//! let mut tig = Tig::with_id(1);
//! tig.add_child(PositionRecord::new(ChildKind::Read, 100, 0, 1200));
//! tig.add_child(PositionRecord::new(ChildKind::Read, 101, 1500, 400));
//!
//! let mut bytes = Vec::new();
//! tig.save(&mut bytes).unwrap();
//!
//! let mut loaded = Tig::new();
//! loaded.load(&mut bytes.as_slice()).unwrap();
//! assert_eq!(loaded, tig);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Tig, header, position, variant, and library records
//! - [`parsing`]: Layout text and consensus FASTA
//! - [`store`]: Collections of tigs and the child index
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::buffer::GrowableBuffer;
pub use core::error::TigError;
pub use core::header::{TigFlags, TigHeader};
pub use core::library::Library;
pub use core::position::PositionRecord;
pub use core::tig::{Consensus, Tig};
pub use core::types::*;
pub use core::variant::{AllelePosition, EncodedAlleles, VariantRecord};
pub use store::index::ChildIndex;
pub use store::store::{StoreError, TigStore};
