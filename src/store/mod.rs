//! Collections of tigs on disk and in memory.
//!
//! A [`TigStore`](store::TigStore) is a flat list of independent tigs plus an
//! index from tig ID to position. On disk it is simply the tigs' binary
//! records back to back; a file whose name ends in `.gz` is gzip-compressed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tigstore::store::index::ChildIndex;
//! use tigstore::{ChildKind, TigStore};
//! use std::path::Path;
//!
//! let store = TigStore::load_from_file(Path::new("unitigs.tigs")).unwrap();
//! let index = ChildIndex::build(&store);
//!
//! for placement in index.find(ChildKind::Read, 1234) {
//!     println!("read 1234 is child {} of tig {}", placement.child_index, placement.tig_id);
//! }
//! ```

pub mod index;
pub mod store;
