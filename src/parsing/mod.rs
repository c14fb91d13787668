//! Text formats for reading and writing tigs.
//!
//! This module provides:
//!
//! - **Layouts**: human-readable tig identity, flags, statistics, and child
//!   placements, readable back into a [`Tig`](crate::core::tig::Tig)
//! - **FASTA**: ungapped consensus sequences, one record per tig
//!
//! ## Example
//!
//! ```rust,no_run
//! use tigstore::parsing::layout::{read_layout, write_layout};
//! use tigstore::Tig;
//!
//! let text = "tig 1\nlen 100\nnumChildren 1\nread 7 anchor 0 hang 0 0 position 0 100\ntigend\n";
//! let mut tig = Tig::new();
//! read_layout(&mut tig, &mut text.as_bytes()).unwrap();
//!
//! write_layout(&tig, &mut std::io::stdout()).unwrap();
//! ```
//!
//! ## Layout Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `tig` | tig ID, or `-` if unassigned |
//! | `len` | layout length |
//! | `coverageStat` | coverage statistic |
//! | `microhetProb` | microheterozygosity probability |
//! | `suggestRepeat`, `suggestUnique`, `suggestCircular`, `suggestHaploid` | `T` or `F` |
//! | `numChildren` | number of child lines that follow |
//! | `tigend` | end of the layout |

pub mod fasta;
pub mod layout;
