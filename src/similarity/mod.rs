//! Folder similarity scoring.
//!
//! Layered bottom-up: [`text`] holds the fuzzy string primitives, [`engine`]
//! compares two folder records, [`pairs`] enumerates and ranks candidate
//! pairs across a whole library.

pub mod engine;
pub mod pairs;
pub mod text;

pub use engine::FolderSimilarityEngine;
pub use pairs::PairFinder;
pub use text::{average_pairwise_similarity, clamped_similarity, similarity};
