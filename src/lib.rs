//! Streaming MinHash signatures and LSH bucket assignment over a sparse
//! column × row relation that is too large to hold in memory.
//!
//! The [`Engine`] pages through column ids, and for each column page it pages
//! through every row id. Each row page is joined with the column page through
//! [`Collaborator::shingles`], and the signature of every column is folded
//! with the minimum of a seeded permutation. Once the rows run out, the
//! signatures are split into bands, the bands are turned into bucket ids by a
//! [`SignatureCodec`], and the round is handed to [`Collaborator::store`].
//!
//! Changing the page size only changes how many rounds happen. The
//! signatures, and so the minhashes and bucket ids, stay the same for a
//! given seed.
//!
//! ```
//! use minhash_lsh::{
//!     Buckets, Collaborator, Engine, HexCodec, Index, RunOptions, RunStats, Shingles, Timestamp,
//! };
//! use std::convert::Infallible;
//!
//! /// Columns `0..4` over rows `0..6`, where column `c` holds rows `c..c + 3`.
//! #[derive(Default)]
//! struct Windows(Vec<Index<u32>>);
//!
//! fn page(cursor: Option<&u32>, size: usize, len: u32) -> Vec<u32> {
//!     let start = cursor.map_or(0, |&c| c + 1);
//!     (start..len).take(size).collect()
//! }
//!
//! impl Collaborator for Windows {
//!     type Column = u32;
//!     type Row = u32;
//!     type Context = ();
//!     type Accumulator = ();
//!     type Summary = ();
//!     type Error = Infallible;
//!
//!     fn column_page(&mut self, cursor: Option<&u32>, size: usize, _: &RunOptions<()>) -> Result<Vec<u32>, Infallible> {
//!         Ok(page(cursor, size, 4))
//!     }
//!
//!     fn row_page(&mut self, cursor: Option<&u32>, size: usize, _: &RunOptions<()>) -> Result<Vec<u32>, Infallible> {
//!         Ok(page(cursor, size, 6))
//!     }
//!
//!     fn row_count(&mut self, _: &RunOptions<()>) -> Result<i64, Infallible> {
//!         Ok(6)
//!     }
//!
//!     fn shingles(&mut self, columns: &[u32], rows: &[u32], _: &RunOptions<()>) -> Result<Shingles<u32, u32>, Infallible> {
//!         Ok(rows
//!             .iter()
//!             .flat_map(|&r| columns.iter().filter(move |&&c| r >= c && r < c + 3).map(move |&c| (r, c)))
//!             .collect())
//!     }
//!
//!     fn store(&mut self, _: Buckets<u32>, index: Index<u32>, _: &Timestamp, _: &mut (), _: &RunOptions<()>) -> Result<(), Infallible> {
//!         self.0.push(index);
//!         Ok(())
//!     }
//!
//!     fn finalize(&mut self, _: &RunStats, _: &Timestamp, _: (), _: &RunOptions<()>) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//! }
//!
//! let engine = Engine::new(2, 2, HexCodec::new()).unwrap();
//! let mut windows = Windows::default();
//! let report = engine.run_default(&mut windows, &RunOptions::default()).unwrap();
//! assert_eq!(report.columns, 4);
//! assert_eq!(report.rows, 6);
//! assert_eq!(report.blocks, 1);
//! assert_eq!(windows.0[0].len(), 4);
//! ```

mod codec;
mod collaborator;
mod config;
mod engine;
mod error;
mod report;
mod signature;

pub use codec::*;
pub use collaborator::{
    Buckets, Collaborator, FastHasher, FastMap, FastSet, Index, IndexEntry, RunOptions, Shingles, Timestamp,
};
pub use config::*;
pub use engine::*;
pub use error::*;
pub use report::*;
pub use signature::*;
