//! MinHash signatures accumulated one row page at a time.
//!
//! Instead of shuffling the rows for every permutation, permutation `j` maps
//! the row at absolute position `p` of the scan to
//!
//! `((p + seed + j) mod row_count) + 1`
//!
//! Because `p` counts rows from the start of the scan rather than from the
//! start of the current page, and because the signature only ever keeps the
//! minimum, the final values do not depend on how the rows were paged.

use crate::codec::SignatureCodec;
use crate::collaborator::Shingles;
use itertools::Itertools;
use log::trace;
use std::hash::Hash;

/// The permutation family of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    seed: u64,
    row_count: u64,
}

impl Permutation {
    /// Returns `None` if there are no rows to permute.
    pub fn new(seed: u64, row_count: u64) -> Option<Self> {
        if row_count == 0 {
            None
        } else {
            Some(Self { seed, row_count })
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The value of permutation `index` for the row at `position`.
    ///
    /// Always within `1..=row_count`.
    ///
    /// ```
    /// # use minhash_lsh::Permutation;
    /// let permutation = Permutation::new(3, 10).unwrap();
    /// assert_eq!(permutation.value(0, 0), 4);
    /// assert_eq!(permutation.value(6, 1), 1);
    /// ```
    pub fn value(&self, position: u64, index: usize) -> u64 {
        let sum = u128::from(position) + u128::from(self.seed) + index as u128;
        (sum % u128::from(self.row_count)) as u64 + 1
    }
}

/// The banded form of a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banded {
    pub min_hash: String,
    /// Bucket ids that the codec did not ignore, in band order.
    pub bucket_ids: Vec<String>,
}

/// Per-column array of running minimums, one entry per permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    values: Vec<Option<u64>>,
}

impl Signature {
    /// Makes a signature with every entry unset.
    pub fn new(permutations: usize) -> Self {
        Self {
            values: vec![None; permutations],
        }
    }

    /// The entries in permutation order. `None` until a row is observed.
    pub fn values(&self) -> &[Option<u64>] {
        &self.values
    }

    /// Number of permutations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Records a row at absolute `position` in the scan.
    pub fn observe(&mut self, permutation: &Permutation, position: u64) {
        for (j, entry) in self.values.iter_mut().enumerate() {
            let perm = permutation.value(position, j);
            *entry = Some(entry.map_or(perm, |current| current.min(perm)));
        }
    }

    /// Splits the signature into `bands` slices of `height` entries.
    ///
    /// `bands * height` must equal the length of the signature.
    pub fn bands(&self, bands: usize, height: usize) -> impl Iterator<Item = &[Option<u64>]> {
        debug_assert_eq!(bands * height, self.values.len());
        (0..bands).map(move |band| &self.values[band * height..(band + 1) * height])
    }

    /// Encodes every band into a bucket id and builds the column's minhash.
    pub fn band<K>(&self, codec: &K, bands: usize, height: usize) -> Banded
    where
        K: SignatureCodec + ?Sized,
    {
        let mut min_hash = String::new();
        let mut bucket_ids = Vec::new();
        for (band, entries) in self.bands(bands, height).enumerate() {
            let bucket_id = entries
                .iter()
                .enumerate()
                .map(|(position, &value)| codec.encode(value, position))
                .join("");
            min_hash.push_str(&codec.format_band(&bucket_id, band));
            if !codec.ignore(&bucket_id) {
                bucket_ids.push(bucket_id);
            }
        }
        Banded {
            min_hash,
            bucket_ids,
        }
    }
}

/// The signatures of one column page.
///
/// Columns keep the order of the page. A column repeated in the page only
/// gets one signature.
#[derive(Debug, Clone)]
pub struct SignatureTable<C> {
    columns: Vec<(C, Signature)>,
}

impl<C> SignatureTable<C>
where
    C: Clone + Eq + Hash,
{
    /// Makes an unset signature for every distinct column of the page.
    ///
    /// ```
    /// # use minhash_lsh::SignatureTable;
    /// let table = SignatureTable::new(&["a", "b", "a"], 4);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.get(&"a").unwrap().values(), &[None; 4]);
    /// assert!(table.get(&"c").is_none());
    /// ```
    pub fn new(columns: &[C], permutations: usize) -> Self {
        Self {
            columns: columns
                .iter()
                .unique()
                .map(|column| (column.clone(), Signature::new(permutations)))
                .collect(),
        }
    }

    /// Number of distinct columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks up the signature of `column`.
    pub fn get(&self, column: &C) -> Option<&Signature> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, signature)| signature)
    }

    /// Folds one row page into every signature.
    ///
    /// `offset` is the number of rows scanned before this page.
    pub fn observe<R>(
        &mut self,
        rows: &[R],
        shingles: &Shingles<R, C>,
        offset: u64,
        permutation: &Permutation,
    ) where
        R: Eq + Hash,
    {
        let mut hits = 0usize;
        for (column, signature) in &mut self.columns {
            for (position, row) in rows.iter().enumerate() {
                if shingles.holds(row, column) {
                    signature.observe(permutation, offset + position as u64);
                    hits += 1;
                }
            }
        }
        trace!(
            "observed rows({}) offset({}) hits({})",
            rows.len(),
            offset,
            hits
        );
    }

    /// Drains the table column by column, in page order.
    pub fn into_signatures(self) -> impl Iterator<Item = (C, Signature)> {
        self.columns.into_iter()
    }
}
