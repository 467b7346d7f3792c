use crate::RunStats;
use ahash::AHasher;
use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::{BuildHasherDefault, Hash};

pub type FastHasher = BuildHasherDefault<AHasher>;
pub type FastMap<K, V> = HashMap<K, V, FastHasher>;
pub type FastSet<T> = HashSet<T, FastHasher>;

/// Bucket id to the set of columns that fell into it during one round.
pub type Buckets<C> = FastMap<String, FastSet<C>>;
/// Column to its encoded signature, for columns that reached a bucket.
pub type Index<C> = FastMap<C, IndexEntry>;
/// Timestamp shared by every call of a run.
pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Every band passed through `format_band` and concatenated in band order.
    pub min_hash: String,
    /// Bucket ids of this column in band order, minus the ignored ones.
    pub bucket_ids: Vec<String>,
}

/// Options threaded through every collaborator call of a run.
///
/// `random` is the only field the engine reads. `params` is never looked at
/// and reaches the collaborator unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions<O> {
    /// Permutation seed. Drawn from `[0, row_count)` when not set.
    pub random: Option<u64>,
    pub params: O,
}

impl<O> RunOptions<O> {
    pub fn new(params: O) -> Self {
        Self {
            random: None,
            params,
        }
    }

    pub fn with_random(self, random: u64) -> Self {
        Self {
            random: Some(random),
            ..self
        }
    }
}

/// Sparse row-by-column membership. Anything not inserted is `false`.
#[derive(Debug, Clone)]
pub struct Shingles<R, C> {
    rows: FastMap<R, FastMap<C, bool>>,
}

impl<R, C> Shingles<R, C>
where
    R: Eq + Hash,
    C: Eq + Hash,
{
    /// Makes a relation where nothing is associated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `row` and `column` are associated.
    pub fn insert(&mut self, row: R, column: C, value: bool) {
        self.rows.entry(row).or_default().insert(column, value);
    }

    /// Marks `row` and `column` as associated.
    pub fn insert_pair(&mut self, row: R, column: C) {
        self.insert(row, column, true);
    }

    /// Whether `row` and `column` are associated. Missing entries are false.
    ///
    /// ```
    /// # use minhash_lsh::Shingles;
    /// let mut shingles = Shingles::new();
    /// shingles.insert_pair("row", 1);
    /// shingles.insert("row", 2, false);
    /// assert!(shingles.holds(&"row", &1));
    /// assert!(!shingles.holds(&"row", &2));
    /// assert!(!shingles.holds(&"other", &1));
    /// ```
    pub fn holds(&self, row: &R, column: &C) -> bool {
        self.rows
            .get(row)
            .and_then(|columns| columns.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// Number of rows with at least one entry, true or false.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R, C> Default for Shingles<R, C> {
    fn default() -> Self {
        Self {
            rows: FastMap::default(),
        }
    }
}

impl<R, C> From<FastMap<R, FastMap<C, bool>>> for Shingles<R, C> {
    fn from(rows: FastMap<R, FastMap<C, bool>>) -> Self {
        Self { rows }
    }
}

impl<R, C> std::iter::FromIterator<(R, C)> for Shingles<R, C>
where
    R: Eq + Hash,
    C: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (R, C)>>(iter: I) -> Self {
        let mut shingles = Self::new();
        for (row, column) in iter {
            shingles.insert_pair(row, column);
        }
        shingles
    }
}

/// The data source and sink of a run.
///
/// The engine calls exactly one of these methods at a time and forwards the
/// caller's [`RunOptions`] to each of them. Any error aborts the run; it is
/// returned from [`Engine::run`](crate::Engine::run) unchanged inside
/// [`Error::Collaborator`](crate::Error::Collaborator).
pub trait Collaborator {
    /// The entity being compared.
    type Column: Clone + Eq + Hash + Debug;
    /// A feature dimension.
    type Row: Clone + Eq + Hash + Debug;
    /// Caller data forwarded through [`RunOptions::params`].
    type Context;
    /// State carried across the rounds of a run. Only the sink reads it.
    type Accumulator: Default;
    /// Result of [`Collaborator::finalize`].
    type Summary;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gets up to `size` column ids following `cursor`, the last id of the
    /// previous page. An empty page ends the run.
    fn column_page(
        &mut self,
        cursor: Option<&Self::Column>,
        size: usize,
        options: &RunOptions<Self::Context>,
    ) -> Result<Vec<Self::Column>, Self::Error>;

    /// Gets up to `size` row ids following `cursor`. An empty page ends the
    /// row scan of the current column page.
    fn row_page(
        &mut self,
        cursor: Option<&Self::Row>,
        size: usize,
        options: &RunOptions<Self::Context>,
    ) -> Result<Vec<Self::Row>, Self::Error>;

    /// Total number of rows. Called once per run.
    fn row_count(&mut self, options: &RunOptions<Self::Context>) -> Result<i64, Self::Error>;

    /// Gets the relation between a column page and a row page.
    fn shingles(
        &mut self,
        columns: &[Self::Column],
        rows: &[Self::Row],
        options: &RunOptions<Self::Context>,
    ) -> Result<Shingles<Self::Row, Self::Column>, Self::Error>;

    /// Persists the buckets and index of one column page.
    fn store(
        &mut self,
        buckets: Buckets<Self::Column>,
        index: Index<Self::Column>,
        timestamp: &Timestamp,
        accumulator: &mut Self::Accumulator,
        options: &RunOptions<Self::Context>,
    ) -> Result<(), Self::Error>;

    /// Called once after the last column page.
    fn finalize(
        &mut self,
        stats: &RunStats,
        timestamp: &Timestamp,
        accumulator: Self::Accumulator,
        options: &RunOptions<Self::Context>,
    ) -> Result<Self::Summary, Self::Error>;
}
