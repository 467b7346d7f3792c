use crate::codec::SignatureCodec;
use crate::collaborator::{Buckets, Collaborator, Index, IndexEntry, RunOptions};
use crate::config::{LshConfig, DEFAULT_CHUNK_SIZE};
use crate::report::{Report, RunStats};
use crate::signature::{Permutation, SignatureTable};
use crate::{Error, Result};
use chrono::Utc;
use log::{debug, info, trace};
use rand::Rng;
use std::fmt::Display;
use std::hash::Hash;
use std::time::Instant;

/// Streams a paginated relation through MinHash and LSH banding.
///
/// The engine only holds its configuration and codec, so one engine can be
/// shared between any number of runs.
#[derive(Debug, Clone)]
pub struct Engine<K> {
    config: LshConfig,
    codec: K,
}

impl<K> Engine<K>
where
    K: SignatureCodec,
{
    /// Makes an engine with `bands` bands of `height` entries each.
    ///
    /// Fails if either is negative or if `bands * height` exceeds
    /// [`DEFAULT_LIMIT`](crate::DEFAULT_LIMIT).
    ///
    /// ```
    /// # use minhash_lsh::{Engine, HexCodec};
    /// let engine = Engine::new(3, 3, HexCodec::new()).unwrap();
    /// assert_eq!(engine.permutations(), 9);
    /// assert!(Engine::new(50, 9, HexCodec::new()).is_err());
    /// ```
    pub fn new<B, H>(bands: B, height: H, codec: K) -> Result<Self>
    where
        B: TryInto<usize> + Copy + Display,
        H: TryInto<usize> + Copy + Display,
    {
        Ok(Self::with_config(LshConfig::new(bands, height)?, codec))
    }

    /// Makes an engine from an already validated config.
    ///
    /// ```
    /// # use minhash_lsh::{Engine, HexCodec, LshConfig};
    /// let config = LshConfig::with_limit(40, 20, 800).unwrap();
    /// let engine = Engine::with_config(config, HexCodec::new());
    /// assert_eq!(engine.permutations(), 800);
    /// assert_eq!(engine.limit(), 800);
    /// ```
    pub fn with_config(config: LshConfig, codec: K) -> Self {
        Self { config, codec }
    }

    /// The banding parameters.
    pub fn config(&self) -> &LshConfig {
        &self.config
    }

    /// The codec used to build bucket ids.
    pub fn codec(&self) -> &K {
        &self.codec
    }

    /// See [`LshConfig::bands`].
    pub fn bands(&self) -> usize {
        self.config.bands()
    }

    /// See [`LshConfig::height`].
    pub fn height(&self) -> usize {
        self.config.height()
    }

    /// Length of every column's signature.
    pub fn permutations(&self) -> usize {
        self.config.permutations()
    }

    /// See [`LshConfig::limit`].
    pub fn limit(&self) -> usize {
        self.config.limit()
    }

    /// Same as [`Engine::run`] with pages of [`DEFAULT_CHUNK_SIZE`].
    pub fn run_default<C>(
        &self,
        collaborator: &mut C,
        options: &RunOptions<C::Context>,
    ) -> Result<Report<C::Summary>>
    where
        C: Collaborator,
    {
        self.run(collaborator, options, DEFAULT_CHUNK_SIZE)
    }

    /// Runs the whole computation.
    ///
    /// Column pages and row pages are both requested with `chunk_size` ids.
    /// For every column page, all the row pages are scanned, the signatures
    /// are banded, and the resulting buckets and index are handed to
    /// [`Collaborator::store`]. The sink is finalized once the column pages
    /// run out.
    ///
    /// The first error aborts the run. Rounds already stored stay stored.
    pub fn run<C>(
        &self,
        collaborator: &mut C,
        options: &RunOptions<C::Context>,
        chunk_size: usize,
    ) -> Result<Report<C::Summary>>
    where
        C: Collaborator,
    {
        if chunk_size == 0 {
            return Err(Error::Configuration(
                "chunk size must be a positive integer".to_owned(),
            ));
        }
        let timestamp = Utc::now();
        let begin = Instant::now();

        let row_count = collaborator
            .row_count(options)
            .map_err(Error::collaborator)?;
        let rows: u64 = row_count.try_into().map_err(|_| {
            Error::DataContract(format!("row count must not be negative (got {})", row_count))
        })?;
        let random = match options.random {
            Some(random) => random,
            None if rows == 0 => 0,
            None => rand::thread_rng().gen_range(0..rows),
        };
        let permutation = Permutation::new(random, rows);
        debug!(
            "run start rows({}) random({}) chunk({}) permutations({})",
            rows,
            random,
            chunk_size,
            self.permutations()
        );

        let mut stats = RunStats::new(rows);
        let mut accumulator = C::Accumulator::default();
        let mut cursor: Option<C::Column> = None;
        loop {
            let columns = collaborator
                .column_page(cursor.as_ref(), chunk_size, options)
                .map_err(Error::collaborator)?;
            if columns.is_empty() {
                break;
            }
            check_page("column", columns.len(), chunk_size)?;
            trace!(
                "column round({}) columns({})",
                stats.column_rounds + 1,
                columns.len()
            );

            let (table, row_rounds) =
                self.scan_rows(collaborator, &columns, permutation, chunk_size, options)?;
            stats.record_round(table.len(), row_rounds);

            let (buckets, index) = self.band(table);
            trace!(
                "store buckets({}) index({}) blocks({})",
                buckets.len(),
                index.len(),
                row_rounds
            );
            collaborator
                .store(buckets, index, &timestamp, &mut accumulator, options)
                .map_err(Error::collaborator)?;

            cursor = columns.into_iter().last();
        }

        let summary = collaborator
            .finalize(&stats, &timestamp, accumulator, options)
            .map_err(Error::collaborator)?;
        let duration = begin.elapsed();
        info!(
            "run done blocks({}) columns({}) rows({}) duration({:?})",
            stats.blocks, stats.columns, stats.rows, duration
        );
        Ok(Report::new(summary, stats, random, timestamp, duration))
    }

    /// Scans every row page for one column page.
    ///
    /// Returns the signatures and the number of row pages scanned.
    fn scan_rows<C>(
        &self,
        collaborator: &mut C,
        columns: &[C::Column],
        permutation: Option<Permutation>,
        chunk_size: usize,
        options: &RunOptions<C::Context>,
    ) -> Result<(SignatureTable<C::Column>, u64)>
    where
        C: Collaborator,
    {
        let mut table = SignatureTable::new(columns, self.permutations());
        let mut cursor: Option<C::Row> = None;
        let mut offset = 0u64;
        let mut rounds = 0u64;
        loop {
            let rows = collaborator
                .row_page(cursor.as_ref(), chunk_size, options)
                .map_err(Error::collaborator)?;
            if rows.is_empty() {
                break;
            }
            check_page("row", rows.len(), chunk_size)?;
            let permutation = permutation.ok_or_else(|| {
                Error::DataContract("row page returned while the row count is 0".to_owned())
            })?;
            let shingles = collaborator
                .shingles(columns, &rows, options)
                .map_err(Error::collaborator)?;
            table.observe(&rows, &shingles, offset, &permutation);

            offset += rows.len() as u64;
            rounds += 1;
            cursor = rows.into_iter().last();
        }
        Ok((table, rounds))
    }

    /// Turns the signatures of a column page into buckets and index entries.
    fn band<Col>(&self, table: SignatureTable<Col>) -> (Buckets<Col>, Index<Col>)
    where
        Col: Clone + Eq + Hash,
    {
        let mut buckets = Buckets::default();
        let mut index = Index::default();
        for (column, signature) in table.into_signatures() {
            let banded = signature.band(&self.codec, self.bands(), self.height());
            // Columns that landed in no bucket are left out of the index.
            if banded.bucket_ids.is_empty() {
                continue;
            }
            for bucket_id in &banded.bucket_ids {
                buckets
                    .entry(bucket_id.clone())
                    .or_default()
                    .insert(column.clone());
            }
            index.insert(
                column,
                IndexEntry {
                    min_hash: banded.min_hash,
                    bucket_ids: banded.bucket_ids,
                },
            );
        }
        (buckets, index)
    }
}

fn check_page(kind: &str, len: usize, size: usize) -> Result<()> {
    if len > size {
        Err(Error::DataContract(format!(
            "{} page has {} ids but {} were requested",
            kind, len, size
        )))
    } else {
        Ok(())
    }
}
