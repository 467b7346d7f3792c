#![allow(dead_code)]

use minhash_lsh::{
    Buckets, Collaborator, FnCodec, Index, IndexEntry, RunOptions, RunStats, Shingles, Timestamp,
};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Eleven word lists, each one word away from the previous one.
pub const LISTS: [[&str; 10]; 11] = [
    ["numeric", "feather", "military", "average", "president", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "feather", "military", "average", "president", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "military", "average", "president", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "average", "president", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "president", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "pistol", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "gun", "ray", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "gun", "bar", "complete", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "gun", "bar", "achieve", "escape", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "gun", "bar", "achieve", "breakout", "monarchy"],
    ["numeral", "plume", "army", "ordinary", "leader", "gun", "bar", "achieve", "breakout", "sovereignty"],
];

/// The row space, including one word no list uses.
pub const WORDS: [&str; 21] = [
    "achieve", "army", "average", "bar", "breakout", "complete", "escape", "feather", "gun", "leader",
    "military", "monarchy", "numeral", "numeric", "ordinary", "pistol", "plume", "president", "ray",
    "sovereignty", "unused",
];

#[derive(Debug, Error, PartialEq)]
#[error("store failed in round {0}")]
pub struct StoreFailed(pub usize);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Calls {
    pub column_page: usize,
    pub row_page: usize,
    pub row_count: usize,
    pub shingles: usize,
    pub store: usize,
    pub finalize: usize,
}

/// What the sink keeps across rounds.
#[derive(Debug, Default)]
pub struct Collected {
    pub index: HashMap<usize, IndexEntry>,
    pub buckets: HashMap<String, HashSet<usize>>,
}

#[derive(Debug)]
pub struct Summary {
    pub index: HashMap<usize, IndexEntry>,
    pub buckets: HashMap<String, HashSet<usize>>,
    pub timestamp: Timestamp,
    pub stats: RunStats,
}

/// An in-memory relation that records how the engine talks to it.
pub struct Fixture {
    pub columns: Vec<usize>,
    pub rows: Vec<String>,
    pub members: HashMap<String, HashSet<usize>>,
    pub row_count: Option<i64>,
    /// Return more ids than requested.
    pub oversize: bool,
    pub fail_store_at: Option<usize>,

    pub calls: Calls,
    pub seen: Vec<RunOptions<String>>,
    pub sizes: Vec<usize>,
    pub timestamps: Vec<Timestamp>,
    pub committed: Vec<HashMap<usize, IndexEntry>>,
}

impl Fixture {
    pub fn new(columns: Vec<usize>, rows: Vec<String>, pairs: impl IntoIterator<Item = (String, usize)>) -> Self {
        let mut members: HashMap<String, HashSet<usize>> = HashMap::new();
        for (row, column) in pairs {
            members.entry(row).or_default().insert(column);
        }
        Self {
            columns,
            rows,
            members,
            row_count: None,
            oversize: false,
            fail_store_at: None,
            calls: Calls::default(),
            seen: vec![],
            sizes: vec![],
            timestamps: vec![],
            committed: vec![],
        }
    }

    /// The 11 lists × 21 words relation.
    pub fn lists() -> Self {
        let pairs = LISTS.iter().enumerate().flat_map(|(column, words)| {
            words.iter().map(move |&word| (word.to_owned(), column))
        });
        Self::new(
            (0..LISTS.len()).collect(),
            WORDS.iter().map(|&w| w.to_owned()).collect(),
            pairs,
        )
    }

    /// One column holding one row.
    pub fn dummy() -> Self {
        Self::new(vec![1], vec!["1".to_owned()], vec![("1".to_owned(), 1)])
    }

    /// Every cell is set with probability `p`.
    pub fn random<R: Rng>(rng: &mut R, columns: usize, rows: usize, p: f64) -> Self {
        let names = (0..rows).map(|r| format!("row-{:04}", r)).collect::<Vec<_>>();
        let mut pairs = vec![];
        for name in &names {
            for column in 0..columns {
                if rng.gen_bool(p) {
                    pairs.push((name.clone(), column));
                }
            }
        }
        Self::new((0..columns).collect(), names, pairs)
    }

    fn record(&mut self, options: &RunOptions<String>) {
        self.seen.push(options.clone());
    }
}

fn page<T: Clone + PartialEq>(ids: &[T], cursor: Option<&T>, size: usize) -> Vec<T> {
    let start = match cursor {
        Some(cursor) => match ids.iter().position(|id| id == cursor) {
            Some(ix) => ix + 1,
            None => return vec![],
        },
        None => 0,
    };
    ids.iter().skip(start).take(size).cloned().collect()
}

impl Collaborator for Fixture {
    type Column = usize;
    type Row = String;
    type Context = String;
    type Accumulator = Collected;
    type Summary = Summary;
    type Error = StoreFailed;

    fn column_page(
        &mut self,
        cursor: Option<&usize>,
        size: usize,
        options: &RunOptions<String>,
    ) -> Result<Vec<usize>, StoreFailed> {
        self.calls.column_page += 1;
        self.sizes.push(size);
        self.record(options);
        let size = if self.oversize { size + 1 } else { size };
        Ok(page(&self.columns, cursor, size))
    }

    fn row_page(
        &mut self,
        cursor: Option<&String>,
        size: usize,
        options: &RunOptions<String>,
    ) -> Result<Vec<String>, StoreFailed> {
        self.calls.row_page += 1;
        self.sizes.push(size);
        self.record(options);
        Ok(page(&self.rows, cursor, size))
    }

    fn row_count(&mut self, options: &RunOptions<String>) -> Result<i64, StoreFailed> {
        self.calls.row_count += 1;
        self.record(options);
        Ok(self.row_count.unwrap_or(self.rows.len() as i64))
    }

    fn shingles(
        &mut self,
        columns: &[usize],
        rows: &[String],
        options: &RunOptions<String>,
    ) -> Result<Shingles<String, usize>, StoreFailed> {
        self.calls.shingles += 1;
        self.record(options);
        let mut shingles = Shingles::new();
        for row in rows {
            if let Some(members) = self.members.get(row) {
                for &column in columns {
                    shingles.insert(row.clone(), column, members.contains(&column));
                }
            }
        }
        Ok(shingles)
    }

    fn store(
        &mut self,
        buckets: Buckets<usize>,
        index: Index<usize>,
        timestamp: &Timestamp,
        accumulator: &mut Collected,
        options: &RunOptions<String>,
    ) -> Result<(), StoreFailed> {
        self.calls.store += 1;
        self.record(options);
        self.timestamps.push(*timestamp);
        if self.fail_store_at == Some(self.calls.store) {
            return Err(StoreFailed(self.calls.store));
        }
        self.committed
            .push(index.iter().map(|(&c, e)| (c, e.clone())).collect());
        accumulator.index.extend(index);
        for (bucket_id, columns) in buckets {
            accumulator
                .buckets
                .entry(bucket_id)
                .or_default()
                .extend(columns);
        }
        Ok(())
    }

    fn finalize(
        &mut self,
        stats: &RunStats,
        timestamp: &Timestamp,
        accumulator: Collected,
        options: &RunOptions<String>,
    ) -> Result<Summary, StoreFailed> {
        self.calls.finalize += 1;
        self.record(options);
        self.timestamps.push(*timestamp);
        Ok(Summary {
            index: accumulator.index,
            buckets: accumulator.buckets,
            timestamp: *timestamp,
            stats: *stats,
        })
    }
}

/// Writes each signature entry as a decimal, with entries and bands all
/// separated by `", "` so a minhash can be compared entry by entry.
pub fn decimal_codec() -> FnCodec {
    FnCodec::builder()
        .encode(|value, position| {
            let sep = if position == 0 { "" } else { ", " };
            format!("{}{}", sep, value.unwrap_or(0))
        })
        .format_band(|bucket_id, band| {
            let sep = if band == 0 { "" } else { ", " };
            format!("{}{}", sep, bucket_id)
        })
        .ignore(|bucket_id| bucket_id.split(", ").all(|fragment| fragment == "0"))
        .build()
        .expect("all codec functions are supplied")
}

/// Fraction of entries two minhashes have in common.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.split(", ").collect::<Vec<_>>();
    let b = b.split(", ").collect::<Vec<_>>();
    assert_eq!(a.len(), b.len());
    let same = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}
