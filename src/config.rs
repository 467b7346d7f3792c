use crate::{Error, Result};
use std::fmt::Display;

/// The maximum number of permutations (`bands * height`) allowed by default.
pub const DEFAULT_LIMIT: usize = 400;
/// Default number of bands, which is the max number of buckets per column.
pub const DEFAULT_BANDS: usize = 25;
/// Default number of signature entries per band.
pub const DEFAULT_HEIGHT: usize = 8;
/// Default size of both column and row pages.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Validated banding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshConfig {
    bands: usize,
    height: usize,
    limit: usize,
    permutations: usize,
}

impl LshConfig {
    /// Makes a config using the [`DEFAULT_LIMIT`].
    ///
    /// Any integer type is accepted so that negative or oversized inputs are
    /// reported as [`Error::Configuration`] rather than wrapping.
    ///
    /// ```
    /// # use minhash_lsh::LshConfig;
    /// let config = LshConfig::new(20, 20).unwrap();
    /// assert_eq!(config.permutations(), 400);
    /// assert!(LshConfig::new(-1, 3).is_err());
    /// assert!(LshConfig::new(21, 20).is_err());
    /// ```
    pub fn new<B, H>(bands: B, height: H) -> Result<Self>
    where
        B: TryInto<usize> + Copy + Display,
        H: TryInto<usize> + Copy + Display,
    {
        Self::with_limit(bands, height, DEFAULT_LIMIT)
    }

    /// Makes a config with a custom permutation limit.
    pub fn with_limit<B, H>(bands: B, height: H, limit: usize) -> Result<Self>
    where
        B: TryInto<usize> + Copy + Display,
        H: TryInto<usize> + Copy + Display,
    {
        let b = bands.try_into().map_err(|_| {
            Error::Configuration(format!("bands must be a non-negative integer (got {})", bands))
        })?;
        let h = height.try_into().map_err(|_| {
            Error::Configuration(format!(
                "height must be a non-negative integer (got {})",
                height
            ))
        })?;
        let permutations = b.checked_mul(h).filter(|&p| p <= limit).ok_or_else(|| {
            Error::Configuration(format!(
                "permutations ({} * {}) must be <= {}",
                b, h, limit
            ))
        })?;
        Ok(Self {
            bands: b,
            height: h,
            limit,
            permutations,
        })
    }

    /// Number of bands, so the max number of buckets per column.
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Signature entries per band.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The permutation limit this config was validated against.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length of every column's signature.
    pub fn permutations(&self) -> usize {
        self.permutations
    }
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS,
            height: DEFAULT_HEIGHT,
            limit: DEFAULT_LIMIT,
            permutations: DEFAULT_BANDS * DEFAULT_HEIGHT,
        }
    }
}
