//! Encoding of raw signature values into bucket ids.
//!
//! A bucket id is built by concatenating [`SignatureCodec::encode`] over every
//! entry of a band. Each band's bucket id is then passed through
//! [`SignatureCodec::format_band`] and appended to the column's cumulative
//! minhash. Codecs are pure: the same inputs must always give the same output,
//! otherwise chunking would no longer be invisible in the results.

use crate::{Error, Result};

/// Turns signature values into bucket id fragments.
pub trait SignatureCodec {
    /// Encodes one signature entry. `None` means no row was observed for
    /// that permutation. `position` is the index of the entry in its band.
    fn encode(&self, value: Option<u64>, position: usize) -> String;

    /// Produces what is appended to the column's minhash for band `band`.
    fn format_band(&self, bucket_id: &str, band: usize) -> String;

    /// Returns `true` if `bucket_id` must not be added to the bucket map.
    fn ignore(&self, bucket_id: &str) -> bool;
}

impl<'a, C> SignatureCodec for &'a C
where
    C: SignatureCodec + ?Sized,
{
    fn encode(&self, value: Option<u64>, position: usize) -> String {
        (**self).encode(value, position)
    }

    fn format_band(&self, bucket_id: &str, band: usize) -> String {
        (**self).format_band(bucket_id, band)
    }

    fn ignore(&self, bucket_id: &str) -> bool {
        (**self).ignore(bucket_id)
    }
}

/// Fixed-width hexadecimal codec.
///
/// Unset entries are encoded as zeros, which never collides with a real value
/// since permutation values start at `1`. Bucket ids that are only zeros are
/// ignored so that columns with no rows are not clustered together.
///
/// ```
/// # use minhash_lsh::{HexCodec, SignatureCodec};
/// let codec = HexCodec::new().with_width(8).unwrap();
/// assert_eq!(codec.encode(Some(0x2a), 0), "0000002a");
/// assert_eq!(codec.encode(None, 1), "00000000");
/// assert!(codec.ignore("0000000000000000"));
/// assert!(!codec.ignore("000000010000002a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexCodec {
    width: usize,
    separator: String,
}

impl HexCodec {
    /// Makes a codec with 16 digits per entry and `", "` between bands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of hex digits per entry.
    ///
    /// A width of 8 gives the layout used by the fixed hex variant of the
    /// engine. Values that need more digits than `width` are not truncated,
    /// so bucket ids stay collision-free only while the row count is below
    /// `16^width`. A width of `0` is rejected.
    ///
    /// ```
    /// # use minhash_lsh::{HexCodec, SignatureCodec};
    /// let codec = HexCodec::new().with_width(4).unwrap();
    /// assert_eq!(codec.encode(Some(0xbeef), 0), "beef");
    /// assert!(HexCodec::new().with_width(0).is_err());
    /// ```
    pub fn with_width(self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::Configuration(
                "hex codec width must be at least 1".to_owned(),
            ));
        }
        Ok(Self { width, ..self })
    }

    /// Sets the separator placed between bands in the minhash.
    pub fn with_separator(self, separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..self
        }
    }

    /// Hex digits per entry.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Text placed before every band but the first.
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for HexCodec {
    fn default() -> Self {
        Self {
            // Enough digits for any `u64`.
            width: 16,
            separator: ", ".to_owned(),
        }
    }
}

impl SignatureCodec for HexCodec {
    fn encode(&self, value: Option<u64>, _position: usize) -> String {
        format!("{:0width$x}", value.unwrap_or(0), width = self.width)
    }

    fn format_band(&self, bucket_id: &str, band: usize) -> String {
        if band == 0 {
            bucket_id.to_owned()
        } else {
            format!("{}{}", self.separator, bucket_id)
        }
    }

    fn ignore(&self, bucket_id: &str) -> bool {
        bucket_id.bytes().all(|b| b == b'0')
    }
}

type EncodeFn = Box<dyn Fn(Option<u64>, usize) -> String + Send + Sync>;
type FormatFn = Box<dyn Fn(&str, usize) -> String + Send + Sync>;
type IgnoreFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A codec assembled from closures with [`FnCodecBuilder`].
pub struct FnCodec {
    encode: EncodeFn,
    format_band: FormatFn,
    ignore: IgnoreFn,
}

impl FnCodec {
    /// Starts an empty [`FnCodecBuilder`].
    pub fn builder() -> FnCodecBuilder {
        FnCodecBuilder::default()
    }
}

impl SignatureCodec for FnCodec {
    fn encode(&self, value: Option<u64>, position: usize) -> String {
        (self.encode)(value, position)
    }

    fn format_band(&self, bucket_id: &str, band: usize) -> String {
        (self.format_band)(bucket_id, band)
    }

    fn ignore(&self, bucket_id: &str) -> bool {
        (self.ignore)(bucket_id)
    }
}

impl std::fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCodec").finish()
    }
}

/// Collects the three codec functions. All of them are required.
///
/// ```
/// # use minhash_lsh::{FnCodec, SignatureCodec};
/// let codec = FnCodec::builder()
///     .encode(|value, _| value.unwrap_or(0).to_string())
///     .format_band(|bucket_id, _| format!("[{}]", bucket_id))
///     .ignore(|_| false)
///     .build()
///     .unwrap();
/// assert_eq!(codec.format_band(&codec.encode(Some(7), 0), 0), "[7]");
///
/// assert!(FnCodec::builder().ignore(|_| false).build().is_err());
/// ```
#[derive(Default)]
pub struct FnCodecBuilder {
    encode: Option<EncodeFn>,
    format_band: Option<FormatFn>,
    ignore: Option<IgnoreFn>,
}

impl FnCodecBuilder {
    /// Sets [`SignatureCodec::encode`].
    pub fn encode<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<u64>, usize) -> String + Send + Sync + 'static,
    {
        self.encode = Some(Box::new(f));
        self
    }

    /// Sets [`SignatureCodec::format_band`].
    pub fn format_band<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> String + Send + Sync + 'static,
    {
        self.format_band = Some(Box::new(f));
        self
    }

    /// Sets [`SignatureCodec::ignore`].
    pub fn ignore<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.ignore = Some(Box::new(f));
        self
    }

    /// Fails with [`Error::MissingCapability`] naming the first function that
    /// was not supplied.
    pub fn build(self) -> Result<FnCodec> {
        Ok(FnCodec {
            encode: self
                .encode
                .ok_or(Error::MissingCapability("SignatureCodec::encode"))?,
            format_band: self
                .format_band
                .ok_or(Error::MissingCapability("SignatureCodec::format_band"))?,
            ignore: self
                .ignore
                .ok_or(Error::MissingCapability("SignatureCodec::ignore"))?,
        })
    }
}
