//! Construction parameters.

use crate::error::{Error, Result};

/// Compressed string store wrapped by the permuted layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// Plain front coding over fixed-size buckets.
    #[default]
    FrontCoded,
    /// RePair grammar plus DAC-addressed rule sequences, in lexicographic order.
    RePairDac,
}

/// How rank ids are tied to the stored strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// A lexicographic string store plus a permutation between rank ids and
    /// lexicographic positions.
    Permuted(StoreKind),
    /// Buckets of lexicographically adjacent strings stored in rank order,
    /// with a wavelet tree mapping rank ids to buckets.
    Bucketed,
}

/// Configuration for building a ranked dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Layout to build.
    pub layout: Layout,
    /// Strings per bucket (bucketed layout and front coding).
    pub bucket_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Bucketed,
            bucket_size: 16,
        }
    }
}

impl BuildConfig {
    /// Bucketed layout with the given bucket size.
    pub fn bucketed(bucket_size: usize) -> Self {
        Self {
            layout: Layout::Bucketed,
            bucket_size,
        }
    }

    /// Permuted layout over `store`.
    pub fn permuted(store: StoreKind) -> Self {
        Self {
            layout: Layout::Permuted(store),
            ..Self::default()
        }
    }

    /// Override the bucket size.
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Check the parameters before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_size == 0 {
            return Err(Error::InvalidParameter(
                "bucket_size must be at least 1".to_string(),
            ));
        }
        if u32::try_from(self.bucket_size).is_err() {
            return Err(Error::InvalidParameter(format!(
                "bucket_size {} does not fit in 32 bits",
                self.bucket_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BuildConfig::default();
        assert_eq!(config.layout, Layout::Bucketed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_bucket_sizes() {
        assert!(BuildConfig::bucketed(0).validate().is_err());
        assert!(BuildConfig::permuted(StoreKind::RePairDac)
            .with_bucket_size(0)
            .validate()
            .is_err());
        if usize::BITS > 32 {
            assert!(BuildConfig::bucketed(u32::MAX as usize + 1).validate().is_err());
        }
    }
}
