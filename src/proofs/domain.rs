//! The finite ordered set of plaintext values a membership proof ranges over
use crate::error::ProofError;

/// Most values a range may span. Every value costs one branch in a proof, so anything wider is
/// refused before it is allocated.
pub const MAX_RANGE_LEN: u64 = 1 << 16;

/// Strictly increasing, non-empty list of plaintext values. Position i of the domain is
/// position i of every list in a proof over it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    values: Vec<u64>,
}

impl Domain {
    pub fn new(values: Vec<u64>) -> Result<Self, ProofError> {
        if values.is_empty() {
            return Err(ProofError::InvalidDomain("domain is empty"));
        }
        if values.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ProofError::InvalidDomain("domain is not strictly increasing"));
        }
        return Ok(Self { values });
    }

    /// The contiguous range [min, max]
    pub fn range(min: u64, max: u64) -> Result<Self, ProofError> {
        if min > max {
            return Err(ProofError::InvalidDomain("range minimum exceeds maximum"));
        }
        if max - min >= MAX_RANGE_LEN {
            return Err(ProofError::InvalidDomain("range is too wide"));
        }
        return Self::new((min..=max).collect());
    }

    /// The range of every possible sum of one value from each domain
    pub fn sum(lhs: &Self, rhs: &Self) -> Result<Self, ProofError> {
        let min = lhs.min().checked_add(rhs.min());
        let max = lhs.max().checked_add(rhs.max());
        return match (min, max) {
            (Some(min), Some(max)) => Self::range(min, max),
            _ => Err(ProofError::InvalidDomain("sum of domains overflows")),
        };
    }

    pub fn values(&self) -> &[u64] {
        return &self.values;
    }

    pub fn len(&self) -> usize {
        return self.values.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.values.is_empty();
    }

    pub fn min(&self) -> u64 {
        return self.values[0];
    }

    pub fn max(&self) -> u64 {
        return self.values[self.values.len() - 1];
    }

    /// Index of the value in the domain, if present
    pub fn position(&self, value: u64) -> Option<usize> {
        return self.values.binary_search(&value).ok();
    }

    pub fn contains(&self, value: u64) -> bool {
        return self.position(value).is_some();
    }
}
