use core::hash::BuildHasherDefault;
use std::fmt;

use seahash::SeaHasher;

use crate::identity::IdentityCode;

pub type PairHasher = BuildHasherDefault<SeaHasher>;

// ------------- PairKey -------------
/// Order independent key for one pairwise comparison.
///
/// The two codes are kept sorted, so `PairKey::new(a, b) == PairKey::new(b, a)`.
/// Every reader builds its keys through [`PairKey::new`], which is what makes
/// mappings from different tools joinable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: IdentityCode,
    high: IdentityCode,
}

impl PairKey {
    pub fn new(a: IdentityCode, b: IdentityCode) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
    pub fn first(&self) -> &IdentityCode {
        &self.low
    }
    pub fn second(&self) -> &IdentityCode {
        &self.high
    }
    pub fn contains(&self, code: &IdentityCode) -> bool {
        &self.low == code || &self.high == code
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

// ------------- RawPair -------------
/// The untouched filename fields of a record whose codes could not be extracted.
/// Not canonicalized, so never used for joining.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawPair(pub String, pub String);

impl fmt::Display for RawPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
