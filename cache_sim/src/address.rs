use std::fmt;

use crate::{bin::extract, geometry::Geometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Addr(u64);

impl Addr {
    pub fn new(v: u64) -> Self {
        Self(v)
    }
    pub fn inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// an address split into its tag / set index / block offset fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddr {
    pub tag: u64,
    pub set_index: usize,
    pub block_offset: u64,
}

impl DecodedAddr {
    pub fn new(addr: Addr, geometry: &Geometry) -> Self {
        let s = geometry.set_index_bits();
        let b = geometry.block_bits();
        let addr = addr.inner();
        Self {
            tag: extract(addr, geometry.tag_bits(), s + b),
            // s is bounded by MAX_SET_INDEX_BITS, so the index fits
            set_index: extract(addr, s, b) as usize,
            block_offset: extract(addr, b, 0),
        }
    }
}
