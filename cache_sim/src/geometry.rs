use std::fmt;

use thiserror::Error;

use crate::address::{Addr, DecodedAddr};

/// upper bound of `s`. keeps `2^s` representable on 32-bit targets too.
pub const MAX_SET_INDEX_BITS: u32 = 24;
/// upper bound of `S * E`; the cache allocates every line up front.
pub const MAX_LINES: usize = 1 << 24;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("associativity must be at least 1")]
    ZeroAssociativity,
    #[error("set index bits ({set_index_bits}) + block bits ({block_bits}) exceed 64")]
    TooWide { set_index_bits: u32, block_bits: u32 },
    #[error("{set_index_bits} set index bits is too many (at most {MAX_SET_INDEX_BITS})")]
    TooManySets { set_index_bits: u32 },
    #[error("{num_sets} sets of {associativity} lines is too many (at most {MAX_LINES} lines)")]
    TooManyLines {
        num_sets: usize,
        associativity: usize,
    },
}

/// shape of a set-associative cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    set_index_bits: u32,
    associativity: usize,
    block_bits: u32,
}

impl Geometry {
    pub fn new(
        set_index_bits: u32,
        associativity: usize,
        block_bits: u32,
    ) -> Result<Self, GeometryError> {
        if associativity == 0 {
            return Err(GeometryError::ZeroAssociativity);
        }
        if set_index_bits > MAX_SET_INDEX_BITS {
            return Err(GeometryError::TooManySets { set_index_bits });
        }
        if set_index_bits.saturating_add(block_bits) > u64::BITS {
            return Err(GeometryError::TooWide {
                set_index_bits,
                block_bits,
            });
        }
        let num_sets = 1usize << set_index_bits;
        match num_sets.checked_mul(associativity) {
            Some(lines) if lines <= MAX_LINES => {}
            _ => {
                return Err(GeometryError::TooManyLines {
                    num_sets,
                    associativity,
                })
            }
        }
        Ok(Self {
            set_index_bits,
            associativity,
            block_bits,
        })
    }
    pub fn set_index_bits(&self) -> u32 {
        self.set_index_bits
    }
    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }
    pub fn tag_bits(&self) -> u32 {
        u64::BITS - self.set_index_bits - self.block_bits
    }
    /// `E`, lines per set
    pub fn associativity(&self) -> usize {
        self.associativity
    }
    /// `S = 2^s`
    pub fn num_sets(&self) -> usize {
        1 << self.set_index_bits
    }
    /// `B = 2^b`
    pub fn block_size(&self) -> u128 {
        1 << self.block_bits
    }
    pub fn decode(&self, addr: Addr) -> DecodedAddr {
        DecodedAddr::new(addr, self)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} E={} b={} ({} sets, {}-byte blocks)",
            self.set_index_bits,
            self.associativity,
            self.block_bits,
            self.num_sets(),
            self.block_size()
        )
    }
}
