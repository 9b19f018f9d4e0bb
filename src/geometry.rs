use std::fmt;

use crate::{
    cache::CacheLine,
    error::{Result, SimError},
};

/// Width of a simulated memory address.
pub const ADDRESS_BITS: u32 = 64;

/// Shape of the simulated cache: `2^s` sets of `E` lines each, `2^b` byte blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    set_bits: u32,
    block_bits: u32,
    lines_per_set: usize,
    set_count: u64,
}

impl Geometry {
    pub fn new(set_bits: u32, block_bits: u32, lines_per_set: usize) -> Result<Self> {
        if lines_per_set == 0 {
            return Err(SimError::InvalidGeometry(
                "lines per set (E) must be at least 1".to_string(),
            ));
        }
        if set_bits.saturating_add(block_bits) > ADDRESS_BITS {
            return Err(SimError::InvalidGeometry(format!(
                "s + b = {} exceeds the {ADDRESS_BITS}-bit address width",
                set_bits.saturating_add(block_bits)
            )));
        }
        let (Some(set_count), Some(_)) = (1u64.checked_shl(set_bits), 1u64.checked_shl(block_bits))
        else {
            return Err(SimError::InvalidGeometry(format!(
                "2^{set_bits} sets of 2^{block_bits}-byte blocks is not representable"
            )));
        };
        usize::try_from(set_count)
            .ok()
            .and_then(|sets| sets.checked_mul(lines_per_set))
            .and_then(|lines| lines.checked_mul(size_of::<CacheLine>()))
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| {
                SimError::InvalidGeometry(format!(
                    "{set_count} sets x {lines_per_set} lines does not fit in memory"
                ))
            })?;
        Ok(Self {
            set_bits,
            block_bits,
            lines_per_set,
            set_count,
        })
    }

    /// Validates raw command-line values, reporting absent or negative ones.
    pub fn from_options(
        set_bits: Option<i64>,
        block_bits: Option<i64>,
        lines_per_set: Option<i64>,
    ) -> Result<Self> {
        let set_bits = require("-s", set_bits)?;
        let block_bits = require("-b", block_bits)?;
        let lines_per_set = require("-E", lines_per_set)?;
        let set_bits = u32::try_from(set_bits).map_err(|_| out_of_range("-s", set_bits))?;
        let block_bits = u32::try_from(block_bits).map_err(|_| out_of_range("-b", block_bits))?;
        let lines_per_set =
            usize::try_from(lines_per_set).map_err(|_| out_of_range("-E", lines_per_set))?;
        Self::new(set_bits, block_bits, lines_per_set)
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set
    }

    pub fn set_count(&self) -> u64 {
        self.set_count
    }

    pub fn block_size(&self) -> u64 {
        1 << self.block_bits
    }

    /// Total number of lines across all sets.
    pub fn line_count(&self) -> usize {
        // Checked in `new`.
        self.set_count as usize * self.lines_per_set
    }

    pub fn tag_of(&self, address: u64) -> u64 {
        address
            .checked_shr(self.set_bits + self.block_bits)
            .unwrap_or(0)
    }

    pub fn set_index_of(&self, address: u64) -> usize {
        ((address >> self.block_bits) & (self.set_count - 1)) as usize
    }

    /// Splits an address into `(tag, set_index)`; the block offset is dropped.
    pub fn decompose(&self, address: u64) -> (u64, usize) {
        (self.tag_of(address), self.set_index_of(address))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} E={} b={} ({} sets, {}-byte blocks)",
            self.set_bits,
            self.lines_per_set,
            self.block_bits,
            self.set_count,
            self.block_size()
        )
    }
}

fn require(flag: &str, value: Option<i64>) -> Result<i64> {
    value.ok_or_else(|| SimError::InvalidGeometry(format!("missing required argument {flag}")))
}

fn out_of_range(flag: &str, value: i64) -> SimError {
    SimError::InvalidGeometry(format!("{flag} {value} is out of range"))
}
