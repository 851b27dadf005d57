use crate::error::{Error, Result};

use super::opcodes::Bit;

/// Cells below this index are constants.
pub const RESERVED_CELLS: usize = 2;

/// Flat bit memory. Cell 0 always reads 0 and cell 1 always reads 1; the
/// caller's cells start at address 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Bit>,
}

impl Memory {
    /// `size` zeroed caller cells behind the two constants.
    pub fn new(size: usize) -> Self {
        Self::from_cells(vec![Bit::Zero; size])
    }

    /// Memory whose caller cells start out as `cells`.
    pub fn from_cells(cells: Vec<Bit>) -> Self {
        let mut all = Vec::with_capacity(cells.len() + RESERVED_CELLS);
        all.push(Bit::Zero);
        all.push(Bit::One);
        all.extend(cells);
        Self { cells: all }
    }

    /// Number of addressable cells, constants included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        // the constant cells are always there
        false
    }

    pub fn load(&self, address: usize) -> Result<Bit> {
        self.cells.get(address).copied().ok_or(Error::MemoryBounds {
            address,
            size: self.cells.len(),
        })
    }

    pub fn store(&mut self, address: usize, bit: Bit) -> Result<()> {
        if address < RESERVED_CELLS {
            return Err(Error::InvalidAddress {
                address: address.to_string(),
                reason: "cells 0 and 1 are constants",
            });
        }
        let size = self.cells.len();
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(Error::MemoryBounds { address, size })?;
        *cell = bit;
        Ok(())
    }

    /// The caller's cells, without the constants.
    pub fn user_cells(&self) -> &[Bit] {
        &self.cells[RESERVED_CELLS..]
    }
}
