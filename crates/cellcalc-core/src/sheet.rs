//! Sheet type

use ahash::{AHashMap, AHashSet};

use crate::cell::{Cell, CellAddress, CellError, CellStore};
use crate::error::Result;

/// An in-memory grid of cells keyed by address
///
/// Setting or clearing a formula marks its address dirty so a host can
/// recalculate only what changed.
#[derive(Debug, Default, Clone)]
pub struct Sheet {
    /// Cell storage
    cells: AHashMap<CellAddress, Cell>,
    /// Addresses whose formula changed since the last `clear_dirty`
    dirty: AHashSet<CellAddress>,
}

impl Sheet {
    /// Create a new, empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&addr)
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(addr, cell)| (*addr, cell)).collect();
        cells.sort_by_key(|(addr, _)| *addr);
        cells.into_iter()
    }

    /// Iterate over the raw formula of every stored cell
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &[String])> {
        self.cells.iter().map(|(addr, cell)| (*addr, cell.formula()))
    }

    // === Cell Modification ===

    /// Set a cell formula by label
    pub fn set_formula<I, S>(&mut self, label: &str, formula: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addr = CellAddress::parse(label)?;
        self.set_formula_at(addr, formula);
        Ok(())
    }

    /// Set a cell formula by address
    pub fn set_formula_at<I, S>(&mut self, addr: CellAddress, formula: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cells.entry(addr).or_default().set_formula(formula);
        self.dirty.insert(addr);
    }

    /// Insert a complete cell record (formula and stored outcome)
    pub fn insert(&mut self, label: &str, cell: Cell) -> Result<()> {
        let addr = CellAddress::parse(label)?;
        self.cells.insert(addr, cell);
        self.dirty.insert(addr);
        Ok(())
    }

    /// Store an evaluation outcome for an existing cell
    ///
    /// Returns `false` if no cell exists at `addr`. The formula and the
    /// dirty state are left as they are.
    pub fn set_result(&mut self, addr: CellAddress, value: f64, error: Option<CellError>) -> bool {
        match self.cells.get_mut(&addr) {
            Some(cell) => {
                cell.set_result(value, error);
                true
            }
            None => false,
        }
    }

    /// Remove a cell by label, returning it
    pub fn clear_cell(&mut self, label: &str) -> Result<Option<Cell>> {
        let addr = CellAddress::parse(label)?;
        let removed = self.cells.remove(&addr);
        if removed.is_some() {
            self.dirty.insert(addr);
        }
        Ok(removed)
    }

    // === Dirty Tracking ===

    /// Addresses changed since the last [`Sheet::clear_dirty`]
    pub fn dirty_cells(&self) -> Vec<CellAddress> {
        let mut dirty: Vec<_> = self.dirty.iter().copied().collect();
        dirty.sort();
        dirty
    }

    /// Forget all pending changes
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}

impl CellStore for Sheet {
    fn cell(&self, label: &str) -> Option<&Cell> {
        let addr = CellAddress::parse(label).ok()?;
        self.cells.get(&addr)
    }
}
