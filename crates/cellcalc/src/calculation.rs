//! Sheet calculation engine
//!
//! Provides sheet-level formula calculation with dependency tracking and
//! circular reference detection.
//!
//! # Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_formula("A1", ["10"]).unwrap();
//! sheet.set_formula("A2", ["20"]).unwrap();
//! sheet.set_formula("A3", ["A1", "+", "A2"]).unwrap();
//!
//! let stats = sheet.calculate();
//! assert_eq!(stats.cells_calculated, 3);
//! assert_eq!(sheet.cell("A3").unwrap().value(), 30.0);
//! ```

use std::collections::{HashMap, HashSet};

use cellcalc_formula::dependency::DependencyGraph;

use crate::{evaluate, CellAddress, CellError, Formula, Sheet};

/// Options for sheet calculation
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Recalculate every cell, not only the dirty ones and their dependents
    pub force_full_calculation: bool,
    /// Mark cells on a reference cycle with [`CellError::CircularReference`]
    /// instead of evaluating them against stale values
    pub detect_circular_references: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            force_full_calculation: true,
            detect_circular_references: true,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of cells holding a formula (including empty ones)
    pub formula_count: usize,
    /// Number of cells evaluated
    pub cells_calculated: usize,
    /// Number of cells found on a reference cycle
    pub circular_references: usize,
    /// Number of cells whose outcome carries an error
    pub errors: usize,
}

/// Extension trait for Sheet to add calculation methods
pub trait SheetCalculationExt {
    /// Calculate all formulas in the sheet with default options
    fn calculate(&mut self) -> CalculationStats;

    /// Calculate formulas with custom options
    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl SheetCalculationExt for Sheet {
    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let mut engine = CalculationEngine::new(options.clone());
        engine.calculate_all(self)
    }
}

/// The calculation engine
struct CalculationEngine {
    options: CalculationOptions,
    /// Dependency graph built from formulas
    dependency_graph: DependencyGraph,
    /// Classified formulas, keyed by address
    parsed_formulas: HashMap<CellAddress, Formula>,
    /// Cells involved in circular references
    circular_cells: HashSet<CellAddress>,
}

impl CalculationEngine {
    fn new(options: CalculationOptions) -> Self {
        Self {
            options,
            dependency_graph: DependencyGraph::new(),
            parsed_formulas: HashMap::new(),
            circular_cells: HashSet::new(),
        }
    }

    /// Calculate the formulas selected by the options
    fn calculate_all(&mut self, sheet: &mut Sheet) -> CalculationStats {
        let mut stats = CalculationStats::default();

        // Phase 1: Collect and classify all formulas, build dependency graph
        self.collect_formulas(sheet, &mut stats);

        // Phase 2: Detect circular references
        if self.options.detect_circular_references {
            self.detect_circular_references();
            stats.circular_references = self.circular_cells.len();
        }

        // Phase 3: Get calculation order (topological sort)
        let calc_order = self.get_calculation_order(sheet);

        // Phase 4: Calculate cells in order
        self.calculate_cells(sheet, &calc_order, &mut stats);

        sheet.clear_dirty();

        log::debug!(
            "calculated {} of {} cells ({} errors, {} circular)",
            stats.cells_calculated,
            stats.formula_count,
            stats.errors,
            stats.circular_references
        );

        stats
    }

    /// Collect all formulas from the sheet and build the dependency graph
    fn collect_formulas(&mut self, sheet: &Sheet, stats: &mut CalculationStats) {
        for (addr, raw) in sheet.formula_cells() {
            let formula = Formula::from_raw(raw);

            for label in formula.references() {
                if let Ok(precedent) = CellAddress::parse(label) {
                    self.dependency_graph.add_dependency(precedent, addr);
                }
            }

            self.parsed_formulas.insert(addr, formula);
            stats.formula_count += 1;
        }
    }

    /// Detect cells involved in circular references
    fn detect_circular_references(&mut self) {
        for &addr in self.parsed_formulas.keys() {
            if self.dependency_graph.has_circular_reference(addr) {
                self.circular_cells.insert(addr);
            }
        }
    }

    /// Get the calculation order via topological sort
    fn get_calculation_order(&self, sheet: &Sheet) -> Vec<CellAddress> {
        let changed: Vec<CellAddress> = if self.options.force_full_calculation {
            let mut all: Vec<CellAddress> = self.parsed_formulas.keys().copied().collect();
            all.sort();
            all
        } else {
            sheet.dirty_cells()
        };

        let mut order = self.dependency_graph.get_recalc_order(&changed);

        // Only cells that still exist get a result
        order.retain(|addr| self.parsed_formulas.contains_key(addr));

        order
    }

    /// Calculate cells in order
    fn calculate_cells(&self, sheet: &mut Sheet, order: &[CellAddress], stats: &mut CalculationStats) {
        // Cycle members first, so cells reading them see the error
        for &addr in order.iter().filter(|&&a| self.circular_cells.contains(&a)) {
            log::warn!("circular reference at {}", addr);
            sheet.set_result(addr, 0.0, Some(CellError::CircularReference));
            stats.errors += 1;
        }

        for &addr in order {
            if self.circular_cells.contains(&addr) {
                continue;
            }
            let Some(formula) = self.parsed_formulas.get(&addr) else {
                continue;
            };

            let (value, error) = evaluate(formula.tokens(), &*sheet).into_parts();
            if error.is_some() {
                stats.errors += 1;
            }
            sheet.set_result(addr, value, error);
            stats.cells_calculated += 1;
        }
    }
}
