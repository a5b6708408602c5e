//! Dependency tracking for formula calculation

use cellcalc_core::CellAddress;
use std::collections::{HashMap, HashSet};

/// Dependency graph for formula cells
///
/// Tracks which cells depend on which other cells,
/// enabling efficient recalculation.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: HashMap<CellAddress, HashSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: HashMap<CellAddress, HashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get the given cells and everything that depends on them, ordered so
    /// that every cell comes after the cells it reads
    ///
    /// Edges that close a cycle are skipped; cells on a cycle still appear
    /// once, in an unspecified position relative to each other.
    pub fn get_recalc_order(&self, changed: &[CellAddress]) -> Vec<CellAddress> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();

        for &cell in changed {
            self.topological_sort(cell, &mut result, &mut visited, &mut in_stack);
        }

        // Post-order over dependents puts readers first
        result.reverse();
        result
    }

    /// Topological sort helper (DFS)
    fn topological_sort(
        &self,
        cell: CellAddress,
        result: &mut Vec<CellAddress>,
        visited: &mut HashSet<CellAddress>,
        in_stack: &mut HashSet<CellAddress>,
    ) {
        if visited.contains(&cell) || in_stack.contains(&cell) {
            return;
        }

        in_stack.insert(cell);

        for dependent in self.get_dependents(cell) {
            self.topological_sort(dependent, result, visited, in_stack);
        }

        in_stack.remove(&cell);
        visited.insert(cell);
        result.push(cell);
    }

    /// Check whether a cell can reach itself through its precedents
    ///
    /// Only cells on a cycle qualify; a cell that merely reads from a cycle
    /// does not.
    pub fn has_circular_reference(&self, cell: CellAddress) -> bool {
        let mut visited = HashSet::new();
        self.get_precedents(cell)
            .any(|precedent| self.reaches(precedent, cell, &mut visited))
    }

    fn reaches(
        &self,
        from: CellAddress,
        target: CellAddress,
        visited: &mut HashSet<CellAddress>,
    ) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from) {
            return false;
        }

        self.get_precedents(from)
            .any(|precedent| self.reaches(precedent, target, visited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(label: &str) -> CellAddress {
        CellAddress::parse(label).unwrap()
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        let a1 = addr("A1");
        let b1 = addr("B1");

        graph.add_dependency(a1, b1);

        assert!(graph.get_dependents(a1).any(|c| c == b1));
        assert!(graph.get_precedents(b1).any(|c| c == a1));
    }

    #[test]
    fn test_recalc_order() {
        let mut graph = DependencyGraph::new();
        let (a1, b1, c1, d1) = (addr("A1"), addr("B1"), addr("C1"), addr("D1"));

        // C1 reads B1 and A1, B1 reads A1, D1 is unrelated
        graph.add_dependency(a1, b1);
        graph.add_dependency(b1, c1);
        graph.add_dependency(a1, c1);

        let order = graph.get_recalc_order(&[c1, d1, b1, a1]);
        let pos = |cell| order.iter().position(|&c| c == cell).unwrap();

        assert_eq!(order.len(), 4);
        assert!(pos(a1) < pos(b1));
        assert!(pos(b1) < pos(c1));
    }

    #[test]
    fn test_recalc_order_from_changed_cell() {
        let mut graph = DependencyGraph::new();
        let (a1, b1, c1) = (addr("A1"), addr("B1"), addr("C1"));

        graph.add_dependency(a1, b1);
        graph.add_dependency(b1, c1);

        assert_eq!(graph.get_recalc_order(&[b1]), vec![b1, c1]);
        assert_eq!(graph.get_recalc_order(&[a1]), vec![a1, b1, c1]);
    }

    #[test]
    fn test_circular_reference() {
        let mut graph = DependencyGraph::new();

        let (a1, b1, c1, d1) = (addr("A1"), addr("B1"), addr("C1"), addr("D1"));

        // A1 -> B1 -> C1 -> A1 (circular), D1 reads C1
        graph.add_dependency(a1, b1);
        graph.add_dependency(b1, c1);
        graph.add_dependency(c1, a1);
        graph.add_dependency(c1, d1);

        assert!(graph.has_circular_reference(a1));
        assert!(graph.has_circular_reference(b1));
        assert!(graph.has_circular_reference(c1));
        assert!(!graph.has_circular_reference(d1));
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::new();
        let a1 = addr("A1");
        graph.add_dependency(a1, a1);
        assert!(graph.has_circular_reference(a1));
        assert!(!graph.has_circular_reference(addr("B1")));
    }
}
